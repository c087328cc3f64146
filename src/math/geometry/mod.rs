// src/math/geometry/mod.rs

pub mod polygon;

// Re-Exporte für einen schnellen Zugriff auf die Kern-Geometrietypen
pub use self::polygon::{MultiPolygon, Polygon, PolygonValidator, Ring, ValidationError};
