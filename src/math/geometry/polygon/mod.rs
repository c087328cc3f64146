// src/math/geometry/polygon/mod.rs

// Deklaration der Untermodule für Polygon-spezifische Funktionalität
pub mod convert; // Konvertierung von/zu `geo`
pub mod core; // Polygon und MultiPolygon
pub mod ring; // Geschlossener Linienzug
pub mod validation; // Einfachheit und Kantenschnitte

pub use self::core::{MultiPolygon, Polygon};
pub use self::ring::{Ring, point_segment_distance};
pub use self::validation::{
    PolygonValidator, SegmentId, TaggedSegment, ValidationError, find_intersections,
    segments_intersect,
};
