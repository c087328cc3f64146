// src/math/types/mod.rs
pub mod bounds;
pub mod point;

pub use bounds::*;
pub use point::*;

// Re-export häufig verwendete externe Typen
pub use glam::DVec2;

/// Einheitlicher Punkt-Typ für das gesamte Modul (projizierte, planare Koordinaten).
pub type Point2D = DVec2;
