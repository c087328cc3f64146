// src/math/algorithms/smoothing/mod.rs

pub mod bezier; // Eckenrundung mit kubischen Bézier-Kurven
pub mod traits;

pub use self::bezier::{BezierSmoother, cubic_bezier_evaluate};
pub use self::traits::{Smoothing, SmoothingConfig};
