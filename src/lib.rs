// ./src/lib.rs
//! Konkave Verbreitungsgebiete aus verstreuten Fundpunkten.
//!
//! Ablauf: Punkte -> Abstandsstatistik -> Aggregation -> Puffer -> Dissolve
//! -> Glättung -> optionaler Zuschnitt. Einstiegspunkt ist
//! [`range::RangeEstimator`].

pub mod debug;
pub mod math;
pub mod range;

pub use math::{
    MathError, MathResult, Point2D,
    geometry::polygon::{MultiPolygon, Polygon, Ring},
};
pub use range::{RangeConfig, RangeEstimator, RangeFootprint, StageSnapshots};
