// src/range/mod.rs

//! Schätzung eines konkaven Verbreitungsgebiets aus Fundpunkten.

pub mod config;
pub mod pipeline;

pub use self::config::RangeConfig;
pub use self::pipeline::{RangeEstimator, RangeFootprint, StageSnapshots};
