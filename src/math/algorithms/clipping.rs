// src/math/algorithms/clipping.rs

//! # Polygon Clipping
//!
//! Intersects a subject footprint with a caller-supplied boundary. An empty
//! result is a valid outcome (no overlap) and is returned as an empty
//! `MultiPolygon`, never as an error.

use super::boolean::{BooleanOpType, PolygonBooleanOps};
use crate::math::{
    error::{MathError, MathResult},
    geometry::polygon::MultiPolygon,
    utils::constants,
};
use tracing::debug;

/// Performs polygon clipping against arbitrary (also concave, holed or
/// multi-part) boundaries.
#[derive(Debug, Clone, Copy)]
pub struct PolygonClipper {
    ops: PolygonBooleanOps,
    /// Boundaries with an area at or below this value are rejected.
    min_boundary_area: f64,
}

impl Default for PolygonClipper {
    fn default() -> Self {
        Self {
            ops: PolygonBooleanOps::new(),
            min_boundary_area: constants::EPSILON,
        }
    }
}

impl PolygonClipper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_boundary_area(mut self, area: f64) -> Self {
        self.min_boundary_area = area.max(0.0);
        self
    }

    /// Rejects boundaries without area.
    pub fn validate_boundary(&self, boundary: &MultiPolygon) -> MathResult<()> {
        let area = boundary.area();
        if !(area > self.min_boundary_area) {
            return Err(MathError::invalid(
                "clip_boundary",
                format!("boundary has no area ({})", area),
            ));
        }
        Ok(())
    }

    /// `subject ∩ boundary`
    pub fn clip(&self, subject: &MultiPolygon, boundary: &MultiPolygon) -> MathResult<MultiPolygon> {
        self.validate_boundary(boundary)?;
        if subject.is_empty() || !subject.bounds().intersects(&boundary.bounds()) {
            debug!("Clip: no overlap between footprint and boundary bounds");
            return Ok(MultiPolygon::empty());
        }
        let clipped = self.ops.execute(subject, boundary, BooleanOpType::Intersection);
        debug!(
            "Clip: {} -> {} part(s), area {:.6} -> {:.6}",
            subject.len(),
            clipped.len(),
            subject.area(),
            clipped.area()
        );
        Ok(clipped)
    }
}
