// src/math/algorithms/smoothing/traits.rs

use crate::math::{
    error::{MathError, MathResult},
    geometry::polygon::{MultiPolygon, Polygon, Ring},
    types::Point2D,
};
use serde::{Deserialize, Serialize};

/// Haupt-Trait für Algorithmen, die eine Sequenz von 2D-Punkten glätten.
pub trait Smoothing {
    /// Glättet einen Linienzug. Bei `is_closed` ist der letzte Punkt implizit
    /// mit dem ersten verbunden; offene Linienzüge behalten ihre Endpunkte.
    fn smooth_points(&self, points: &[Point2D], is_closed: bool) -> MathResult<Vec<Point2D>>;

    /// Glättet jeden Ring eines Polygons für sich.
    fn smooth_polygon(&self, polygon: &Polygon) -> MathResult<Polygon> {
        let exterior = Ring::new(self.smooth_points(polygon.exterior().vertices(), true)?)?;
        let holes = polygon
            .holes()
            .iter()
            .map(|h| Ring::new(self.smooth_points(h.vertices(), true)?))
            .collect::<MathResult<Vec<_>>>()?;
        Ok(Polygon::new(exterior, holes))
    }

    fn smooth_multi(&self, multi: &MultiPolygon) -> MathResult<MultiPolygon> {
        multi.iter().map(|p| self.smooth_polygon(p)).collect()
    }
}

/// Parameter der Eckenrundung.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Wie weit eine Rundung höchstens entlang jeder angrenzenden Kante
    /// reicht. `0` heißt: bis zur Kantenmitte (maximale Glättung).
    pub tolerance: f64,
    /// Teilstrecken pro Bézier-Kurvenstück.
    pub samples_per_curve: usize,
    /// Wie oft eine Ecke bei Überschneidungen halbiert wird, bevor sie spitz bleibt.
    pub max_refinements: u32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.0,
            samples_per_curve: 8,
            max_refinements: 6,
        }
    }
}

impl SmoothingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_samples_per_curve(mut self, samples: usize) -> Self {
        self.samples_per_curve = samples;
        self
    }

    pub fn with_max_refinements(mut self, max_refinements: u32) -> Self {
        self.max_refinements = max_refinements;
        self
    }

    pub fn validate(&self) -> MathResult<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(MathError::invalid(
                "smoothing_tolerance",
                format!("must be a finite value >= 0, got {}", self.tolerance),
            ));
        }
        if self.samples_per_curve == 0 {
            return Err(MathError::invalid(
                "samples_per_curve",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
