// src/math/point_distribution/spacing.rs

use super::{delaunay::DelaunayIndex, thinning::GridThinner};
use crate::math::{
    error::{MathError, MathResult},
    types::*,
    utils::statistics::percentile_linear,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Charakteristischer Punktabstand eines Laufs, mit Herkunftsangaben.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpacingStatistic {
    /// `percentile_distance * modifier`, in Koordinateneinheiten
    pub distance: f64,
    /// Perzentil der Nächste-Nachbar-Abstände vor dem Modifier
    pub percentile_distance: f64,
    pub percentile: f64,
    pub modifier: f64,
    /// Anzahl der Punkte, aus denen die Abstände stammen
    pub sample_size: usize,
}

fn validate_percentile(percentile: f64) -> MathResult<()> {
    if !(0.0..=100.0).contains(&percentile) {
        return Err(MathError::invalid(
            "percentile",
            format!("must lie within [0, 100], got {}", percentile),
        ));
    }
    Ok(())
}

fn validate_modifier(modifier: f64) -> MathResult<()> {
    if !modifier.is_finite() || modifier < 0.0 {
        return Err(MathError::invalid(
            "modifier",
            format!("must be a finite value >= 0, got {}", modifier),
        ));
    }
    Ok(())
}

/// Perzentil der Nächste-Nachbar-Abstände, multipliziert mit `modifier`.
///
/// Koinzidente Punkte tragen jeweils 0 bei und ziehen das Perzentil damit in
/// dichten Gruppen nach unten.
pub fn estimate(points: &[Point2D], percentile: f64, modifier: f64) -> MathResult<SpacingStatistic> {
    validate_percentile(percentile)?;
    validate_modifier(modifier)?;
    if points.len() < 2 {
        return Err(MathError::InsufficientData {
            expected: 2,
            actual: points.len(),
        });
    }
    if let Some(i) = points.iter().position(|&p| !is_finite_point(p)) {
        return Err(MathError::invalid(
            "points",
            format!("point {} has non-finite coordinates", i),
        ));
    }

    let distances = DelaunayIndex::build(points)?.nearest_neighbor_distances();
    let percentile_distance =
        percentile_linear(&distances, percentile).ok_or_else(|| MathError::GeometricFailure {
            operation: "percentile of nearest-neighbour distances".to_string(),
        })?;

    let statistic = SpacingStatistic {
        distance: percentile_distance * modifier,
        percentile_distance,
        percentile,
        modifier,
        sample_size: points.len(),
    };
    debug!(
        "Spacing: P{} of {} nearest-neighbour distances = {:.6}, x{} = {:.6}",
        percentile, statistic.sample_size, percentile_distance, modifier, statistic.distance
    );
    Ok(statistic)
}

/// Ausdünnen plus Abstandsstatistik. Die ausgedünnten Punkte werden nur für
/// die Statistik verwendet.
#[derive(Debug, Clone, Copy)]
pub struct SpacingEstimator {
    percentile: f64,
    modifier: f64,
    thinner: Option<GridThinner>,
}

impl SpacingEstimator {
    pub fn new(percentile: f64, modifier: f64) -> MathResult<Self> {
        validate_percentile(percentile)?;
        validate_modifier(modifier)?;
        Ok(Self {
            percentile,
            modifier,
            thinner: None,
        })
    }

    pub fn with_thinner(mut self, thinner: GridThinner) -> Self {
        self.thinner = Some(thinner);
        self
    }

    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    pub fn modifier(&self) -> f64 {
        self.modifier
    }

    /// Punkte, auf denen die Statistik berechnet wird. Bleiben nach dem
    /// Ausdünnen weniger als 2 übrig, werden die unverdünnten Punkte genommen.
    pub fn sample(&self, points: &[Point2D]) -> MathResult<Vec<Point2D>> {
        if points.len() < 2 {
            return Err(MathError::InsufficientData {
                expected: 2,
                actual: points.len(),
            });
        }
        let Some(thinner) = &self.thinner else {
            return Ok(points.to_vec());
        };

        let thinned = thinner.thin(points);
        if thinned.len() < 2 {
            warn!(
                "Grid thinning with cell size {} left {} point(s); using all {} points for spacing",
                thinner.cell_size(),
                thinned.len(),
                points.len()
            );
            return Ok(points.to_vec());
        }
        debug!(
            "Grid thinning: {} -> {} points (cell size {})",
            points.len(),
            thinned.len(),
            thinner.cell_size()
        );
        Ok(thinned)
    }

    /// Statistik über eine bereits gebildete Stichprobe.
    pub fn estimate_sample(&self, sample: &[Point2D]) -> MathResult<SpacingStatistic> {
        estimate(sample, self.percentile, self.modifier)
    }

    pub fn estimate(&self, points: &[Point2D]) -> MathResult<SpacingStatistic> {
        let sample = self.sample(points)?;
        self.estimate_sample(&sample)
    }
}
