// src/range/pipeline.rs

use super::config::RangeConfig;
use crate::math::{
    algorithms::{
        AggregatePolygon, Aggregator, BezierSmoother, Dissolver, PolygonBuffer, PolygonClipper,
        Smoothing,
    },
    error::{MathError, MathResult},
    geometry::polygon::{MultiPolygon, Polygon},
    point_distribution::{GridThinner, SpacingEstimator, SpacingStatistic},
    types::*,
};
use tracing::{debug, info, warn};

/// Geometrie jeder Stufe eines Laufs, nur mit `keep_intermediates`.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSnapshots {
    /// Stichprobe der Abstandsstatistik (nach dem Ausdünnen)
    pub thinned_points: Vec<Point2D>,
    pub aggregates: Vec<AggregatePolygon>,
    pub buffered: Vec<Polygon>,
    pub dissolved: MultiPolygon,
    pub smoothed: MultiPolygon,
}

/// Ergebnis eines Laufs.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFootprint {
    /// Endgültiges (ggf. zugeschnittenes) MultiPolygon. Nach einem Zuschnitt
    /// ohne Überlappung leer.
    pub footprint: MultiPolygon,
    pub spacing: SpacingStatistic,
    pub cluster_count: usize,
    pub clipped: bool,
    pub spatial_reference: Option<String>,
    /// Eingabeindizes der verworfenen Punkte mit nicht-endlichen Koordinaten
    pub dropped_points: Vec<usize>,
    pub stages: Option<StageSnapshots>,
}

/// Punkte -> Abstandsstatistik -> Aggregation -> Puffer -> Dissolve -> Glättung -> Zuschnitt.
pub struct RangeEstimator {
    config: RangeConfig,
    spacing: SpacingEstimator,
    aggregator: Aggregator,
    buffer: PolygonBuffer,
    dissolver: Dissolver,
    smoother: Box<dyn Smoothing>,
    clipper: PolygonClipper,
}

impl RangeEstimator {
    pub fn new(config: RangeConfig) -> MathResult<Self> {
        config.validate()?;

        let thinner = GridThinner::new(config.min_search_distance)?
            .with_representative(config.cell_representative);
        let spacing = SpacingEstimator::new(config.percentile, config.modifier)?.with_thinner(thinner);

        Ok(Self {
            spacing,
            aggregator: Aggregator::new(config.aggregator)?,
            buffer: PolygonBuffer::new(config.buffer)?,
            dissolver: Dissolver::new(),
            smoother: Box::new(BezierSmoother::new(config.smoothing)?),
            clipper: PolygonClipper::new(),
            config,
        })
    }

    /// Ersetzt die Bézier-Glättung durch eine andere Implementierung.
    pub fn with_smoother(mut self, smoother: impl Smoothing + 'static) -> Self {
        self.smoother = Box::new(smoother);
        self
    }

    pub fn config(&self) -> &RangeConfig {
        &self.config
    }

    /// Berechnet den Umriss für `points`, optional zugeschnitten auf `clip_boundary`.
    ///
    /// # Errors
    /// * `InvalidParameter` für eine Zuschnittsgrenze ohne Fläche, bevor
    ///   irgendeine Geometrie berechnet wird.
    /// * `InsufficientData` wenn nach dem Entfernen nicht-endlicher Punkte
    ///   weniger als 2 übrig bleiben.
    /// * `DegenerateGeometry` mit den Eingabeindizes des betroffenen Clusters.
    pub fn estimate(
        &self,
        points: &[Point2D],
        clip_boundary: Option<&MultiPolygon>,
    ) -> MathResult<RangeFootprint> {
        if let Some(boundary) = clip_boundary {
            self.clipper.validate_boundary(boundary)?;
        }

        info!("Determining search points based on minimum search distance...");
        let (usable, source_index, dropped_points) = repair_points(points);
        if !dropped_points.is_empty() {
            warn!(
                "Dropped {} point(s) with non-finite coordinates",
                dropped_points.len()
            );
        }
        if usable.len() < 2 {
            return Err(MathError::InsufficientData {
                expected: 2,
                actual: usable.len(),
            });
        }
        let sample = self.spacing.sample(&usable)?;

        info!("Determining maximum point distances...");
        let spacing = self.spacing.estimate_sample(&sample)?;
        debug!(
            "Aggregation distance {:.6} (P{} = {:.6}, modifier {})",
            spacing.distance, spacing.percentile, spacing.percentile_distance, spacing.modifier
        );

        info!("Creating concave polygon from point distances (step 1 of 3: aggregate)...");
        let aggregates = self
            .aggregator
            .aggregate(&usable, &spacing)
            .map_err(|e| e.remap_indices(&source_index))?;
        let aggregates: Vec<AggregatePolygon> = aggregates
            .into_iter()
            .map(|mut a| {
                a.members = a.members.iter().map(|&i| source_index[i]).collect();
                a
            })
            .collect();

        info!("Creating concave polygon from point distances (step 2 of 3: buffer)...");
        let buffered = self.buffer.buffer_all(
            &aggregates
                .iter()
                .map(|a| a.polygon.clone())
                .collect::<Vec<_>>(),
            self.config.buffer_distance,
        )?;

        info!("Creating concave polygon from point distances (step 3 of 3: dissolve)...");
        let dissolved = self.dissolver.dissolve(&buffered);

        let smoothed = self.smoother.smooth_multi(&dissolved)?;

        let (footprint, clipped) = match clip_boundary {
            None => {
                info!("No clip boundary specified, returning smoothed footprint");
                (smoothed.clone(), false)
            }
            Some(boundary) => {
                info!("Clipping footprint to the clip boundary...");
                (self.clipper.clip(&smoothed, boundary)?, true)
            }
        };

        info!(
            "Footprint: {} cluster(s) -> {} part(s), area {:.6}",
            aggregates.len(),
            footprint.len(),
            footprint.area()
        );

        let cluster_count = aggregates.len();
        let stages = self.config.keep_intermediates.then(|| StageSnapshots {
            thinned_points: sample,
            aggregates,
            buffered,
            dissolved,
            smoothed,
        });

        Ok(RangeFootprint {
            footprint,
            spacing,
            cluster_count,
            clipped,
            spatial_reference: self.config.spatial_reference.clone(),
            dropped_points,
            stages,
        })
    }
}

/// Entfernt Punkte mit nicht-endlichen Koordinaten.
/// Liefert (brauchbare Punkte, Originalindex je brauchbarem Punkt, verworfene Indizes).
fn repair_points(points: &[Point2D]) -> (Vec<Point2D>, Vec<usize>, Vec<usize>) {
    let mut usable = Vec::with_capacity(points.len());
    let mut source_index = Vec::with_capacity(points.len());
    let mut dropped = Vec::new();
    for (i, &p) in points.iter().enumerate() {
        if is_finite_point(p) {
            usable.push(p);
            source_index.push(i);
        } else {
            dropped.push(i);
        }
    }
    (usable, source_index, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::algorithms::{AggregatorConfig, SmoothingConfig};
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn scenario_points() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(50.0, 50.0),
        ]
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon {
        Polygon::from_vertices(vec![
            Point2D::new(x0, y0),
            Point2D::new(x1, y0),
            Point2D::new(x1, y1),
            Point2D::new(x0, y1),
        ])
        .unwrap()
        .into()
    }

    #[test]
    fn test_two_cluster_scenario() {
        let config = RangeConfig::new()
            .with_min_search_distance(0.5)
            .with_buffer_distance(2.0)
            .keep_intermediates(true);
        let result = RangeEstimator::new(config)
            .unwrap()
            .estimate(&scenario_points(), None)
            .unwrap();

        assert_eq!(result.cluster_count, 2);
        assert!(!result.clipped);
        assert_eq!(result.footprint.len(), 2);
        assert!(result.footprint.is_simple());
        for p in scenario_points() {
            assert!(result.footprint.contains_point(p));
        }

        let stages = result.stages.unwrap();
        assert_eq!(stages.thinned_points.len(), 5);
        assert_eq!(stages.aggregates[0].members, vec![0, 1, 2, 3]);
        assert_eq!(stages.aggregates[1].members, vec![4]);
        assert_eq!(stages.buffered.len(), 2);
        assert_eq!(stages.dissolved.len(), 2);
        assert_eq!(stages.smoothed, result.footprint);
        assert!(result.spacing.distance < 49.0 * 2f64.sqrt());
    }

    #[test]
    fn test_dense_cluster_without_buffer_encloses_points() {
        let mut rng = StdRng::seed_from_u64(2024);
        let points: Vec<Point2D> = (0..20)
            .map(|_| Point2D::new(rng.random_range(0.0..1.0), rng.random_range(0.0..1.0)))
            .collect();
        let config = RangeConfig::new().with_modifier(20.0);
        let result = RangeEstimator::new(config)
            .unwrap()
            .estimate(&points, None)
            .unwrap();

        assert_eq!(result.cluster_count, 1);
        assert_eq!(result.footprint.len(), 1);
        let polygon = &result.footprint.parts()[0];
        assert!(polygon.exterior().is_simple());
        for p in &points {
            assert!(polygon.covers_point(*p, 1e-9));
        }
    }

    #[test]
    fn test_lattice_cluster_is_smoothed_around_all_points() {
        let points: Vec<Point2D> = (0..5)
            .flat_map(|i| (0..4).map(move |j| Point2D::new(i as f64 * 0.25, j as f64 * 0.25)))
            .collect();
        let result = RangeEstimator::new(RangeConfig::default())
            .unwrap()
            .estimate(&points, None)
            .unwrap();
        assert_relative_eq!(result.spacing.distance, 0.25);
        assert_eq!(result.cluster_count, 1);
        let polygon = &result.footprint.parts()[0];
        assert!(polygon.exterior().is_simple());
        assert!(polygon.area() > 0.75);
        for p in &points {
            assert!(polygon.covers_point(*p, 1e-9));
        }
    }

    #[test]
    fn test_non_finite_points_are_dropped() {
        let mut points = scenario_points();
        points.insert(1, Point2D::new(f64::NAN, 3.0));
        points.push(Point2D::new(2.0, f64::INFINITY));
        let config = RangeConfig::new()
            .with_min_search_distance(0.5)
            .keep_intermediates(true);
        let result = RangeEstimator::new(config)
            .unwrap()
            .estimate(&points, None)
            .unwrap();
        assert_eq!(result.dropped_points, vec![1, 6]);
        let stages = result.stages.unwrap();
        // members refer to the caller's indices
        assert_eq!(stages.aggregates[0].members, vec![0, 2, 3, 4]);
        assert_eq!(stages.aggregates[1].members, vec![5]);
    }

    #[test]
    fn test_insufficient_points() {
        let estimator = RangeEstimator::new(RangeConfig::default()).unwrap();
        let err = estimator
            .estimate(&[Point2D::ZERO, Point2D::new(f64::NAN, 0.0)], None)
            .unwrap_err();
        assert_eq!(
            err,
            MathError::InsufficientData {
                expected: 2,
                actual: 1
            }
        );
        assert!(estimator.estimate(&[], None).is_err());
    }

    #[test]
    fn test_degenerate_cluster_reports_caller_indices() {
        let points = vec![
            Point2D::new(f64::NAN, 0.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
            Point2D::new(100.0, 100.0),
        ];
        let config = RangeConfig::new()
            .with_percentile(50.0)
            .with_aggregator(AggregatorConfig {
                degenerate_radius: 1e-12,
                ..Default::default()
            });
        let err = RangeEstimator::new(config)
            .unwrap()
            .estimate(&points, None)
            .unwrap_err();
        match err {
            MathError::DegenerateGeometry { point_indices, .. } => {
                assert_eq!(point_indices, vec![4])
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_clip_boundary() {
        let config = RangeConfig::new()
            .with_min_search_distance(0.5)
            .with_buffer_distance(2.0)
            .with_spatial_reference("EPSG:3005");
        let estimator = RangeEstimator::new(config).unwrap();
        let unclipped = estimator.estimate(&scenario_points(), None).unwrap();

        let boundary = rect(-10.0, -10.0, 10.0, 0.5);
        let clipped = estimator
            .estimate(&scenario_points(), Some(&boundary))
            .unwrap();
        assert!(clipped.clipped);
        assert_eq!(clipped.spatial_reference.as_deref(), Some("EPSG:3005"));
        assert_eq!(clipped.footprint.len(), 1);
        assert!(clipped.footprint.area() < unclipped.footprint.area());
        for polygon in &clipped.footprint {
            for &v in polygon.exterior().vertices() {
                assert!(v.y <= 0.5 + 1e-6);
                assert!(unclipped.footprint.covers_point(v, 1e-6));
            }
        }

        let far = rect(1000.0, 1000.0, 1001.0, 1001.0);
        let empty = estimator.estimate(&scenario_points(), Some(&far)).unwrap();
        assert!(empty.clipped);
        assert!(empty.footprint.is_empty());
    }

    #[test]
    fn test_invalid_parameters_fail_fast() {
        assert!(matches!(
            RangeEstimator::new(RangeConfig::new().with_percentile(101.0)),
            Err(MathError::InvalidParameter { .. })
        ));
        let estimator = RangeEstimator::new(RangeConfig::default()).unwrap();
        // the boundary is checked before the point count
        let err = estimator
            .estimate(&[], Some(&MultiPolygon::empty()))
            .unwrap_err();
        assert!(matches!(
            err,
            MathError::InvalidParameter {
                name: "clip_boundary",
                ..
            }
        ));
    }

    #[test]
    fn test_custom_smoother() {
        let smoother = BezierSmoother::new(SmoothingConfig::new().with_tolerance(0.1)).unwrap();
        let estimator = RangeEstimator::new(RangeConfig::new().with_buffer_distance(1.0))
            .unwrap()
            .with_smoother(smoother);
        let result = estimator.estimate(&scenario_points(), None).unwrap();
        assert!(result.footprint.is_simple());
        assert!(result.footprint.area() > 0.0);
    }
}
