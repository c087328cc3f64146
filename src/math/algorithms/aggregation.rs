// src/math/algorithms/aggregation.rs

//! Distanzbasierte Aggregation: Punkte, die über eine Kette von Abständen
//! `<= max_distance` verbunden sind, bilden einen Cluster; jeder Cluster wird
//! durch seine konvexe Hülle umschlossen.

use super::convex_hull::{ConvexHullAlgorithm, ConvexHullComputer};
use crate::math::{
    error::{MathError, MathResult},
    geometry::polygon::Polygon,
    point_distribution::{DelaunayIndex, SpacingStatistic},
    types::*,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Union-Find mit Pfadkompression und Union-by-Rank.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// `false` wenn beide schon in derselben Menge lagen.
    pub fn union(&mut self, x: usize, y: usize) -> bool {
        let px = self.find(x);
        let py = self.find(y);
        if px == py {
            return false;
        }
        match self.rank[px].cmp(&self.rank[py]) {
            std::cmp::Ordering::Less => self.parent[px] = py,
            std::cmp::Ordering::Greater => self.parent[py] = px,
            std::cmp::Ordering::Equal => {
                self.parent[py] = px;
                self.rank[px] += 1;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Halbe Kantenlänge des Ersatzpolygons für Einzelpunkte und Polster
    /// um kollineare Cluster.
    pub degenerate_radius: f64,
    pub hull_algorithm: ConvexHullAlgorithm,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            degenerate_radius: 1e-6,
            hull_algorithm: ConvexHullAlgorithm::default(),
        }
    }
}

impl AggregatorConfig {
    pub fn validate(&self) -> MathResult<()> {
        if !self.degenerate_radius.is_finite() || self.degenerate_radius <= 0.0 {
            return Err(MathError::invalid(
                "degenerate_radius",
                format!("must be a finite value > 0, got {}", self.degenerate_radius),
            ));
        }
        Ok(())
    }
}

/// Hüllpolygon eines Clusters mit den Eingabeindizes seiner Punkte.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatePolygon {
    pub polygon: Polygon,
    /// aufsteigend sortiert
    pub members: Vec<usize>,
    /// `true` wenn das Polygon ein Ersatz für einen Punkt oder eine Strecke ist
    pub degenerate: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(config: AggregatorConfig) -> MathResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn aggregate(
        &self,
        points: &[Point2D],
        spacing: &SpacingStatistic,
    ) -> MathResult<Vec<AggregatePolygon>> {
        self.aggregate_within(points, spacing.distance)
    }

    /// Ein Polygon pro Cluster, Cluster sortiert nach ihrem kleinsten Index.
    /// Jeder Eingabeindex taucht in genau einem Cluster auf.
    pub fn aggregate_within(
        &self,
        points: &[Point2D],
        max_distance: f64,
    ) -> MathResult<Vec<AggregatePolygon>> {
        if !max_distance.is_finite() || max_distance < 0.0 {
            return Err(MathError::invalid(
                "max_distance",
                format!("must be a finite value >= 0, got {}", max_distance),
            ));
        }
        if let Some(i) = points.iter().position(|&p| !is_finite_point(p)) {
            return Err(MathError::invalid(
                "points",
                format!("point {} has non-finite coordinates", i),
            ));
        }

        let clusters = Self::clusters(points, max_distance)?;
        debug!(
            "Aggregation: {} points -> {} clusters (max distance {:.6})",
            points.len(),
            clusters.len(),
            max_distance
        );

        clusters
            .into_iter()
            .map(|members| self.envelope(points, members))
            .collect()
    }

    /// Zusammenhangskomponenten des Graphen "Abstand <= max_distance".
    /// Es genügen die Delaunay-Kanten, weil der minimale Spannbaum darin liegt.
    pub fn clusters(points: &[Point2D], max_distance: f64) -> MathResult<Vec<Vec<usize>>> {
        if points.is_empty() {
            return Ok(Vec::new());
        }
        let index = DelaunayIndex::build(points)?;
        let mut sets = DisjointSet::new(index.vertex_count());
        for (a, b, length) in index.edges() {
            if length <= max_distance {
                sets.union(a, b);
            }
        }

        let mut cluster_of_root: HashMap<usize, usize> = HashMap::new();
        let mut clusters: Vec<Vec<usize>> = Vec::new();
        for i in 0..points.len() {
            let root = sets.find(index.vertex_of(i));
            let cluster = *cluster_of_root.entry(root).or_insert_with(|| {
                clusters.push(Vec::new());
                clusters.len() - 1
            });
            clusters[cluster].push(i);
        }
        Ok(clusters)
    }

    fn envelope(&self, points: &[Point2D], members: Vec<usize>) -> MathResult<AggregatePolygon> {
        let cluster_points: Vec<Point2D> = members.iter().map(|&i| points[i]).collect();
        let hull = ConvexHullComputer::new(self.config.hull_algorithm)
            .compute_hull_points(&cluster_points);

        match hull {
            Ok(hull) => {
                let polygon = Polygon::from_vertices(hull).map_err(|e| degenerate(&members, e))?;
                Ok(AggregatePolygon {
                    polygon,
                    members,
                    degenerate: false,
                })
            }
            Err(MathError::InsufficientData { .. }) | Err(MathError::DegenerateGeometry { .. }) => {
                let polygon = self
                    .degraded_envelope(&cluster_points)
                    .map_err(|e| degenerate(&members, e))?;
                Ok(AggregatePolygon {
                    polygon,
                    members,
                    degenerate: true,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Kleines Rechteck um einen Punkt oder eine Strecke, damit der Puffer
    /// eine echte Fläche zum Ausdehnen hat.
    fn degraded_envelope(&self, cluster_points: &[Point2D]) -> MathResult<Polygon> {
        let r = self.config.degenerate_radius;
        let first = cluster_points
            .iter()
            .copied()
            .min_by(lexicographic_cmp)
            .ok_or(MathError::InsufficientData {
                expected: 1,
                actual: 0,
            })?;
        let last = cluster_points
            .iter()
            .copied()
            .max_by(lexicographic_cmp)
            .unwrap_or(first);

        let axis = (last - first).normalize_or_zero();
        let (u, n) = if axis == Point2D::ZERO {
            (Point2D::X, Point2D::Y)
        } else {
            (axis, axis.perp())
        };

        Polygon::from_vertices(vec![
            first - u * r - n * r,
            last + u * r - n * r,
            last + u * r + n * r,
            first - u * r + n * r,
        ])
    }
}

fn degenerate(members: &[usize], cause: MathError) -> MathError {
    MathError::DegenerateGeometry {
        point_indices: members.to_vec(),
        reason: format!("cluster envelope could not be built: {}", cause),
    }
}
