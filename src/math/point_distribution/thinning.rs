// src/math/point_distribution/thinning.rs

use crate::math::{
    error::{MathError, MathResult},
    types::*,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Welcher Punkt eine belegte Gitterzelle vertritt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellRepresentative {
    /// Mittelpunkt der Zelle (entspricht dem Raster-Rundweg Punkt -> Zelle -> Punkt).
    #[default]
    CellCenter,
    /// Schwerpunkt aller Punkte der Zelle.
    Centroid,
    /// Der Punkt mit dem kleinsten Eingabeindex.
    First,
}

#[derive(Debug, Clone, Copy)]
struct CellAccumulator {
    first: Point2D,
    sum: Point2D,
    count: usize,
}

/// Räumliches Hashing auf ein Quadratgitter: jede belegte Zelle wird auf
/// genau einen Punkt reduziert.
///
/// Der Gitterursprung ist die linke untere Ecke der Punktausdehnung, damit das
/// Ergebnis nicht von der Reihenfolge der Eingabe abhängt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridThinner {
    cell_size: f64,
    representative: CellRepresentative,
}

impl GridThinner {
    /// `cell_size` von 0 schaltet das Ausdünnen ab.
    pub fn new(cell_size: f64) -> MathResult<Self> {
        if !cell_size.is_finite() || cell_size < 0.0 {
            return Err(MathError::invalid(
                "min_search_distance",
                format!("must be a finite value >= 0, got {}", cell_size),
            ));
        }
        Ok(Self {
            cell_size,
            representative: CellRepresentative::default(),
        })
    }

    pub fn with_representative(mut self, representative: CellRepresentative) -> Self {
        self.representative = representative;
        self
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Dünnt die Punkte aus. Die Ausgabe ist nach Zellindex (Zeile, Spalte) sortiert.
    pub fn thin(&self, points: &[Point2D]) -> Vec<Point2D> {
        if self.cell_size == 0.0 || points.is_empty() {
            return points.to_vec();
        }
        let Some(bounds) = Bounds2D::from_points_iter(points.iter().copied()) else {
            return Vec::new();
        };
        let origin = bounds.min;

        let mut cells: BTreeMap<(i64, i64), CellAccumulator> = BTreeMap::new();
        for &p in points {
            let key = self.cell_key(p, origin);
            cells
                .entry(key)
                .and_modify(|acc| {
                    acc.sum += p;
                    acc.count += 1;
                })
                .or_insert(CellAccumulator {
                    first: p,
                    sum: p,
                    count: 1,
                });
        }

        cells
            .into_iter()
            .map(|((row, col), acc)| match self.representative {
                CellRepresentative::CellCenter => {
                    origin + Point2D::new(col as f64 + 0.5, row as f64 + 0.5) * self.cell_size
                }
                CellRepresentative::Centroid => acc.sum / acc.count as f64,
                CellRepresentative::First => acc.first,
            })
            .collect()
    }

    fn cell_key(&self, p: Point2D, origin: Point2D) -> (i64, i64) {
        let col = ((p.x - origin.x) / self.cell_size).floor() as i64;
        let row = ((p.y - origin.y) / self.cell_size).floor() as i64;
        (row, col)
    }
}
