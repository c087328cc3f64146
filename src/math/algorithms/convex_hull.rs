// src/math/algorithms/convex_hull.rs

//! # Convex Hull
//!
//! Convex envelopes for point clusters. Hull vertices come back in
//! counter-clockwise (CCW) order, starting at the lexicographically smallest
//! point, without repeating the first point at the end. Collinear boundary
//! points are never part of the result.

use crate::math::{
    error::{MathError, MathResult},
    types::*,
    utils::constants,
};
use serde::{Deserialize, Serialize};

/// Enumerates the available algorithms for computing the convex hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConvexHullAlgorithm {
    /// Graham Scan. Time complexity: O(n log n).
    GrahamScan,
    /// Andrew's Monotone Chain. Time complexity: O(n log n). Default.
    #[default]
    AndrewMonotone,
}

/// Computes the convex hull of a set of 2D points using a specified algorithm.
#[derive(Debug, Clone, Copy)]
pub struct ConvexHullComputer {
    algorithm: ConvexHullAlgorithm,
    /// Sine of the smallest turn that still counts as a corner.
    tolerance: f64,
}

impl Default for ConvexHullComputer {
    fn default() -> Self {
        Self {
            algorithm: ConvexHullAlgorithm::default(),
            tolerance: constants::EPSILON,
        }
    }
}

impl ConvexHullComputer {
    pub fn new(algorithm: ConvexHullAlgorithm) -> Self {
        Self {
            algorithm,
            ..Default::default()
        }
    }

    /// Sets the collinearity tolerance. Negative values are clamped to 0.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.max(0.0);
        self
    }

    /// Computes the convex hull of `input_points`.
    ///
    /// # Errors
    /// * `InsufficientData` if fewer than 3 distinct points remain after
    ///   removing duplicates.
    /// * `DegenerateGeometry` (without point indices) if all points are collinear.
    pub fn compute_hull_points(&self, input_points: &[Point2D]) -> MathResult<Vec<Point2D>> {
        let mut points = input_points.to_vec();
        points.sort_by(lexicographic_cmp);
        points.dedup_by(|a, b| a.distance_squared(*b) <= constants::EPSILON_SQUARED);

        if points.len() < 3 {
            return Err(MathError::InsufficientData {
                expected: 3,
                actual: points.len(),
            });
        }

        let hull = match self.algorithm {
            ConvexHullAlgorithm::GrahamScan => self.graham_scan(&points),
            ConvexHullAlgorithm::AndrewMonotone => self.andrew_monotone(&points),
        };

        if hull.len() < 3 {
            return Err(MathError::DegenerateGeometry {
                point_indices: Vec::new(),
                reason: "all points are collinear".to_string(),
            });
        }
        Ok(hull)
    }

    /// Strict left turn at `q` on the way p -> q -> r, within tolerance.
    #[inline]
    fn is_left_turn(&self, p: Point2D, q: Point2D, r: Point2D) -> bool {
        let scale = (q - p).length() * (r - q).length();
        orientation(p, q, r) > self.tolerance * scale
    }

    /// `points` are sorted lexicographically and free of duplicates.
    fn andrew_monotone(&self, points: &[Point2D]) -> Vec<Point2D> {
        let n = points.len();
        let mut hull: Vec<Point2D> = Vec::with_capacity(2 * n);

        // lower hull
        for &p in points {
            while hull.len() >= 2 && !self.is_left_turn(hull[hull.len() - 2], hull[hull.len() - 1], p)
            {
                hull.pop();
            }
            hull.push(p);
        }

        // upper hull, `t` guards the lower hull
        let t = hull.len() + 1;
        for &p in points[..n - 1].iter().rev() {
            while hull.len() >= t && !self.is_left_turn(hull[hull.len() - 2], hull[hull.len() - 1], p)
            {
                hull.pop();
            }
            hull.push(p);
        }

        // the last point pushed is points[0] again
        hull.pop();
        hull
    }

    /// Graham Scan around the lowest (then leftmost) point. The result is
    /// rotated to start at the lexicographically smallest vertex like the
    /// monotone chain does.
    fn graham_scan(&self, points: &[Point2D]) -> Vec<Point2D> {
        let mut local = points.to_vec();
        let pivot_idx = local
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.y.total_cmp(&b.1.y).then_with(|| a.1.x.total_cmp(&b.1.x)))
            .map(|(i, _)| i)
            .unwrap_or(0);
        local.swap(0, pivot_idx);
        let p0 = local[0];

        local[1..].sort_by(|a, b| {
            let o = orientation(p0, *a, *b);
            if o == 0.0 {
                p0.distance_squared(*a).total_cmp(&p0.distance_squared(*b))
            } else if o > 0.0 {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Greater
            }
        });

        let mut hull: Vec<Point2D> = Vec::with_capacity(local.len());
        for &p in &local {
            while hull.len() >= 2 && !self.is_left_turn(hull[hull.len() - 2], hull[hull.len() - 1], p)
            {
                hull.pop();
            }
            hull.push(p);
        }

        // the closing edge may still run back over a collinear vertex
        while hull.len() >= 3 && !self.is_left_turn(hull[hull.len() - 2], hull[hull.len() - 1], p0) {
            hull.pop();
        }

        if let Some(start) = hull
            .iter()
            .enumerate()
            .min_by(|a, b| lexicographic_cmp(a.1, b.1))
            .map(|(i, _)| i)
        {
            hull.rotate_left(start);
        }
        hull
    }
}
