// src/math/geometry/polygon/ring.rs

use crate::math::{
    error::{MathError, MathResult},
    types::*,
    utils::constants,
};
use std::fmt;

/// Geschlossener Linienzug. Der Schlusspunkt wird implizit angenommen und
/// nicht gespeichert (`vertices.first() != vertices.last()`).
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    vertices: Vec<Point2D>,
}

impl Ring {
    /// Erstellt einen Ring. Ein expliziter Schlusspunkt und aufeinanderfolgende
    /// Duplikate werden entfernt; danach müssen mindestens 3 Vertices übrig sein.
    pub fn new(vertices: Vec<Point2D>) -> MathResult<Self> {
        let mut cleaned: Vec<Point2D> = Vec::with_capacity(vertices.len());
        for v in vertices {
            if !is_finite_point(v) {
                return Err(MathError::invalid(
                    "ring",
                    format!("non-finite vertex {:?}", v),
                ));
            }
            if cleaned
                .last()
                .is_none_or(|last| last.distance_squared(v) > constants::EPSILON_SQUARED)
            {
                cleaned.push(v);
            }
        }
        while cleaned.len() > 1
            && cleaned[0].distance_squared(cleaned[cleaned.len() - 1]) <= constants::EPSILON_SQUARED
        {
            cleaned.pop();
        }

        if cleaned.len() < 3 {
            return Err(MathError::InsufficientData {
                expected: 3,
                actual: cleaned.len(),
            });
        }

        Ok(Self { vertices: cleaned })
    }

    /// Zugriff auf Vertices (ohne Schlusspunkt)
    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    /// Vertices inklusive wiederholtem Startpunkt am Ende
    pub fn closed_vertices(&self) -> impl Iterator<Item = Point2D> + '_ {
        self.vertices
            .iter()
            .copied()
            .chain(self.vertices.first().copied())
    }

    /// Kanten als (Start, Ende), inklusive der Schlusskante
    pub fn edges(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vorzeichenbehaftete Fläche (Shoelace). Positiv für CCW.
    pub fn signed_area(&self) -> f64 {
        0.5 * self.edges().map(|(a, b)| a.perp_dot(b)).sum::<f64>()
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Kopie mit umgekehrter Laufrichtung; der Startpunkt bleibt erhalten.
    pub fn reversed(&self) -> Self {
        let mut vertices = self.vertices.clone();
        vertices[1..].reverse();
        Self { vertices }
    }

    /// Kopie mit der gewünschten Orientierung
    pub fn oriented(&self, ccw: bool) -> Self {
        if self.is_ccw() == ccw {
            self.clone()
        } else {
            self.reversed()
        }
    }

    /// Rotiert die Vertices so, dass der lexikographisch kleinste Punkt vorne steht.
    pub fn canonical_start(&self) -> Self {
        let start = self
            .vertices
            .iter()
            .enumerate()
            .min_by(|a, b| lexicographic_cmp(a.1, b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let mut vertices = self.vertices.clone();
        vertices.rotate_left(start);
        Self { vertices }
    }

    pub fn bounds(&self) -> Bounds2D {
        Bounds2D::from_points_iter(self.vertices.iter().copied()).unwrap_or_else(Bounds2D::empty)
    }

    /// Punkt-in-Ring-Test (Even-Odd-Regel). Punkte exakt auf dem Rand sind
    /// nicht eindeutig zugeordnet; dafür gibt es `distance_to_point`.
    pub fn contains_point(&self, point: Point2D) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > point.y) != (b.y > point.y) {
                let x_cross = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if point.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Kleinster Abstand eines Punktes zum Rand
    pub fn distance_to_point(&self, point: Point2D) -> f64 {
        self.edges()
            .map(|(a, b)| point_segment_distance(point, a, b))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Abstand eines Punktes zur Strecke (a, b)
pub fn point_segment_distance(p: Point2D, a: Point2D, b: Point2D) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= constants::EPSILON_SQUARED {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ring({} vertices, {})",
            self.vertices.len(),
            if self.is_ccw() { "ccw" } else { "cw" }
        )
    }
}

impl TryFrom<Vec<Point2D>> for Ring {
    type Error = MathError;

    fn try_from(vertices: Vec<Point2D>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

impl From<Ring> for Vec<Point2D> {
    fn from(ring: Ring) -> Self {
        ring.vertices
    }
}
