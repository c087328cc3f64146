// src/math/geometry/polygon/core.rs

use super::ring::Ring;
use crate::math::{error::MathResult, types::*};
use std::fmt;

/// Polygon mit einem äußeren Ring und beliebig vielen Löchern.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    exterior: Ring,
    holes: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring, holes: Vec<Ring>) -> Self {
        Self { exterior, holes }
    }

    /// Polygon ohne Löcher
    pub fn from_exterior(exterior: Ring) -> Self {
        Self::new(exterior, Vec::new())
    }

    /// Polygon ohne Löcher direkt aus Vertices
    pub fn from_vertices(vertices: Vec<Point2D>) -> MathResult<Self> {
        Ok(Self::from_exterior(Ring::new(vertices)?))
    }

    pub fn exterior(&self) -> &Ring {
        &self.exterior
    }

    pub fn holes(&self) -> &[Ring] {
        &self.holes
    }

    /// Äußerer Ring gefolgt von allen Löchern
    pub fn rings(&self) -> impl Iterator<Item = &Ring> + '_ {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }

    pub fn vertex_count(&self) -> usize {
        self.rings().map(Ring::len).sum()
    }

    pub fn area(&self) -> f64 {
        (self.exterior.area() - self.holes.iter().map(Ring::area).sum::<f64>()).max(0.0)
    }

    pub fn bounds(&self) -> Bounds2D {
        self.exterior.bounds()
    }

    /// Liegt der Punkt im Inneren (außerhalb aller Löcher)?
    pub fn contains_point(&self, point: Point2D) -> bool {
        self.exterior.contains_point(point) && !self.holes.iter().any(|h| h.contains_point(point))
    }

    /// Abstand zum nächsten Rand (äußerer Ring oder Loch)
    pub fn boundary_distance(&self, point: Point2D) -> f64 {
        self.rings()
            .map(|r| r.distance_to_point(point))
            .fold(f64::INFINITY, f64::min)
    }

    /// Wie `contains_point`, aber Punkte höchstens `tolerance` vom Rand entfernt zählen mit.
    pub fn covers_point(&self, point: Point2D, tolerance: f64) -> bool {
        self.contains_point(point) || self.boundary_distance(point) <= tolerance
    }

    /// Kanonische Form: äußerer Ring CCW, Löcher CW, jeweils ab dem
    /// lexikographisch kleinsten Vertex; Löcher sortiert.
    pub fn normalized(&self) -> Self {
        let exterior = self.exterior.oriented(true).canonical_start();
        let mut holes: Vec<Ring> = self
            .holes
            .iter()
            .map(|h| h.oriented(false).canonical_start())
            .collect();
        holes.sort_by(|a, b| lexicographic_cmp(&a.vertices()[0], &b.vertices()[0]));
        Self { exterior, holes }
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Polygon({} exterior vertices, {} holes)",
            self.exterior.len(),
            self.holes.len()
        )
    }
}

/// Geordnete Menge unabhängiger Polygon-Teile. Nach Dissolve/Clip
/// überlappen sich die äußeren Ringe nicht.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiPolygon {
    parts: Vec<Polygon>,
}

impl MultiPolygon {
    pub fn new(parts: Vec<Polygon>) -> Self {
        Self { parts }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn parts(&self) -> &[Polygon] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<Polygon> {
        self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polygon> {
        self.parts.iter()
    }

    pub fn area(&self) -> f64 {
        self.parts.iter().map(Polygon::area).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(Polygon::vertex_count).sum()
    }

    pub fn bounds(&self) -> Bounds2D {
        self.parts
            .iter()
            .fold(Bounds2D::empty(), |acc, p| acc.union(&p.bounds()))
    }

    pub fn contains_point(&self, point: Point2D) -> bool {
        self.parts.iter().any(|p| p.contains_point(point))
    }

    pub fn covers_point(&self, point: Point2D, tolerance: f64) -> bool {
        self.parts.iter().any(|p| p.covers_point(point, tolerance))
    }

    /// Kanonische Form aller Teile, sortiert nach ihrem Startvertex.
    pub fn normalized(&self) -> Self {
        let mut parts: Vec<Polygon> = self.parts.iter().map(Polygon::normalized).collect();
        parts.sort_by(|a, b| {
            lexicographic_cmp(&a.exterior().vertices()[0], &b.exterior().vertices()[0])
        });
        Self { parts }
    }
}

impl From<Polygon> for MultiPolygon {
    fn from(polygon: Polygon) -> Self {
        Self::new(vec![polygon])
    }
}

impl FromIterator<Polygon> for MultiPolygon {
    fn from_iter<I: IntoIterator<Item = Polygon>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for MultiPolygon {
    type Item = Polygon;
    type IntoIter = std::vec::IntoIter<Polygon>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

impl<'a> IntoIterator for &'a MultiPolygon {
    type Item = &'a Polygon;
    type IntoIter = std::slice::Iter<'a, Polygon>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}

impl fmt::Display for MultiPolygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MultiPolygon({} parts, {} vertices)",
            self.parts.len(),
            self.vertex_count()
        )
    }
}
