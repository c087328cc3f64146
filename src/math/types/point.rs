// src/math/types/point.rs
use super::Point2D;

/// Orientierungstest für das Tripel (p, q, r).
/// - Ergebnis > 0: Linksdrehung (CCW)
/// - Ergebnis < 0: Rechtsdrehung (CW)
/// - Ergebnis ≈ 0: kollinear
#[inline]
pub fn orientation(p: Point2D, q: Point2D, r: Point2D) -> f64 {
    (q - p).perp_dot(r - p)
}

/// Prüft ob alle Koordinaten endlich sind.
#[inline]
pub fn is_finite_point(p: Point2D) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Lexikographischer Vergleich (erst x, dann y).
pub fn lexicographic_cmp(a: &Point2D, b: &Point2D) -> std::cmp::Ordering {
    a.x.total_cmp(&b.x).then_with(|| a.y.total_cmp(&b.y))
}

// Conversion helpers
pub fn to_coord(p: Point2D) -> geo::Coord<f64> {
    geo::Coord { x: p.x, y: p.y }
}

pub fn from_coord(c: geo::Coord<f64>) -> Point2D {
    Point2D::new(c.x, c.y)
}

pub fn to_spade(p: Point2D) -> spade::Point2<f64> {
    spade::Point2::new(p.x, p.y)
}
