// src/math/types/bounds.rs

use crate::math::types::*;
use std::fmt;

/// 2D Bounding Box (Axis-Aligned Bounding Box)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds2D {
    pub min: Point2D,
    pub max: Point2D,
}

impl Bounds2D {
    /// Erstellt eine Bounding Box aus zwei beliebigen Punkten
    pub fn from_points(p1: Point2D, p2: Point2D) -> Self {
        Self {
            min: p1.min(p2),
            max: p1.max(p2),
        }
    }

    /// Erstellt eine Bounding Box die alle Punkte umschließt
    pub fn from_points_iter<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point2D>,
    {
        let mut points_iter = points.into_iter();
        let first_point = points_iter.next()?;

        let mut bounds = Self {
            min: first_point,
            max: first_point,
        };
        for point in points_iter {
            bounds.expand_to_include_point(point);
        }
        Some(bounds)
    }

    /// Leere Bounding Box (ungültig)
    pub fn empty() -> Self {
        Self {
            min: Point2D::splat(f64::INFINITY),
            max: Point2D::splat(f64::NEG_INFINITY),
        }
    }

    /// Prüft ob die Bounding Box leer ist
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn width(&self) -> f64 {
        (self.max.x - self.min.x).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.max.y - self.min.y).max(0.0)
    }

    /// Prüft ob sich zwei Bounding Boxes überschneiden (Berührung zählt)
    pub fn intersects(&self, other: &Bounds2D) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Vereinigt zwei Bounding Boxes
    pub fn union(&self, other: &Bounds2D) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }

        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Erweitert die Bounding Box um einen Punkt
    pub fn expand_to_include_point(&mut self, point: Point2D) {
        if self.is_empty() {
            self.min = point;
            self.max = point;
        } else {
            self.min = self.min.min(point);
            self.max = self.max.max(point);
        }
    }

    /// Erweitert die Bounding Box um einen Margin
    pub fn expand(&self, margin: f64) -> Self {
        if self.is_empty() {
            return *self;
        }

        Self {
            min: self.min - Point2D::splat(margin),
            max: self.max + Point2D::splat(margin),
        }
    }
}

impl fmt::Display for Bounds2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Bounds2D(empty)")
        } else {
            write!(f, "Bounds2D({:?} to {:?})", self.min, self.max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_points() {
        let b = Bounds2D::from_points_iter(vec![
            Point2D::new(1.0, -2.0),
            Point2D::new(-3.0, 4.0),
            Point2D::new(0.5, 0.5),
        ])
        .unwrap();
        assert_eq!(b.min, Point2D::new(-3.0, -2.0));
        assert_eq!(b.max, Point2D::new(1.0, 4.0));
        assert_eq!(b.width(), 4.0);
        assert!(Bounds2D::from_points_iter(Vec::<Point2D>::new()).is_none());
    }

    #[test]
    fn test_touching_bounds_intersect() {
        let a = Bounds2D::from_points(Point2D::ZERO, Point2D::new(1.0, 1.0));
        let b = Bounds2D::from_points(Point2D::new(1.0, 0.0), Point2D::new(2.0, 1.0));
        let c = Bounds2D::from_points(Point2D::new(1.5, 0.0), Point2D::new(2.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(Bounds2D::empty().is_empty());
    }
}
