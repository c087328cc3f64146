// src/math/geometry/polygon/validation.rs

use super::{
    core::{MultiPolygon, Polygon},
    ring::Ring,
};
use crate::math::types::*;

/// Gefundene Verletzung der Einfachheit
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Zwei nicht benachbarte Kanten schneiden oder berühren sich.
    SelfIntersection {
        first: SegmentId,
        second: SegmentId,
    },
    /// Zwei benachbarte Kanten laufen kollinear ineinander zurück.
    FoldBack { first: SegmentId, second: SegmentId },
}

/// Position einer Kante: Ring-Nummer und Kantenindex innerhalb des Rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId {
    pub ring: usize,
    pub index: usize,
}

/// Kante mit Herkunft; `ring_len` wird für die Nachbarschaftsprüfung gebraucht.
#[derive(Debug, Clone, Copy)]
pub struct TaggedSegment {
    pub a: Point2D,
    pub b: Point2D,
    pub id: SegmentId,
    pub ring_len: usize,
}

impl TaggedSegment {
    fn min_x(&self) -> f64 {
        self.a.x.min(self.b.x)
    }

    fn max_x(&self) -> f64 {
        self.a.x.max(self.b.x)
    }

    fn y_overlaps(&self, other: &TaggedSegment) -> bool {
        self.a.y.min(self.b.y) <= other.a.y.max(other.b.y)
            && other.a.y.min(other.b.y) <= self.a.y.max(self.b.y)
    }

    /// `Some(true)` wenn `other` direkt auf `self` folgt, `Some(false)` wenn
    /// `self` auf `other` folgt, `None` wenn nicht benachbart.
    fn adjacency(&self, other: &TaggedSegment) -> Option<bool> {
        if self.id.ring != other.id.ring {
            return None;
        }
        let n = self.ring_len;
        if (self.id.index + 1) % n == other.id.index {
            Some(true)
        } else if (other.id.index + 1) % n == self.id.index {
            Some(false)
        } else {
            None
        }
    }
}

/// Liegt `p` auf der Strecke (a, b), vorausgesetzt die drei Punkte sind kollinear?
fn on_segment(a: Point2D, b: Point2D, p: Point2D) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Schneiden oder berühren sich die Strecken (p1, p2) und (q1, q2)?
pub fn segments_intersect(p1: Point2D, p2: Point2D, q1: Point2D, q2: Point2D) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

/// Benachbarte Kanten (`first` endet, wo `second` beginnt) sind nur dann ein
/// Problem, wenn `second` kollinear in `first` zurückläuft.
fn folds_back(first: &TaggedSegment, second: &TaggedSegment) -> bool {
    let d1 = first.b - first.a;
    let d2 = second.b - second.a;
    d1.perp_dot(d2) == 0.0 && d1.dot(d2) < 0.0
}

/// Sweep über x: meldet alle Paare sich schneidender Kanten. Benachbarte Kanten
/// desselben Rings dürfen sich im gemeinsamen Vertex berühren.
pub fn find_intersections(segments: &[TaggedSegment]) -> Vec<ValidationError> {
    let mut order: Vec<usize> = (0..segments.len()).collect();
    order.sort_by(|&i, &j| segments[i].min_x().total_cmp(&segments[j].min_x()));

    let mut errors = Vec::new();
    for (pos, &i) in order.iter().enumerate() {
        let s = &segments[i];
        let max_x = s.max_x();
        for &j in &order[pos + 1..] {
            let t = &segments[j];
            if t.min_x() > max_x {
                break;
            }
            if !s.y_overlaps(t) {
                continue;
            }
            match s.adjacency(t) {
                Some(true) if s.ring_len > 2 => {
                    if folds_back(s, t) {
                        errors.push(ValidationError::FoldBack {
                            first: s.id,
                            second: t.id,
                        });
                    }
                }
                Some(false) if s.ring_len > 2 => {
                    if folds_back(t, s) {
                        errors.push(ValidationError::FoldBack {
                            first: t.id,
                            second: s.id,
                        });
                    }
                }
                _ => {
                    if segments_intersect(s.a, s.b, t.a, t.b) {
                        errors.push(ValidationError::SelfIntersection {
                            first: s.id,
                            second: t.id,
                        });
                    }
                }
            }
        }
    }
    errors
}

/// Zerlegt Ringe in markierte Kanten; die Ringe werden fortlaufend nummeriert.
pub fn ring_segments<'a>(rings: impl IntoIterator<Item = &'a Ring>) -> Vec<TaggedSegment> {
    rings
        .into_iter()
        .enumerate()
        .flat_map(|(ring, r)| {
            let ring_len = r.len();
            r.edges()
                .enumerate()
                .map(move |(index, (a, b))| TaggedSegment {
                    a,
                    b,
                    id: SegmentId { ring, index },
                    ring_len,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Validator für Einfachheit von Ringen und Polygonen.
pub struct PolygonValidator;

impl PolygonValidator {
    /// Alle Verletzungen innerhalb eines Rings
    pub fn validate_ring(ring: &Ring) -> Vec<ValidationError> {
        find_intersections(&ring_segments(std::iter::once(ring)))
    }

    /// Alle Verletzungen über sämtliche Ringe eines MultiPolygons hinweg
    pub fn validate(multi: &MultiPolygon) -> Vec<ValidationError> {
        find_intersections(&ring_segments(multi.iter().flat_map(Polygon::rings)))
    }
}

impl Ring {
    /// Ist der Ring frei von Selbstüberschneidungen?
    pub fn is_simple(&self) -> bool {
        PolygonValidator::validate_ring(self).is_empty()
    }
}

impl MultiPolygon {
    /// Sind alle Ringe einfach und paarweise disjunkt?
    pub fn is_simple(&self) -> bool {
        PolygonValidator::validate(self).is_empty()
    }
}
