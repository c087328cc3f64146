// src/math/algorithms/boolean.rs

use crate::math::geometry::polygon::{MultiPolygon, Polygon};
use geo::{BooleanOps, MultiPolygon as GeoMultiPolygon};
use tracing::debug;

/// Definiert die Art der durchzuführenden Boolean-Operation auf Polygonen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOpType {
    Union,        // Vereinigung (A ∪ B)
    Intersection, // Schnittmenge (A ∩ B)
}

/// Boolean-Operationen auf MultiPolygonen. Die eigentliche Arbeit macht
/// `geo::BooleanOps`; Ergebnisse kommen normalisiert zurück.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonBooleanOps;

impl PolygonBooleanOps {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(
        &self,
        a: &MultiPolygon,
        b: &MultiPolygon,
        operation: BooleanOpType,
    ) -> MultiPolygon {
        let result = Self::execute_geo(&GeoMultiPolygon::from(a), &GeoMultiPolygon::from(b), operation);
        MultiPolygon::from_geo(&result).normalized()
    }

    fn execute_geo(
        a: &GeoMultiPolygon<f64>,
        b: &GeoMultiPolygon<f64>,
        operation: BooleanOpType,
    ) -> GeoMultiPolygon<f64> {
        match operation {
            BooleanOpType::Union => a.union(b),
            BooleanOpType::Intersection => a.intersection(b),
        }
    }

    /// Kaskadierte Vereinigung: paarweise in einem Binärbaum, damit die
    /// Zwischenergebnisse klein bleiben. Auch ein einzelnes Element läuft
    /// einmal durch `union`, damit Überlappungen innerhalb der Eingabe verschwinden.
    pub fn union_all<I>(&self, inputs: I) -> MultiPolygon
    where
        I: IntoIterator<Item = GeoMultiPolygon<f64>>,
    {
        let mut level: Vec<GeoMultiPolygon<f64>> = inputs.into_iter().collect();
        if level.is_empty() {
            return MultiPolygon::empty();
        }
        if level.len() == 1 {
            level.push(GeoMultiPolygon::new(Vec::new()));
        }

        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(2));
            let mut iter = level.into_iter();
            while let Some(first) = iter.next() {
                match iter.next() {
                    Some(second) => next.push(first.union(&second)),
                    None => next.push(first),
                }
            }
            level = next;
        }

        let merged = level.pop().unwrap_or_else(|| GeoMultiPolygon::new(Vec::new()));
        MultiPolygon::from_geo(&merged).normalized()
    }
}

/// Vereinigt Polygone zu einem überlappungsfreien MultiPolygon.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dissolver {
    ops: PolygonBooleanOps,
}

impl Dissolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dissolve(&self, polygons: &[Polygon]) -> MultiPolygon {
        let candidate = MultiPolygon::new(polygons.to_vec());
        if is_dissolved(&candidate) {
            debug!("Dissolve: {} part(s) already disjoint", candidate.len());
            return candidate.normalized();
        }

        let result = self.ops.union_all(
            polygons
                .iter()
                .map(|p| GeoMultiPolygon::new(vec![p.into()])),
        );
        debug!(
            "Dissolve: {} polygons -> {} part(s)",
            polygons.len(),
            result.len()
        );
        result
    }

    pub fn dissolve_multi(&self, multi: &MultiPolygon) -> MultiPolygon {
        self.dissolve(multi.parts())
    }

    pub fn union_pair(&self, a: &MultiPolygon, b: &MultiPolygon) -> MultiPolygon {
        self.ops.execute(a, b, BooleanOpType::Union)
    }
}

/// Keine Ränder berühren oder schneiden sich und kein Teil liegt in einem anderen.
fn is_dissolved(multi: &MultiPolygon) -> bool {
    if !multi.is_simple() {
        return false;
    }
    multi.iter().enumerate().all(|(i, part)| {
        let probe = part.exterior().vertices()[0];
        multi
            .iter()
            .enumerate()
            .all(|(j, other)| i == j || !other.contains_point(probe))
    })
}
