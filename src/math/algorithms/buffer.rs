// src/math/algorithms/buffer.rs

//! Round-cornered outward offsetting of polygons.
//!
//! Arcs are sampled at the fixed angles `2πk / arc_segments` for every
//! vertex, so a larger distance only scales the same sample directions and
//! `buffer(P, d2)` always contains `buffer(P, d1)` for `d2 >= d1`.

use super::{boolean::PolygonBooleanOps, convex_hull::ConvexHullComputer};
use crate::math::{
    error::{MathError, MathResult},
    geometry::polygon::{Polygon, Ring},
    types::*,
    utils::constants,
};
use geo::{MultiPolygon as GeoMultiPolygon, Polygon as GeoPolygon};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Vertices of a full circle
    pub arc_segments: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self { arc_segments: 64 }
    }
}

impl BufferConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arc_segments(mut self, arc_segments: usize) -> Self {
        self.arc_segments = arc_segments;
        self
    }

    pub fn validate(&self) -> MathResult<()> {
        if self.arc_segments < 4 {
            return Err(MathError::invalid(
                "arc_segments",
                format!("needs at least 4 segments, got {}", self.arc_segments),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PolygonBuffer {
    config: BufferConfig,
    /// Unit circle samples, CCW from angle 0
    directions: Vec<Point2D>,
}

impl Default for PolygonBuffer {
    fn default() -> Self {
        Self::with_directions(BufferConfig::default())
    }
}

impl PolygonBuffer {
    pub fn new(config: BufferConfig) -> MathResult<Self> {
        config.validate()?;
        Ok(Self::with_directions(config))
    }

    fn with_directions(config: BufferConfig) -> Self {
        let n = config.arc_segments;
        let directions = (0..n)
            .map(|k| {
                let angle = constants::TAU * k as f64 / n as f64;
                Point2D::new(angle.cos(), angle.sin())
            })
            .collect();
        Self { config, directions }
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Puffert `polygon` um `distance` nach außen. `distance == 0` gibt die
    /// normalisierte Eingabe zurück.
    pub fn buffer(&self, polygon: &Polygon, distance: f64) -> MathResult<Polygon> {
        if !distance.is_finite() || distance < 0.0 {
            return Err(MathError::invalid(
                "buffer_distance",
                format!("must be a finite value >= 0, got {}", distance),
            ));
        }
        let polygon = polygon.normalized();
        if distance == 0.0 {
            return Ok(polygon);
        }

        if polygon.holes().is_empty() && is_convex(polygon.exterior()) {
            self.buffer_convex(polygon.exterior(), distance)
        } else {
            self.buffer_general(&polygon, distance)
        }
    }

    pub fn buffer_all(&self, polygons: &[Polygon], distance: f64) -> MathResult<Vec<Polygon>> {
        polygons.iter().map(|p| self.buffer(p, distance)).collect()
    }

    fn circle_around(&self, center: Point2D, radius: f64) -> impl Iterator<Item = Point2D> + '_ {
        self.directions.iter().map(move |&d| center + d * radius)
    }

    /// Konvexe Hülle aller Kreis-Samples plus der senkrecht verschobenen
    /// Kantenendpunkte. Für konvexe Ringe ist das bereits das Ergebnis.
    fn buffer_convex(&self, exterior: &Ring, distance: f64) -> MathResult<Polygon> {
        let mut samples: Vec<Point2D> =
            Vec::with_capacity(exterior.len() * (self.directions.len() + 2));
        for &v in exterior.vertices() {
            samples.extend(self.circle_around(v, distance));
        }
        for (a, b) in exterior.edges() {
            // CCW ring: the outward normal points right of the edge
            let outward = -(b - a).normalize_or_zero().perp();
            samples.push(a + outward * distance);
            samples.push(b + outward * distance);
        }

        let hull = ConvexHullComputer::default().compute_hull_points(&samples)?;
        Ok(Polygon::from_vertices(hull)?.normalized())
    }

    /// Vereinigung aus Polygon, Kanten-Rechtecken und Vertex-Kreisen aller Ringe.
    fn buffer_general(&self, polygon: &Polygon, distance: f64) -> MathResult<Polygon> {
        let mut pieces: Vec<GeoMultiPolygon<f64>> = vec![GeoMultiPolygon::new(vec![polygon.into()])];

        for ring in polygon.rings() {
            for (a, b) in ring.edges() {
                let n = (b - a).normalize_or_zero().perp() * distance;
                pieces.push(single(&[a - n, b - n, b + n, a + n])?);
            }
            for &v in ring.vertices() {
                let circle: Vec<Point2D> = self.circle_around(v, distance).collect();
                pieces.push(single(&circle)?);
            }
        }

        let merged = PolygonBooleanOps::new().union_all(pieces);
        if merged.len() > 1 {
            warn!(
                "Buffer produced {} disjoint parts; keeping the largest",
                merged.len()
            );
        }
        debug!(
            "Buffer: {} -> {} vertices at distance {}",
            polygon.vertex_count(),
            merged.vertex_count(),
            distance
        );
        merged
            .into_parts()
            .into_iter()
            .max_by(|a, b| a.area().total_cmp(&b.area()))
            .ok_or_else(|| MathError::GeometricFailure {
                operation: "buffer union returned no geometry".to_string(),
            })
    }
}

fn single(vertices: &[Point2D]) -> MathResult<GeoMultiPolygon<f64>> {
    let polygon = Polygon::from_vertices(vertices.to_vec())?;
    Ok(GeoMultiPolygon::new(vec![GeoPolygon::from(&polygon)]))
}

/// Konvex, wenn keine Rechtsdrehung vorkommt (Ring ist CCW orientiert).
fn is_convex(ring: &Ring) -> bool {
    let v = ring.vertices();
    let n = v.len();
    (0..n).all(|i| orientation(v[i], v[(i + 1) % n], v[(i + 2) % n]) >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn square() -> Polygon {
        Polygon::from_vertices(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(2.0, 2.0),
            Point2D::new(0.0, 2.0),
        ])
        .unwrap()
    }

    fn l_shape() -> Polygon {
        Polygon::from_vertices(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(4.0, 0.0),
            Point2D::new(4.0, 1.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(1.0, 4.0),
            Point2D::new(0.0, 4.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_zero_distance_is_passthrough() {
        let cw = Polygon::from_exterior(square().exterior().reversed());
        let result = PolygonBuffer::default().buffer(&cw, 0.0).unwrap();
        assert_eq!(result, square().normalized());
    }

    #[test]
    fn test_negative_distance_rejected() {
        let buffer = PolygonBuffer::default();
        assert!(matches!(
            buffer.buffer(&square(), -1.0),
            Err(MathError::InvalidParameter { .. })
        ));
        assert!(buffer.buffer(&square(), f64::NAN).is_err());
        assert!(PolygonBuffer::new(BufferConfig::new().with_arc_segments(3)).is_err());
    }

    #[test]
    fn test_square_buffer_area() {
        let result = PolygonBuffer::default().buffer(&square(), 1.0).unwrap();
        // square + four side strips + (nearly) a unit circle
        let expected = 4.0 + 8.0 + PI;
        assert_relative_eq!(result.area(), expected, max_relative = 0.01);
        assert!(result.area() < expected);
        assert!(result.exterior().is_simple());
        assert!(result.covers_point(Point2D::new(3.0, 1.0), 1e-9));
    }

    #[test]
    fn test_concave_buffer_is_simple() {
        let result = PolygonBuffer::default().buffer(&l_shape(), 0.5).unwrap();
        assert!(result.exterior().is_simple());
        assert!(result.area() > l_shape().area());
        for &v in l_shape().exterior().vertices() {
            assert!(result.contains_point(v));
        }
        // the inner corner is filled by the offset
        assert!(result.contains_point(Point2D::new(1.3, 1.3)));
    }

    #[test]
    fn test_buffer_monotonicity() {
        let buffer = PolygonBuffer::default();
        for polygon in [square(), l_shape()] {
            let mut previous = buffer.buffer(&polygon, 0.0).unwrap();
            for d in [0.25, 0.5, 1.0, 2.0] {
                let current = buffer.buffer(&polygon, d).unwrap();
                assert!(current.area() >= previous.area());
                for &v in previous.exterior().vertices() {
                    assert!(current.covers_point(v, 1e-6));
                }
                previous = current;
            }
        }
    }

    #[test]
    fn test_polygon_with_hole_shrinks_hole() {
        let frame = Polygon::new(
            Ring::new(vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(10.0, 0.0),
                Point2D::new(10.0, 10.0),
                Point2D::new(0.0, 10.0),
            ])
            .unwrap(),
            vec![
                Ring::new(vec![
                    Point2D::new(3.0, 3.0),
                    Point2D::new(3.0, 7.0),
                    Point2D::new(7.0, 7.0),
                    Point2D::new(7.0, 3.0),
                ])
                .unwrap(),
            ],
        );
        let result = PolygonBuffer::default().buffer(&frame, 1.0).unwrap();
        assert_eq!(result.holes().len(), 1);
        assert!(result.contains_point(Point2D::new(3.5, 5.0)));
        assert!(!result.contains_point(Point2D::new(5.0, 5.0)));

        let closed = PolygonBuffer::default().buffer(&frame, 2.5).unwrap();
        assert!(closed.holes().is_empty());
    }
}
