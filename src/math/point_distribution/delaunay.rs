// src/math/point_distribution/delaunay.rs

use crate::math::{
    error::{MathError, MathResult},
    types::*,
};
use spade::{DelaunayTriangulation, Point2, Triangulation};

/// Delaunay-Triangulation über einer Punktmenge, die sich merkt, welche
/// Eingabeindizes auf welchen Vertex fallen. Koinzidente Punkte teilen sich
/// einen Vertex.
///
/// Der euklidische minimale Spannbaum ist ein Teilgraph der Delaunay-Triangulation.
/// Nächste Nachbarn und distanzbasierte Zusammenhangskomponenten lassen sich
/// deshalb allein über die Delaunay-Kanten bestimmen.
pub struct DelaunayIndex {
    triangulation: DelaunayTriangulation<Point2<f64>>,
    /// Vertex-Index -> Eingabeindizes (aufsteigend)
    members: Vec<Vec<usize>>,
    /// Eingabeindex -> Vertex-Index
    vertex_of: Vec<usize>,
}

impl DelaunayIndex {
    pub fn build(points: &[Point2D]) -> MathResult<Self> {
        let mut triangulation = DelaunayTriangulation::<Point2<f64>>::new();
        let mut members: Vec<Vec<usize>> = Vec::new();
        let mut vertex_of = Vec::with_capacity(points.len());

        for (i, &p) in points.iter().enumerate() {
            let handle = triangulation
                .insert(to_spade(p))
                .map_err(|e| MathError::GeometricFailure {
                    operation: format!("Delaunay insertion of point {} at {:?}: {:?}", i, p, e),
                })?;
            let vertex = handle.index();
            if vertex >= members.len() {
                members.resize_with(vertex + 1, Vec::new);
            }
            members[vertex].push(i);
            vertex_of.push(vertex);
        }

        Ok(Self {
            triangulation,
            members,
            vertex_of,
        })
    }

    pub fn point_count(&self) -> usize {
        self.vertex_of.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.members.len()
    }

    /// Eingabeindizes, die auf `vertex` liegen.
    pub fn members(&self, vertex: usize) -> &[usize] {
        &self.members[vertex]
    }

    pub fn vertex_of(&self, point_index: usize) -> usize {
        self.vertex_of[point_index]
    }

    /// Abstand jedes Eingabepunkts zu seinem nächsten *anderen* Punkt, in
    /// Eingabereihenfolge. Duplikate liefern 0; ein einzelner Punkt ohne
    /// Nachbarn liefert `f64::INFINITY`.
    pub fn nearest_neighbor_distances(&self) -> Vec<f64> {
        let mut per_vertex = vec![f64::INFINITY; self.members.len()];
        for vertex in self.triangulation.vertices() {
            let idx = vertex.fix().index();
            if self.members[idx].len() > 1 {
                per_vertex[idx] = 0.0;
                continue;
            }
            let from = vertex.position();
            per_vertex[idx] = vertex
                .out_edges()
                .map(|edge| {
                    let to = edge.to().position();
                    (to.x - from.x).hypot(to.y - from.y)
                })
                .fold(f64::INFINITY, f64::min);
        }
        self.vertex_of.iter().map(|&v| per_vertex[v]).collect()
    }

    /// Alle ungerichteten Delaunay-Kanten als (Vertex, Vertex, Länge).
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.triangulation.undirected_edges().map(|edge| {
            let [a, b] = edge.vertices();
            let (pa, pb) = (a.position(), b.position());
            (
                a.fix().index(),
                b.fix().index(),
                (pb.x - pa.x).hypot(pb.y - pa.y),
            )
        })
    }
}
