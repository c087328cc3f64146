// src/math/algorithms/mod.rs

// Deklaration der verschiedenen Algorithmus-Kategorien
pub mod aggregation;
pub mod boolean;
pub mod buffer;
pub mod clipping;
pub mod convex_hull;
pub mod smoothing;

// Aggregation von Punkten zu Hüllpolygonen
pub use self::aggregation::{AggregatePolygon, Aggregator, AggregatorConfig, DisjointSet};

// Konvexe Hülle
pub use self::convex_hull::{ConvexHullAlgorithm, ConvexHullComputer};

// Puffer
pub use self::buffer::{BufferConfig, PolygonBuffer};

// Boolean-Operationen und Dissolve
pub use self::boolean::{BooleanOpType, Dissolver, PolygonBooleanOps};

// Smoothing Algorithmen und Traits
pub use self::smoothing::{BezierSmoother, Smoothing, SmoothingConfig};

// Clipping
pub use self::clipping::PolygonClipper;
