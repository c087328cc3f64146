pub mod algorithms;
pub mod error;
pub mod geometry;
pub mod point_distribution;
pub mod types;
pub mod utils;

// Re-exports für einfache Verwendung
pub use error::{MathError, MathResult};
pub use types::*;

// Öffentliche API
pub mod prelude {
    pub use super::{
        algorithms::{
            AggregatePolygon, Aggregator, AggregatorConfig, BezierSmoother, BufferConfig,
            Dissolver, PolygonBuffer, PolygonClipper, Smoothing, SmoothingConfig,
        },
        error::{MathError, MathResult},
        geometry::polygon::{MultiPolygon, Polygon, Ring},
        point_distribution::{
            CellRepresentative, GridThinner, SpacingEstimator, SpacingStatistic,
        },
        types::*,
    };
}
