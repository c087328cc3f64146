// src/math/point_distribution/mod.rs

// Punktmengen: Ausdünnen auf ein Gitter, Delaunay-Nachbarschaft und Abstandsstatistik
pub mod delaunay;
pub mod spacing;
pub mod thinning;

pub use self::delaunay::DelaunayIndex;
pub use self::spacing::{SpacingEstimator, SpacingStatistic};
pub use self::thinning::{CellRepresentative, GridThinner};
