// src/math/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for operation: expected at least {expected} usable points, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    #[error("Degenerate geometry for points {point_indices:?}: {reason}")]
    DegenerateGeometry {
        point_indices: Vec<usize>,
        reason: String,
    },

    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error("Geometric calculation failed: {operation}")]
    GeometricFailure { operation: String },
}

impl MathError {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        MathError::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    /// Rewrites cluster indices in `DegenerateGeometry` through `mapping`
    /// (position in a filtered point list -> position in the caller's list).
    pub(crate) fn remap_indices(self, mapping: &[usize]) -> Self {
        match self {
            MathError::DegenerateGeometry {
                point_indices,
                reason,
            } => MathError::DegenerateGeometry {
                point_indices: point_indices
                    .into_iter()
                    .map(|i| mapping.get(i).copied().unwrap_or(i))
                    .collect(),
                reason,
            },
            other => other,
        }
    }
}

pub type MathResult<T> = Result<T, MathError>;
