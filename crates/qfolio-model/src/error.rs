//! Error types for the model crate.

use thiserror::Error;

/// Errors produced while building or compiling a problem.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// Covariance matrix shape does not match the asset count.
    #[error("covariance is {rows}x{cols} but the problem has {n_assets} assets")]
    CovarianceShape {
        /// Covariance row count.
        rows: usize,
        /// Covariance column count.
        cols: usize,
        /// Number of assets in the spec.
        n_assets: usize,
    },

    /// The budget must select at least one asset.
    #[error("budget must be at least 1, got {0}")]
    InvalidBudget(usize),

    /// Penalty weights must be strictly positive to dominate violations.
    #[error("budget penalty weight must be > 0, got {0}")]
    InvalidPenalty(f64),

    /// A bitstring has the wrong length for this model.
    #[error("bitstring has {got} bits but the model has {expected} variables")]
    BitstringLength {
        /// Bits supplied.
        got: usize,
        /// Variables in the model.
        expected: usize,
    },
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
