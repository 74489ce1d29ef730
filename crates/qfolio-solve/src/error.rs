//! Solver error types.

use qfolio_sim::ExecError;
use thiserror::Error;

use crate::solution::ConvergenceTrace;

/// Errors raised while configuring or running a solver.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SolveError {
    /// CVaR tail fraction outside `(0, 1]`.
    #[error("cvar alpha {0} is outside (0, 1]")]
    InvalidAlpha(f64),

    /// Convergence tolerance must be a finite positive number.
    #[error("tolerance {0} is not a finite positive number")]
    InvalidTolerance(f64),

    /// Iteration budget, patience, ansatz reps and QAOA layers must all
    /// be at least one.
    #[error("{name} must be at least 1, got 0")]
    ZeroBudget { name: &'static str },

    /// Problem construction failed before the loop started.
    #[error(transparent)]
    Model(#[from] qfolio_model::ModelError),

    /// The backend failed mid-run, or returned a batch the loop cannot
    /// score. Carries every iteration recorded before the failure so
    /// callers can still inspect partial progress.
    #[error("execution failed after {} recorded iterations: {reason}", .trace.len())]
    ExecutionFailure {
        reason: String,
        trace: ConvergenceTrace,
        #[source]
        source: Option<ExecError>,
    },

    /// The objective score left the finite range, usually a sign of an
    /// overflowing penalty weight or a degenerate covariance.
    #[error("score became non-finite at iteration {iteration}")]
    NumericalDegeneracy {
        iteration: usize,
        trace: ConvergenceTrace,
    },

    /// Exhaustive enumeration requested for a problem too large to
    /// enumerate.
    #[error("brute force supports at most {max} variables, got {num_variables}")]
    ProblemTooLarge { num_variables: usize, max: usize },
}

pub type SolveResult<T> = Result<T, SolveError>;
