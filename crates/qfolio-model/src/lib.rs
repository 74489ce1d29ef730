//! Problem model and QUBO compilation for qfolio.
//!
//! This crate holds the read-only description of a constrained
//! portfolio-selection problem and compiles it into an unconstrained
//! binary-quadratic form:
//!
//! - [`ProblemSpec`] — assets, covariance, budget and risk aversion.
//! - [`QuboModel`] — penalty-augmented binary-quadratic coefficients,
//!   produced once per spec by [`compile`].
//! - [`DiagonalObservable`] — the same model in the Pauli-Z basis, ready
//!   for expectation evaluation against measured bitstrings.
//! - [`validate`] — checks a decoded bitstring against the original
//!   constraints.
//!
//! Everything here is pure and deterministic: a `ProblemSpec` compiled
//! twice yields identical term orderings, and evaluating the observable
//! on a computational-basis bitstring reproduces the QUBO value exactly.

pub mod asset;
pub mod error;
pub mod ising;
pub mod qubo;
pub mod validate;

pub use asset::{Asset, ProblemSpec};
pub use error::{ModelError, ModelResult};
pub use ising::DiagonalObservable;
pub use qubo::{PenaltyConfig, QuboModel, compile};
pub use validate::{ConstraintId, Validation, selected_indices, validate};

/// Render a bitstring as the conventional `"0101"` form, variable 0 first.
pub fn bits_to_string(bits: &[u8]) -> String {
    bits.iter().map(|b| if *b == 0 { '0' } else { '1' }).collect()
}
