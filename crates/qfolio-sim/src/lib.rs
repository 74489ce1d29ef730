//! Circuit construction and execution for qfolio.
//!
//! The variational solvers treat circuit execution as a black box behind
//! the [`Executor`] trait: hand in a parameterized circuit, get back a
//! batch of measured bitstrings with probabilities. This crate provides
//! the circuit representation, the ansatz builders the solvers use, and
//! a local statevector simulator as the default executor.

pub mod circuit;
pub mod error;
pub mod executor;
pub mod statevector;

pub use circuit::{
    Circuit, Gate, hardware_efficient_ansatz, hardware_efficient_num_parameters, qaoa_ansatz,
    qaoa_num_parameters,
};
pub use error::{ExecError, ExecResult};
pub use executor::{Executor, Sample, SampleBatch, StatevectorExecutor};
pub use statevector::Statevector;
