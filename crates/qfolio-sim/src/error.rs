//! Error types for the sim crate.

use thiserror::Error;

/// Errors produced by circuit execution.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExecError {
    /// The circuit needs more qubits than the executor supports.
    #[error("circuit has {num_qubits} qubits but the executor supports at most {max_qubits}")]
    CircuitTooLarge {
        /// Qubits required by the circuit.
        num_qubits: usize,
        /// Executor capacity.
        max_qubits: usize,
    },

    /// A gate references a qubit outside the circuit.
    #[error("gate references qubit {qubit} but the circuit only has {num_qubits} qubits")]
    QubitOutOfRange {
        /// The offending qubit index.
        qubit: usize,
        /// Number of qubits in the circuit.
        num_qubits: usize,
    },

    /// The backing execution service reported a failure.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}

/// Result type for execution operations.
pub type ExecResult<T> = Result<T, ExecError>;
