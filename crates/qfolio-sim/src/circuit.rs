//! Parameterized circuits for the variational solvers.
//!
//! Two ansatz families are used:
//!
//! - A hardware-efficient ansatz (Ry/Rz rotations plus a CZ entangling
//!   chain) for VQE and CVaR-VQE.
//! - The QAOA ansatz (uniform superposition, then alternating cost and
//!   mixer layers derived from the diagonal observable).

use qfolio_model::DiagonalObservable;
use serde::{Deserialize, Serialize};

/// A single gate in a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    /// Hadamard.
    H { qubit: usize },
    /// X-rotation by `theta`.
    Rx { qubit: usize, theta: f64 },
    /// Y-rotation by `theta`.
    Ry { qubit: usize, theta: f64 },
    /// Z-rotation by `theta`.
    Rz { qubit: usize, theta: f64 },
    /// Controlled-X.
    Cx { control: usize, target: usize },
    /// Controlled-Z (symmetric in its qubits).
    Cz { a: usize, b: usize },
}

impl Gate {
    /// Qubit indices this gate touches.
    pub fn qubits(&self) -> (usize, Option<usize>) {
        match *self {
            Gate::H { qubit } | Gate::Rx { qubit, .. } | Gate::Ry { qubit, .. }
            | Gate::Rz { qubit, .. } => (qubit, None),
            Gate::Cx { control, target } => (control, Some(target)),
            Gate::Cz { a, b } => (a, Some(b)),
        }
    }
}

/// An ordered gate list over a fixed qubit register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    /// Register width.
    pub num_qubits: usize,
    /// Gates in application order.
    pub gates: Vec<Gate>,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            gates: Vec::new(),
        }
    }

    /// Append a Hadamard.
    pub fn h(&mut self, qubit: usize) -> &mut Self {
        self.gates.push(Gate::H { qubit });
        self
    }

    /// Append an X-rotation.
    pub fn rx(&mut self, theta: f64, qubit: usize) -> &mut Self {
        self.gates.push(Gate::Rx { qubit, theta });
        self
    }

    /// Append a Y-rotation.
    pub fn ry(&mut self, theta: f64, qubit: usize) -> &mut Self {
        self.gates.push(Gate::Ry { qubit, theta });
        self
    }

    /// Append a Z-rotation.
    pub fn rz(&mut self, theta: f64, qubit: usize) -> &mut Self {
        self.gates.push(Gate::Rz { qubit, theta });
        self
    }

    /// Append a controlled-X.
    pub fn cx(&mut self, control: usize, target: usize) -> &mut Self {
        self.gates.push(Gate::Cx { control, target });
        self
    }

    /// Append a controlled-Z.
    pub fn cz(&mut self, a: usize, b: usize) -> &mut Self {
        self.gates.push(Gate::Cz { a, b });
        self
    }

    /// Number of gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// True when the circuit has no gates.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

/// Build the hardware-efficient ansatz: `reps` repetitions of a Ry/Rz
/// rotation layer followed by a linear CZ entangling chain.
///
/// Needs `2 * num_qubits * reps` parameters.
pub fn hardware_efficient_ansatz(num_qubits: usize, reps: usize, params: &[f64]) -> Circuit {
    let expected = hardware_efficient_num_parameters(num_qubits, reps);
    assert_eq!(
        params.len(),
        expected,
        "hardware-efficient ansatz needs {expected} parameters, got {}",
        params.len()
    );

    let mut circuit = Circuit::new(num_qubits);
    let mut idx = 0;

    for _ in 0..reps {
        for q in 0..num_qubits {
            circuit.ry(params[idx], q);
            circuit.rz(params[idx + 1], q);
            idx += 2;
        }
        for q in 0..num_qubits.saturating_sub(1) {
            circuit.cz(q, q + 1);
        }
    }

    circuit
}

/// Parameter count of [`hardware_efficient_ansatz`].
pub fn hardware_efficient_num_parameters(num_qubits: usize, reps: usize) -> usize {
    2 * num_qubits * reps
}

/// Build the QAOA ansatz for a diagonal observable.
///
/// Prepares |+⟩^n, then alternates `p = gammas.len()` cost layers
/// `exp(−iγ H)` (RZZ via CX·RZ·CX, plus single-qubit RZ) with mixer
/// layers `exp(−iβ ΣX)` (RX(2β) on every qubit).
pub fn qaoa_ansatz(observable: &DiagonalObservable, gammas: &[f64], betas: &[f64]) -> Circuit {
    assert_eq!(
        gammas.len(),
        betas.len(),
        "gamma and beta must have the same length"
    );

    let n = observable.num_qubits;
    let mut circuit = Circuit::new(n);

    for q in 0..n {
        circuit.h(q);
    }

    for (&gamma, &beta) in gammas.iter().zip(betas) {
        // Cost layer: each ZZ term evolves as CX · RZ(2γc) · CX, each Z
        // term as RZ(2γc).
        for &((i, j), c) in &observable.zz {
            circuit.cx(i, j);
            circuit.rz(2.0 * gamma * c, j);
            circuit.cx(i, j);
        }
        for (q, &c) in observable.z.iter().enumerate() {
            if c != 0.0 {
                circuit.rz(2.0 * gamma * c, q);
            }
        }

        // Mixer layer.
        for q in 0..n {
            circuit.rx(2.0 * beta, q);
        }
    }

    circuit
}

/// Parameter count of [`qaoa_ansatz`] with `layers` cost/mixer pairs.
pub fn qaoa_num_parameters(layers: usize) -> usize {
    2 * layers
}
