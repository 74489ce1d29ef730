//! Binary-to-spin conversion of a compiled QUBO.
//!
//! Substituting `x_i = (1 − z_i) / 2` maps each binary variable onto a
//! Pauli-Z eigenvalue `z_i ∈ {+1, −1}` (bit 0 ↦ +1, bit 1 ↦ −1). The
//! resulting observable is diagonal in the computational basis, so its
//! expectation value over measured bitstrings is a plain weighted sum of
//! per-bitstring energies.

use serde::{Deserialize, Serialize};

use crate::qubo::QuboModel;

/// A QUBO expressed in the Pauli-Z basis:
/// `offset + Σ_i z[i]·Z_i + Σ_{i<j} zz[(i,j)]·Z_i Z_j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagonalObservable {
    /// Number of qubits (one per QUBO variable).
    pub num_qubits: usize,
    /// Single-qubit Z coefficients.
    pub z: Vec<f64>,
    /// Two-qubit ZZ coefficients for `i < j`, sorted by `(i, j)`.
    pub zz: Vec<((usize, usize), f64)>,
    /// Constant offset absorbed during the substitution.
    pub offset: f64,
}

impl DiagonalObservable {
    /// Convert a compiled QUBO via `x_i = (1 − z_i) / 2`.
    pub fn from_qubo(qubo: &QuboModel) -> Self {
        let n = qubo.num_variables;
        let mut z = vec![0.0; n];
        let mut zz = Vec::with_capacity(qubo.quadratic.len());
        let mut offset = qubo.offset;

        // c·x_i → c/2 − (c/2)·Z_i
        for (i, &c) in qubo.linear.iter().enumerate() {
            offset += c / 2.0;
            z[i] -= c / 2.0;
        }

        // c·x_i x_j → c/4·(1 − Z_i − Z_j + Z_i Z_j)
        for &((i, j), c) in &qubo.quadratic {
            offset += c / 4.0;
            z[i] -= c / 4.0;
            z[j] -= c / 4.0;
            zz.push(((i, j), c / 4.0));
        }

        Self {
            num_qubits: n,
            z,
            zz,
            offset,
        }
    }

    /// Energy of a computational-basis bitstring.
    ///
    /// Exactly reproduces [`QuboModel::evaluate`] on the source model.
    pub fn energy(&self, bits: &[u8]) -> f64 {
        debug_assert_eq!(bits.len(), self.num_qubits);

        let spin = |b: u8| if b == 0 { 1.0 } else { -1.0 };

        let mut energy = self.offset;
        for (i, &c) in self.z.iter().enumerate() {
            energy += c * spin(bits[i]);
        }
        for &((i, j), c) in &self.zz {
            energy += c * spin(bits[i]) * spin(bits[j]);
        }
        energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::ProblemSpec;
    use crate::qubo::{PenaltyConfig, compile};
    use approx::assert_relative_eq;

    fn index_to_bits(index: usize, n: usize) -> Vec<u8> {
        (0..n).map(|q| ((index >> q) & 1) as u8).collect()
    }

    #[test]
    fn round_trips_every_bitstring() {
        let spec = ProblemSpec::synthetic(5, 2, 1.5, 42).unwrap();
        let qubo = compile(&spec, &PenaltyConfig::suggested(&spec)).unwrap();
        let observable = DiagonalObservable::from_qubo(&qubo);

        for index in 0..(1usize << 5) {
            let bits = index_to_bits(index, 5);
            assert_relative_eq!(
                observable.energy(&bits),
                qubo.evaluate(&bits),
                epsilon = 1e-9,
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn empty_model_has_constant_energy() {
        let spec = ProblemSpec::new(&[], ndarray::Array2::zeros((0, 0)), 1, 1.0).unwrap();
        let qubo = compile(&spec, &PenaltyConfig::new(2.0)).unwrap();
        let observable = DiagonalObservable::from_qubo(&qubo);
        assert_eq!(observable.num_qubits, 0);
        assert_relative_eq!(observable.energy(&[]), qubo.offset);
    }
}
