//! Statevector simulation engine.
//!
//! Dense amplitude-vector simulation of the small gate set the ansatz
//! builders emit. Qubit `q` maps to bit `q` of the basis-state index.

use num_complex::Complex64;
use rand::Rng;

use crate::circuit::{Circuit, Gate};

/// A quantum state over `2^n` amplitudes.
pub struct Statevector {
    amplitudes: Vec<Complex64>,
    num_qubits: usize,
}

impl Statevector {
    /// Create a statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1usize << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Run a whole circuit from the |0...0⟩ state.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let mut sv = Self::new(circuit.num_qubits);
        for gate in &circuit.gates {
            sv.apply(gate);
        }
        sv
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Apply one gate.
    pub fn apply(&mut self, gate: &Gate) {
        match *gate {
            Gate::H { qubit } => self.apply_h(qubit),
            Gate::Rx { qubit, theta } => self.apply_rx(qubit, theta),
            Gate::Ry { qubit, theta } => self.apply_ry(qubit, theta),
            Gate::Rz { qubit, theta } => self.apply_rz(qubit, theta),
            Gate::Cx { control, target } => self.apply_cx(control, target),
            Gate::Cz { a, b } => self.apply_cz(a, b),
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1usize << qubit;
        let sqrt2_inv = std::f64::consts::FRAC_1_SQRT_2;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1usize << qubit;
        let c = (theta / 2.0).cos();
        let neg_i_s = Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1usize << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1usize << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == 0 {
                *amp *= phase_0;
            } else {
                *amp *= phase_1;
            }
        }
    }

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1usize << control;
        let tgt_mask = 1usize << target;
        for i in 0..self.amplitudes.len() {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_cz(&mut self, a: usize, b: usize) {
        let a_mask = 1usize << a;
        let b_mask = 1usize << b;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & a_mask != 0) && (i & b_mask != 0) {
                *amp = -*amp;
            }
        }
    }

    /// Measurement probabilities over basis-state indices.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Sample one measurement outcome with the supplied generator.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen();
        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }
        // Normalization leaves a sliver of probability mass to rounding.
        self.amplitudes.len() - 1
    }

    /// Bits of a basis-state index, variable 0 first.
    pub fn index_to_bits(&self, index: usize) -> Vec<u8> {
        (0..self.num_qubits)
            .map(|q| ((index >> q) & 1) as u8)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn initial_state_is_all_zeros() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(sv.amplitudes[1..].iter().all(|a| approx_eq(*a, Complex64::new(0.0, 0.0))));
    }

    #[test]
    fn hadamard_splits_amplitude() {
        let mut sv = Statevector::new(1);
        sv.apply_h(0);
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(h, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(h, 0.0)));
    }

    #[test]
    fn bell_state() {
        let mut sv = Statevector::new(2);
        sv.apply_h(0);
        sv.apply_cx(0, 1);
        let h = std::f64::consts::FRAC_1_SQRT_2;
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(h, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(h, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn ry_pi_flips_qubit() {
        let mut sv = Statevector::new(1);
        sv.apply_ry(0, std::f64::consts::PI);
        assert!((sv.probabilities()[1] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn probabilities_are_normalized() {
        let mut circuit = Circuit::new(3);
        circuit.h(0).ry(0.7, 1).cx(0, 2).cz(1, 2).rz(0.3, 0).rx(1.1, 2);
        let sv = Statevector::from_circuit(&circuit);
        let total: f64 = sv.probabilities().iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn sampling_a_basis_state_is_deterministic() {
        let mut sv = Statevector::new(1);
        sv.apply_ry(0, std::f64::consts::PI); // |1⟩
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..50 {
            assert_eq!(sv.sample(&mut rng), 1);
        }
    }

    #[test]
    fn index_to_bits_is_little_endian() {
        let sv = Statevector::new(4);
        assert_eq!(sv.index_to_bits(0b0011), vec![1, 1, 0, 0]);
    }
}
