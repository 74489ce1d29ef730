//! The execution boundary between the variational loop and whatever
//! actually runs circuits.
//!
//! The loop only ever sees a [`SampleBatch`]: measured bitstrings with
//! associated probabilities. [`StatevectorExecutor`] fills that contract
//! locally, either with the exact output distribution or with seeded
//! shot sampling.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rustc_hash::FxHashMap;
use std::sync::Mutex;
use tracing::debug;

use crate::circuit::Circuit;
use crate::error::{ExecError, ExecResult};
use crate::statevector::Statevector;

/// One measured outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Measured bits, variable 0 first.
    pub bits: Vec<u8>,
    /// Probability (exact or empirical) of this outcome.
    pub probability: f64,
}

/// An ordered batch of measurement outcomes from one circuit evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleBatch {
    /// Outcomes, ordered by basis-state index.
    pub samples: Vec<Sample>,
}

impl SampleBatch {
    /// Total probability mass in the batch.
    pub fn total_mass(&self) -> f64 {
        self.samples.iter().map(|s| s.probability).sum()
    }
}

/// The execution collaborator: evaluates a circuit and returns sampled
/// bitstrings with probabilities.
///
/// Implementations may be simulators or hardware clients; the loop makes
/// no assumption beyond this call.
pub trait Executor {
    /// Run a circuit. `shots = 0` requests the exact output distribution
    /// where the backend can provide one; otherwise probabilities are
    /// empirical frequencies over `shots` measurements.
    fn run(&self, circuit: &Circuit, shots: u32) -> ExecResult<SampleBatch>;
}

/// Local statevector executor.
///
/// Supports circuits up to `max_qubits` (memory-bound: `2^n` amplitudes).
/// Shot sampling draws from a seeded generator, so a fixed seed gives
/// reproducible runs.
pub struct StatevectorExecutor {
    max_qubits: usize,
    rng: Mutex<StdRng>,
}

/// Probabilities below this are dropped from exact distributions.
const PROBABILITY_FLOOR: f64 = 1e-12;

impl StatevectorExecutor {
    /// Create an executor with the default 20-qubit ceiling.
    pub fn new(seed: u64) -> Self {
        Self::with_max_qubits(seed, 20)
    }

    /// Create an executor with a custom qubit ceiling.
    pub fn with_max_qubits(seed: u64, max_qubits: usize) -> Self {
        Self {
            max_qubits,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn check(&self, circuit: &Circuit) -> ExecResult<()> {
        if circuit.num_qubits > self.max_qubits {
            return Err(ExecError::CircuitTooLarge {
                num_qubits: circuit.num_qubits,
                max_qubits: self.max_qubits,
            });
        }
        for gate in &circuit.gates {
            let (a, b) = gate.qubits();
            for qubit in std::iter::once(a).chain(b) {
                if qubit >= circuit.num_qubits {
                    return Err(ExecError::QubitOutOfRange {
                        qubit,
                        num_qubits: circuit.num_qubits,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Executor for StatevectorExecutor {
    fn run(&self, circuit: &Circuit, shots: u32) -> ExecResult<SampleBatch> {
        self.check(circuit)?;

        let sv = Statevector::from_circuit(circuit);
        debug!(
            num_qubits = circuit.num_qubits,
            gates = circuit.len(),
            shots,
            "simulated circuit"
        );

        let samples = if shots == 0 {
            // Exact distribution, tiny amplitudes pruned.
            sv.probabilities()
                .into_iter()
                .enumerate()
                .filter(|&(_, p)| p > PROBABILITY_FLOOR)
                .map(|(index, probability)| Sample {
                    bits: sv.index_to_bits(index),
                    probability,
                })
                .collect()
        } else {
            let mut counts: FxHashMap<usize, u32> = FxHashMap::default();
            {
                let mut rng = self
                    .rng
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                for _ in 0..shots {
                    *counts.entry(sv.sample(&mut *rng)).or_insert(0) += 1;
                }
            }

            let mut indexed: Vec<_> = counts.into_iter().collect();
            indexed.sort_unstable_by_key(|&(index, _)| index);
            indexed
                .into_iter()
                .map(|(index, count)| Sample {
                    bits: sv.index_to_bits(index),
                    probability: f64::from(count) / f64::from(shots),
                })
                .collect()
        };

        Ok(SampleBatch { samples })
    }
}
