//! The hybrid variational loop shared by VQE, CVaR-VQE and QAOA.
//!
//! One iteration: build the parameterized circuit, execute it, score
//! the measured distribution with the configured objective strategy,
//! record the score, and hand it to the classical optimizer for the
//! next parameter vector. The loop owns convergence detection and
//! best-seen tracking; the strategy and optimizer are interchangeable.

use std::f64::consts::{PI, TAU};

use qfolio_model::{DiagonalObservable, ProblemSpec, QuboModel};
use qfolio_sim::{
    Circuit, Executor, Sample, SampleBatch, hardware_efficient_ansatz, qaoa_ansatz,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument};

use crate::config::{SolverConfig, SolverKind};
use crate::error::{SolveError, SolveResult};
use crate::optimizer::{NelderMead, Optimizer};
use crate::solution::{ConvergenceTrace, RunOutcome, RunState, Solution, TracePoint};
use crate::strategy::{Cvar, MeanEnergy, ObjectiveStrategy, QaoaExpectation, WeightedEnergy};

/// Drives one variational solve against a fixed problem.
///
/// The spec and QUBO are borrowed read-only so a single compiled
/// problem can back several solver runs.
pub struct VariationalLoop<'a, E: Executor + ?Sized> {
    spec: &'a ProblemSpec,
    qubo: &'a QuboModel,
    observable: DiagonalObservable,
    executor: &'a E,
    config: SolverConfig,
}

impl<'a, E: Executor + ?Sized> VariationalLoop<'a, E> {
    /// Validates the configuration and derives the diagonal observable.
    pub fn new(
        spec: &'a ProblemSpec,
        qubo: &'a QuboModel,
        executor: &'a E,
        config: SolverConfig,
    ) -> SolveResult<Self> {
        config.validate()?;
        Ok(Self {
            spec,
            qubo,
            observable: DiagonalObservable::from_qubo(qubo),
            executor,
            config,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Run with the strategy and optimizer implied by the configured
    /// solver kind.
    pub fn run(&self) -> SolveResult<RunOutcome> {
        let num_params = self.config.num_parameters(self.qubo.num_variables);
        let mut optimizer =
            NelderMead::new(num_params).with_tolerance(self.config.tolerance * 1e-2);
        match self.config.kind {
            SolverKind::Vqe => self.run_with(&MeanEnergy, &mut optimizer),
            SolverKind::Cvar => {
                self.run_with(&Cvar::new(self.config.cvar_alpha), &mut optimizer)
            }
            SolverKind::Qaoa => self.run_with(&QaoaExpectation, &mut optimizer),
        }
    }

    /// Run with an explicit strategy and optimizer.
    pub fn run_with(
        &self,
        strategy: &dyn ObjectiveStrategy,
        optimizer: &mut dyn Optimizer,
    ) -> SolveResult<RunOutcome> {
        self.run_from(self.initial_parameters(), strategy, optimizer)
    }

    /// Run from a caller-chosen starting point, e.g. to warm-start from
    /// a previous trace.
    #[instrument(skip_all, fields(solver = self.config.kind.name()))]
    pub fn run_from(
        &self,
        initial_params: Vec<f64>,
        strategy: &dyn ObjectiveStrategy,
        optimizer: &mut dyn Optimizer,
    ) -> SolveResult<RunOutcome> {
        let n = self.qubo.num_variables;

        // Nothing to optimize: every assignment scores the same.
        if self.qubo.is_trivial() {
            info!(solver = self.config.kind.name(), "trivial model, skipping loop");
            return Ok(RunOutcome {
                solution: Solution::decode(vec![0; n], self.spec, self.qubo),
                state: RunState::Converged,
                iterations: 0,
                best_score: self.qubo.offset,
                trace: Vec::new(),
            });
        }

        let mut params = initial_params;
        let mut trace: ConvergenceTrace = Vec::new();
        let mut best_score = f64::INFINITY;
        let mut best_bits: Vec<u8> = vec![0; n];
        let mut prev_score = f64::INFINITY;
        let mut quiet_streak = 0usize;
        let mut state = RunState::BudgetExhausted;

        for iteration in 0..self.config.max_iterations {
            let circuit = self.build_circuit(&params);
            let batch = self
                .executor
                .run(&circuit, self.config.shots)
                .map_err(|e| SolveError::ExecutionFailure {
                    reason: e.to_string(),
                    trace: trace.clone(),
                    source: Some(e),
                })?;

            if let Err(reason) = check_batch(&batch, n) {
                return Err(SolveError::ExecutionFailure {
                    reason,
                    trace,
                    source: None,
                });
            }

            let energies: Vec<WeightedEnergy> = batch
                .samples
                .iter()
                .map(|s| WeightedEnergy {
                    energy: self.observable.energy(&s.bits),
                    probability: s.probability,
                })
                .collect();
            let score = strategy.score(&energies);
            if !score.is_finite() {
                return Err(SolveError::NumericalDegeneracy { iteration, trace });
            }

            trace.push(TracePoint { iteration, score });
            debug!(
                solver = self.config.kind.name(),
                iteration, score, "iteration complete"
            );

            if score < best_score {
                best_score = score;
                best_bits = likeliest_bits(&batch);
            }

            if (score - prev_score).abs() < self.config.tolerance {
                quiet_streak += 1;
            } else {
                quiet_streak = 0;
            }
            prev_score = score;
            if quiet_streak >= self.config.patience {
                state = RunState::Converged;
                break;
            }

            params = optimizer.step(&params, score);
            if optimizer.converged() {
                state = RunState::Converged;
                break;
            }
        }

        let solution = Solution::decode(best_bits, self.spec, self.qubo);
        info!(
            solver = self.config.kind.name(),
            strategy = strategy.name(),
            iterations = trace.len(),
            best_score,
            bitstring = %solution.bitstring,
            feasible = solution.feasible,
            "run finished"
        );

        Ok(RunOutcome {
            solution,
            state,
            iterations: trace.len(),
            best_score,
            trace,
        })
    }

    /// Seeded random start: rotation angles over a full turn for the
    /// hardware-efficient ansatz, half a turn for QAOA angles.
    fn initial_parameters(&self) -> Vec<f64> {
        let num_params = self.config.num_parameters(self.qubo.num_variables);
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let upper = match self.config.kind {
            SolverKind::Vqe | SolverKind::Cvar => TAU,
            SolverKind::Qaoa => PI,
        };
        (0..num_params).map(|_| rng.gen_range(0.0..upper)).collect()
    }

    fn build_circuit(&self, params: &[f64]) -> Circuit {
        match self.config.kind {
            SolverKind::Vqe | SolverKind::Cvar => {
                hardware_efficient_ansatz(self.qubo.num_variables, self.config.reps, params)
            }
            SolverKind::Qaoa => {
                let layers = self.config.qaoa_layers;
                qaoa_ansatz(&self.observable, &params[..layers], &params[layers..])
            }
        }
    }
}

/// The batch the loop is willing to score: non-empty, right register
/// width, sane probabilities.
fn check_batch(batch: &SampleBatch, num_variables: usize) -> Result<(), String> {
    if batch.samples.is_empty() {
        return Err("executor returned an empty batch".into());
    }
    for sample in &batch.samples {
        if sample.bits.len() != num_variables {
            return Err(format!(
                "sample has {} bits, expected {num_variables}",
                sample.bits.len()
            ));
        }
        if !sample.probability.is_finite() || sample.probability < 0.0 {
            return Err(format!("invalid sample probability {}", sample.probability));
        }
    }
    if batch.total_mass() <= 0.0 {
        return Err("batch carries no probability mass".into());
    }
    Ok(())
}

/// The decode rule: the highest-probability outcome, breaking exact
/// ties toward the lexicographically smallest bitstring so reruns pick
/// the same answer.
fn likeliest_bits(batch: &SampleBatch) -> Vec<u8> {
    let mut best: Option<&Sample> = None;
    for sample in &batch.samples {
        best = Some(match best {
            None => sample,
            Some(champion) => {
                if sample.probability > champion.probability
                    || (sample.probability == champion.probability
                        && sample.bits < champion.bits)
                {
                    sample
                } else {
                    champion
                }
            }
        });
    }
    best.map(|s| s.bits.clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qfolio_sim::SampleBatch;

    fn sample(bits: &[u8], probability: f64) -> Sample {
        Sample {
            bits: bits.to_vec(),
            probability,
        }
    }

    #[test]
    fn likeliest_picks_highest_probability() {
        let batch = SampleBatch {
            samples: vec![sample(&[0, 1], 0.9), sample(&[1, 0], 0.1)],
        };
        assert_eq!(likeliest_bits(&batch), vec![0, 1]);
    }

    #[test]
    fn likeliest_breaks_ties_lexicographically() {
        let batch = SampleBatch {
            samples: vec![sample(&[1, 0], 0.5), sample(&[0, 1], 0.5)],
        };
        assert_eq!(likeliest_bits(&batch), vec![0, 1]);
    }

    #[test]
    fn check_batch_rejects_width_mismatch() {
        let batch = SampleBatch {
            samples: vec![sample(&[0, 1, 1], 1.0)],
        };
        assert!(check_batch(&batch, 2).is_err());
        assert!(check_batch(&batch, 3).is_ok());
    }

    #[test]
    fn check_batch_rejects_empty_and_massless() {
        let empty = SampleBatch { samples: vec![] };
        assert!(check_batch(&empty, 2).is_err());

        let massless = SampleBatch {
            samples: vec![sample(&[0, 0], 0.0)],
        };
        assert!(check_batch(&massless, 2).is_err());
    }
}
