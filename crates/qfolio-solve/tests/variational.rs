//! Loop behavior against scripted executors, plus one real end-to-end
//! run on the statevector simulator.

use std::sync::Mutex;

use ndarray::Array2;
use qfolio_model::{PenaltyConfig, ProblemSpec, QuboModel, compile};
use qfolio_sim::{
    Circuit, ExecError, ExecResult, Executor, Sample, SampleBatch, StatevectorExecutor,
};
use qfolio_solve::{
    Cvar, MeanEnergy, NelderMead, RunState, SolveError, SolverConfig, SolverKind,
    VariationalLoop, brute_force,
};

/// Replays a fixed script of batches; errors once the script runs out.
struct ScriptedExecutor {
    script: Vec<SampleBatch>,
    calls: Mutex<usize>,
}

impl ScriptedExecutor {
    fn new(script: Vec<SampleBatch>) -> Self {
        Self {
            script,
            calls: Mutex::new(0),
        }
    }

    /// Returns the same batch on every call.
    fn pinned(batch: SampleBatch) -> Self {
        Self::new(vec![batch])
    }
}

impl Executor for ScriptedExecutor {
    fn run(&self, _circuit: &Circuit, _shots: u32) -> ExecResult<SampleBatch> {
        let mut calls = self
            .calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let index = *calls;
        *calls += 1;

        if self.script.len() == 1 {
            return Ok(self.script[0].clone());
        }
        self.script
            .get(index)
            .cloned()
            .ok_or(ExecError::BackendUnavailable("script exhausted".into()))
    }
}

fn batch(outcomes: &[(&[u8], f64)]) -> SampleBatch {
    SampleBatch {
        samples: outcomes
            .iter()
            .map(|&(bits, probability)| Sample {
                bits: bits.to_vec(),
                probability,
            })
            .collect(),
    }
}

fn four_asset_problem() -> (ProblemSpec, QuboModel) {
    let cov = Array2::from_diag(&ndarray::arr1(&[0.01, 0.02, 0.015, 0.005]));
    let spec = ProblemSpec::new(&[0.1, 0.2, 0.15, 0.05], cov, 2, 1.0).unwrap();
    let qubo = compile(&spec, &PenaltyConfig::new(10.0)).unwrap();
    (spec, qubo)
}

#[test]
fn constant_scores_converge_within_patience() {
    let (spec, qubo) = four_asset_problem();
    let executor = ScriptedExecutor::pinned(batch(&[(&[0, 1, 1, 0], 1.0)]));
    let config = SolverConfig::new(SolverKind::Vqe)
        .with_max_iterations(100)
        .with_patience(3);

    let outcome = VariationalLoop::new(&spec, &qubo, &executor, config)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(outcome.state, RunState::Converged);
    // One establishing iteration plus `patience` identical follow-ups.
    assert!(outcome.iterations <= 4, "took {} iterations", outcome.iterations);
}

#[test]
fn decode_picks_the_dominant_outcome() {
    let (spec, qubo) = four_asset_problem();
    let executor = ScriptedExecutor::pinned(batch(&[
        (&[0, 1, 0, 1], 0.9),
        (&[1, 0, 1, 0], 0.1),
    ]));
    let config = SolverConfig::new(SolverKind::Vqe).with_max_iterations(10);

    let outcome = VariationalLoop::new(&spec, &qubo, &executor, config)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(outcome.solution.bitstring, "0101");
    assert!(outcome.solution.feasible);
    assert_eq!(outcome.solution.selected, vec![1, 3]);
}

#[test]
fn end_to_end_with_pinned_feasible_outcome() {
    let (spec, qubo) = four_asset_problem();
    let executor = ScriptedExecutor::pinned(batch(&[(&[1, 1, 0, 0], 1.0)]));
    let config = SolverConfig::new(SolverKind::Vqe);

    let outcome = VariationalLoop::new(&spec, &qubo, &executor, config)
        .unwrap()
        .run()
        .unwrap();

    let solution = &outcome.solution;
    assert!(solution.feasible);
    assert_eq!(solution.selected, vec![0, 1]);
    // On budget: penalty vanishes, QUBO value equals the objective.
    assert!((solution.qubo_value - solution.objective_value).abs() < 1e-12);
    assert!((solution.qubo_value - spec.objective(&[1, 1, 0, 0])).abs() < 1e-12);
}

#[test]
fn executor_failure_carries_partial_trace() {
    let (spec, qubo) = four_asset_problem();
    // Two good batches, then the script runs out.
    let executor = ScriptedExecutor::new(vec![
        batch(&[(&[0, 1, 1, 0], 1.0)]),
        batch(&[(&[0, 1, 0, 1], 1.0)]),
    ]);
    let config = SolverConfig::new(SolverKind::Vqe).with_max_iterations(50);

    let err = VariationalLoop::new(&spec, &qubo, &executor, config)
        .unwrap()
        .run()
        .unwrap_err();

    match err {
        SolveError::ExecutionFailure { trace, source, .. } => {
            assert_eq!(trace.len(), 2);
            assert!(source.is_some());
        }
        other => panic!("expected ExecutionFailure, got {other:?}"),
    }
}

#[test]
fn malformed_batch_is_an_execution_failure() {
    let (spec, qubo) = four_asset_problem();
    // Wrong register width.
    let executor = ScriptedExecutor::pinned(batch(&[(&[0, 1], 1.0)]));
    let config = SolverConfig::new(SolverKind::Vqe);

    let err = VariationalLoop::new(&spec, &qubo, &executor, config)
        .unwrap()
        .run()
        .unwrap_err();

    match err {
        SolveError::ExecutionFailure { trace, source, .. } => {
            assert!(trace.is_empty());
            assert!(source.is_none());
        }
        other => panic!("expected ExecutionFailure, got {other:?}"),
    }
}

#[test]
fn invalid_config_is_rejected_before_running() {
    let (spec, qubo) = four_asset_problem();
    let executor = ScriptedExecutor::pinned(batch(&[(&[0, 0, 0, 0], 1.0)]));
    let config = SolverConfig::new(SolverKind::Cvar).with_cvar_alpha(2.0);

    assert!(matches!(
        VariationalLoop::new(&spec, &qubo, &executor, config),
        Err(SolveError::InvalidAlpha(_))
    ));
}

#[test]
fn trivial_model_short_circuits() {
    let spec = ProblemSpec::new(&[], Array2::zeros((0, 0)), 1, 1.0).unwrap();
    let qubo = compile(&spec, &PenaltyConfig::new(1.0)).unwrap();
    let executor = ScriptedExecutor::new(vec![]);
    let config = SolverConfig::new(SolverKind::Vqe);

    let outcome = VariationalLoop::new(&spec, &qubo, &executor, config)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(outcome.state, RunState::Converged);
    assert_eq!(outcome.iterations, 0);
    assert!(outcome.trace.is_empty());
}

#[test]
fn cvar_and_mean_agree_when_alpha_is_one() {
    let (spec, qubo) = four_asset_problem();
    let executor = ScriptedExecutor::pinned(batch(&[
        (&[0, 1, 1, 0], 0.6),
        (&[1, 1, 0, 0], 0.4),
    ]));
    let config = SolverConfig::new(SolverKind::Cvar).with_max_iterations(5);

    let loop_ = VariationalLoop::new(&spec, &qubo, &executor, config).unwrap();
    let num_params = loop_.config().num_parameters(qubo.num_variables);

    let mean = loop_
        .run_with(&MeanEnergy, &mut NelderMead::new(num_params))
        .unwrap();
    let cvar = loop_
        .run_with(&Cvar::new(1.0), &mut NelderMead::new(num_params))
        .unwrap();

    for (a, b) in mean.trace.iter().zip(cvar.trace.iter()) {
        assert!((a.score - b.score).abs() < 1e-12);
    }
}

#[test]
fn statevector_vqe_runs_end_to_end() {
    let cov = Array2::from_diag(&ndarray::arr1(&[0.01, 0.02, 0.015]));
    let spec = ProblemSpec::new(&[0.1, 0.2, 0.15], cov, 1, 1.0).unwrap();
    let qubo = compile(&spec, &PenaltyConfig::suggested(&spec)).unwrap();
    let executor = StatevectorExecutor::new(7);
    let config = SolverConfig::new(SolverKind::Vqe)
        .with_max_iterations(40)
        .with_seed(3);

    let outcome = VariationalLoop::new(&spec, &qubo, &executor, config)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(outcome.solution.bits.len(), 3);
    assert_eq!(outcome.iterations, outcome.trace.len());
    assert!(outcome.best_score.is_finite());
    // The best score can never beat the true optimum of the QUBO.
    let exact = brute_force(&spec, &qubo).unwrap();
    assert!(outcome.best_score >= exact.qubo_value - 1e-9);
}

#[test]
fn statevector_qaoa_runs_end_to_end() {
    let cov = Array2::from_diag(&ndarray::arr1(&[0.01, 0.02, 0.015]));
    let spec = ProblemSpec::new(&[0.1, 0.2, 0.15], cov, 1, 1.0).unwrap();
    let qubo = compile(&spec, &PenaltyConfig::suggested(&spec)).unwrap();
    let executor = StatevectorExecutor::new(7);
    let config = SolverConfig::new(SolverKind::Qaoa)
        .with_max_iterations(30)
        .with_qaoa_layers(1)
        .with_seed(3);

    let outcome = VariationalLoop::new(&spec, &qubo, &executor, config)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(outcome.solution.bits.len(), 3);
    assert!(outcome.best_score.is_finite());
}
