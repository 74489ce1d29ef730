//! qfolio: constrained portfolio selection via hybrid variational
//! quantum algorithms.
//!
//! Generates (or is pointed at) a mean-variance selection problem,
//! compiles it to a penalty-augmented QUBO, and solves it with VQE,
//! CVaR-VQE, QAOA or a classical baseline. `--run-all` runs every
//! solver concurrently against the same compiled problem and prints a
//! comparison table.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use qfolio_model::{PenaltyConfig, ProblemSpec, QuboModel, compile};
use qfolio_sim::StatevectorExecutor;
use qfolio_solve::{
    BRUTE_FORCE_MAX_VARIABLES, SimulatedAnnealing, SolverConfig, SolverKind, VariationalLoop,
    brute_force,
};

mod report;

use report::SolverReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SolverArg {
    /// Plain VQE with a hardware-efficient ansatz.
    Vqe,
    /// CVaR-VQE, scoring the lowest-energy tail.
    Cvar,
    /// QAOA over the problem Hamiltonian.
    Qaoa,
    /// Classical baseline: exhaustive for small instances, simulated
    /// annealing beyond that.
    Classical,
}

impl SolverArg {
    fn name(self) -> &'static str {
        match self {
            SolverArg::Vqe => "vqe",
            SolverArg::Cvar => "cvar",
            SolverArg::Qaoa => "qaoa",
            SolverArg::Classical => "classical",
        }
    }
}

/// Quantum portfolio selection demo
#[derive(Parser, Debug, Clone)]
#[command(name = "qfolio")]
#[command(about = "Constrained portfolio selection via VQE, CVaR-VQE and QAOA")]
struct Args {
    /// Number of assets in the synthetic universe
    #[arg(short, long, default_value = "6")]
    num_assets: usize,

    /// Maximum number of assets to select (default: half the universe)
    #[arg(short, long)]
    budget: Option<usize>,

    /// Risk-aversion trade-off between return and variance
    #[arg(long, default_value = "1.0")]
    risk_aversion: f64,

    /// Solver to run
    #[arg(long, value_enum, default_value = "cvar")]
    solver: SolverArg,

    /// Run every solver against the same problem and compare
    #[arg(long)]
    run_all: bool,

    /// CVaR tail fraction in (0, 1]
    #[arg(long, default_value = "0.2")]
    cvar_alpha: f64,

    /// Rotation-layer repetitions of the hardware-efficient ansatz
    #[arg(long, default_value = "1")]
    reps: usize,

    /// QAOA cost/mixer layer pairs
    #[arg(long, default_value = "2")]
    qaoa_layers: usize,

    /// Maximum optimizer iterations
    #[arg(short, long, default_value = "150")]
    max_iterations: usize,

    /// Convergence tolerance on the objective score
    #[arg(long, default_value = "1e-6")]
    tolerance: f64,

    /// Consecutive quiet iterations required to declare convergence
    #[arg(long, default_value = "3")]
    patience: usize,

    /// Measurement shots per iteration (0 = exact distribution)
    #[arg(short, long, default_value = "0")]
    shots: u32,

    /// Seed for problem generation, initialization and sampling
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Budget-penalty weight (default: heuristic from the objective)
    #[arg(long)]
    penalty: Option<f64>,

    /// Output directory for JSON results
    #[arg(short, long, default_value = "results")]
    output: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    report::print_header("qfolio: quantum portfolio selection");

    let budget = args
        .budget
        .unwrap_or_else(|| (args.num_assets / 2).max(1));
    let spec = Arc::new(ProblemSpec::synthetic(
        args.num_assets,
        budget,
        args.risk_aversion,
        args.seed,
    )?);
    let penalty = args
        .penalty
        .map(PenaltyConfig::new)
        .unwrap_or_else(|| PenaltyConfig::suggested(&spec));
    let qubo = Arc::new(compile(&spec, &penalty)?);

    info!(
        num_assets = args.num_assets,
        budget,
        risk_aversion = args.risk_aversion,
        penalty = penalty.budget_penalty,
        quadratic_terms = qubo.quadratic.len(),
        "problem compiled"
    );

    fs::create_dir_all(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let solvers: Vec<SolverArg> = if args.run_all {
        vec![
            SolverArg::Classical,
            SolverArg::Vqe,
            SolverArg::Cvar,
            SolverArg::Qaoa,
        ]
    } else {
        vec![args.solver]
    };

    // The problem is shared read-only; each solver run is CPU-bound, so
    // they go to the blocking pool.
    let mut handles = Vec::new();
    for solver in solvers {
        let spec = Arc::clone(&spec);
        let qubo = Arc::clone(&qubo);
        let args = args.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            run_solver(solver, &spec, &qubo, &args)
        }));
    }

    let mut reports = Vec::new();
    for handle in handles {
        reports.push(handle.await??);
    }

    for report in &reports {
        report::print_report(report);
        let path = args.output.join(format!("{}_result.json", report.solver));
        fs::write(&path, serde_json::to_string_pretty(report)?)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("results saved to {}", path.display());
    }

    if reports.len() > 1 {
        report::print_comparison(&reports);
    }

    Ok(())
}

fn run_solver(
    solver: SolverArg,
    spec: &ProblemSpec,
    qubo: &QuboModel,
    args: &Args,
) -> Result<SolverReport> {
    let started = Instant::now();

    if solver == SolverArg::Classical {
        let solution = if qubo.num_variables <= BRUTE_FORCE_MAX_VARIABLES {
            brute_force(spec, qubo)?
        } else {
            SimulatedAnnealing::new(args.seed).solve(spec, qubo)?
        };
        return Ok(SolverReport {
            solver: solver.name(),
            solution,
            state: None,
            iterations: 0,
            best_score: None,
            runtime_secs: started.elapsed().as_secs_f64(),
            trace: Vec::new(),
        });
    }

    let kind = match solver {
        SolverArg::Vqe => SolverKind::Vqe,
        SolverArg::Cvar => SolverKind::Cvar,
        SolverArg::Qaoa => SolverKind::Qaoa,
        SolverArg::Classical => unreachable!("handled above"),
    };
    let config = SolverConfig::new(kind)
        .with_max_iterations(args.max_iterations)
        .with_tolerance(args.tolerance)
        .with_patience(args.patience)
        .with_cvar_alpha(args.cvar_alpha)
        .with_reps(args.reps)
        .with_qaoa_layers(args.qaoa_layers)
        .with_shots(args.shots)
        .with_seed(args.seed);

    let executor = StatevectorExecutor::new(args.seed);
    let outcome = VariationalLoop::new(spec, qubo, &executor, config)?.run()?;

    Ok(SolverReport {
        solver: solver.name(),
        solution: outcome.solution,
        state: Some(outcome.state),
        iterations: outcome.iterations,
        best_score: Some(outcome.best_score),
        runtime_secs: started.elapsed().as_secs_f64(),
        trace: outcome.trace,
    })
}
