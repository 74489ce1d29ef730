//! Console and JSON reporting for solver runs.

use console::style;
use qfolio_solve::{ConvergenceTrace, RunState, Solution};
use serde::Serialize;

/// One solver's complete result, printed to the console and persisted
/// as JSON so traces can be plotted externally.
#[derive(Debug, Clone, Serialize)]
pub struct SolverReport {
    pub solver: &'static str,
    pub solution: Solution,
    /// `None` for the classical baseline, which has no loop state.
    pub state: Option<RunState>,
    pub iterations: usize,
    pub best_score: Option<f64>,
    pub runtime_secs: f64,
    pub trace: ConvergenceTrace,
}

pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

pub fn print_report(report: &SolverReport) {
    print_section(report.solver);
    print_result("selection", &report.solution.bitstring);
    print_result(
        "assets",
        format!("{:?}", report.solution.selected),
    );
    print_result("objective", format!("{:.6}", report.solution.objective_value));
    print_result("qubo value", format!("{:.6}", report.solution.qubo_value));
    let feasible = if report.solution.feasible {
        style("yes").green().to_string()
    } else {
        style("no").red().bold().to_string()
    };
    print_result("feasible", feasible);
    if let Some(state) = report.state {
        let state = match state {
            RunState::Converged => "converged",
            RunState::BudgetExhausted => "budget exhausted",
        };
        print_result("stop reason", state);
    }
    if report.iterations > 0 {
        print_result("iterations", report.iterations);
    }
    if let Some(score) = report.best_score {
        print_result("best score", format!("{score:.6}"));
    }
    print_result("runtime", format!("{:.3} s", report.runtime_secs));
}

/// Side-by-side summary when several solvers ran.
pub fn print_comparison(reports: &[SolverReport]) {
    println!();
    println!("{}", style("Solver comparison").cyan().bold());
    println!(
        "  {:<10} {:<12} {:>12} {:>9} {:>7} {:>9}",
        "solver", "selection", "objective", "feasible", "iters", "time (s)"
    );
    for r in reports {
        println!(
            "  {:<10} {:<12} {:>12.6} {:>9} {:>7} {:>9.3}",
            r.solver,
            r.solution.bitstring,
            r.solution.objective_value,
            if r.solution.feasible { "yes" } else { "no" },
            r.iterations,
            r.runtime_secs
        );
    }
}
