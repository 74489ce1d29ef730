//! Run outcomes: decoded solutions and convergence traces.

use qfolio_model::{ProblemSpec, QuboModel, bits_to_string, selected_indices, validate};
use serde::{Deserialize, Serialize};

/// One optimizer iteration as seen by the objective strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    pub iteration: usize,
    pub score: f64,
}

/// Append-only record of scores, one entry per iteration.
pub type ConvergenceTrace = Vec<TracePoint>;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    /// The score stayed within tolerance for `patience` consecutive
    /// iterations, or the optimizer declared its own stop condition.
    Converged,
    /// The iteration cap was hit first.
    BudgetExhausted,
}

/// A decoded candidate portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// One bit per asset, index order.
    pub bits: Vec<u8>,
    /// Same selection rendered as a string, index 0 leftmost.
    pub bitstring: String,
    /// QUBO value of the selection, penalty included.
    pub qubo_value: f64,
    /// Original objective `x^T Σ x − λ r^T x`, no penalty.
    pub objective_value: f64,
    /// Whether the budget constraint holds.
    pub feasible: bool,
    /// Indices of the selected assets.
    pub selected: Vec<usize>,
}

impl Solution {
    /// Scores and annotates a raw bitstring against the problem it was
    /// sampled from.
    pub fn decode(bits: Vec<u8>, spec: &ProblemSpec, qubo: &QuboModel) -> Self {
        let qubo_value = qubo.evaluate(&bits);
        let objective_value = spec.objective(&bits);
        let validation = validate(&bits, spec);
        let selected = selected_indices(&bits);
        Self {
            bitstring: bits_to_string(&bits),
            bits,
            qubo_value,
            objective_value,
            feasible: validation.feasible,
            selected,
        }
    }
}

/// Everything a finished variational run reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub solution: Solution,
    pub state: RunState,
    /// Iterations actually spent, which may be below the cap.
    pub iterations: usize,
    /// Lowest score seen across the whole run.
    pub best_score: f64,
    pub trace: ConvergenceTrace,
}
