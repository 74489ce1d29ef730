//! QUBO compilation: constrained quadratic program → penalty-augmented
//! binary-quadratic form.
//!
//! The budget constraint is folded in as a squared-deviation penalty
//! `P (Σ x_i − budget)²`, so the compiled model is unconstrained and
//! any solver that minimizes it is steered toward selections of exactly
//! `budget` assets. Diagonal terms collapse into linear ones because
//! `x_i² = x_i` for binary variables.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::asset::ProblemSpec;
use crate::error::{ModelError, ModelResult};

/// Weight configuration for the penalty encoding.
///
/// The weight must be large enough that every budget-violating
/// assignment scores strictly worse than the best feasible one.
/// A violating assignment pays at least `penalty * 1²`, so any weight
/// above the spread of the unpenalized objective is sufficient;
/// [`PenaltyConfig::suggested`] uses twice the largest unpenalized
/// coefficient magnitude, which comfortably clears that bound for the
/// instances this crate generates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyConfig {
    /// Weight of the budget-deviation penalty.
    pub budget_penalty: f64,
}

impl PenaltyConfig {
    /// Create a penalty configuration with an explicit weight.
    pub fn new(budget_penalty: f64) -> Self {
        Self { budget_penalty }
    }

    /// Heuristic weight: twice the largest absolute coefficient of the
    /// unpenalized objective (the heuristic the original formulation
    /// used when compiling its placeholder penalty).
    pub fn suggested(spec: &ProblemSpec) -> Self {
        let (linear, quadratic) = objective_terms(spec);
        let max_coeff = linear
            .iter()
            .copied()
            .chain(quadratic.iter().map(|&(_, c)| c))
            .map(f64::abs)
            .fold(0.0f64, f64::max);

        // Degenerate all-zero objectives still need a positive weight.
        let weight = if max_coeff > 0.0 { 2.0 * max_coeff } else { 1.0 };
        Self::new(weight)
    }
}

/// A compiled QUBO: minimize
/// `offset + Σ_i linear[i] x_i + Σ_{i<j} quadratic[(i,j)] x_i x_j`.
///
/// Immutable after compilation; term order is deterministic (pairs
/// sorted ascending) so repeated compiles are byte-identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuboModel {
    /// Number of binary variables.
    pub num_variables: usize,
    /// Per-variable coefficients, indexed by variable.
    pub linear: Vec<f64>,
    /// Off-diagonal coefficients for `i < j`, sorted by `(i, j)`.
    pub quadratic: Vec<((usize, usize), f64)>,
    /// Constant energy offset.
    pub offset: f64,
}

impl QuboModel {
    /// Evaluate the QUBO energy of a bitstring.
    ///
    /// `bits` must have exactly `num_variables` entries.
    pub fn evaluate(&self, bits: &[u8]) -> f64 {
        debug_assert_eq!(bits.len(), self.num_variables);

        let mut energy = self.offset;
        for (i, &c) in self.linear.iter().enumerate() {
            if bits[i] != 0 {
                energy += c;
            }
        }
        for &((i, j), c) in &self.quadratic {
            if bits[i] != 0 && bits[j] != 0 {
                energy += c;
            }
        }
        energy
    }

    /// Largest absolute coefficient across linear and quadratic terms.
    pub fn max_abs_coefficient(&self) -> f64 {
        self.linear
            .iter()
            .copied()
            .chain(self.quadratic.iter().map(|&(_, c)| c))
            .map(f64::abs)
            .fold(0.0f64, f64::max)
    }

    /// True when there is nothing to optimize: no variables, or every
    /// coefficient is exactly zero. Solvers short-circuit these to a
    /// trivial solution instead of iterating.
    pub fn is_trivial(&self) -> bool {
        self.num_variables == 0
            || (self.linear.iter().all(|&c| c == 0.0)
                && self.quadratic.iter().all(|&(_, c)| c == 0.0))
    }
}

/// Linear and quadratic coefficients of the unpenalized objective
/// `x^T Σ x − λ·r^T x`, with diagonal terms folded into the linear part.
fn objective_terms(spec: &ProblemSpec) -> (Vec<f64>, Vec<((usize, usize), f64)>) {
    let n = spec.num_assets();
    let mut linear = vec![0.0; n];
    let mut quadratic = Vec::with_capacity(n * (n.saturating_sub(1)) / 2);

    for i in 0..n {
        linear[i] = spec.covariance[[i, i]] - spec.risk_aversion * spec.assets[i].expected_return;
        for j in (i + 1)..n {
            // Σ is symmetric: x_i x_j picks up σ_ij and σ_ji.
            quadratic.push(((i, j), 2.0 * spec.covariance[[i, j]]));
        }
    }

    (linear, quadratic)
}

/// Compile a problem spec into a penalty-augmented QUBO.
///
/// Zero assets compile to a degenerate model with no variables; a
/// non-positive penalty weight is a caller configuration error.
pub fn compile(spec: &ProblemSpec, penalty: &PenaltyConfig) -> ModelResult<QuboModel> {
    let p = penalty.budget_penalty;
    if p <= 0.0 || !p.is_finite() {
        return Err(ModelError::InvalidPenalty(p));
    }

    let n = spec.num_assets();
    let budget = spec.budget as f64;

    let (mut linear, mut quadratic) = objective_terms(spec);

    // Expand P (Σ x_i − N)² = P (Σ x_i + 2 Σ_{i<j} x_i x_j − 2N Σ x_i + N²).
    for c in &mut linear {
        *c += p * (1.0 - 2.0 * budget);
    }
    for (_, c) in &mut quadratic {
        *c += 2.0 * p;
    }
    let offset = p * budget * budget;

    // Drop exact zeros so the mapping stays sparse; order is already
    // ascending by construction.
    quadratic.retain(|&(_, c)| c != 0.0);

    debug!(
        num_variables = n,
        quadratic_terms = quadratic.len(),
        penalty = p,
        "compiled QUBO"
    );

    Ok(QuboModel {
        num_variables: n,
        linear,
        quadratic,
        offset,
    })
}
