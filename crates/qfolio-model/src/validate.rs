//! Constraint checking for decoded solutions.
//!
//! Solvers work against the penalty-encoded QUBO; this module checks the
//! decoded bitstring against the original constraints so results can be
//! reported as feasible or not.

use serde::{Deserialize, Serialize};

use crate::asset::ProblemSpec;

/// Identifier for a violated constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintId {
    /// More assets selected than the budget allows.
    BudgetExceeded,
}

/// Outcome of validating a bitstring against a problem spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    /// True when no constraint is violated.
    pub feasible: bool,
    /// The specific constraints that failed.
    pub violated: Vec<ConstraintId>,
}

/// Check a selection bitstring against the original constraints.
pub fn validate(bits: &[u8], spec: &ProblemSpec) -> Validation {
    let selected = bits.iter().filter(|&&b| b != 0).count();

    let mut violated = Vec::new();
    if selected > spec.budget {
        violated.push(ConstraintId::BudgetExceeded);
    }

    Validation {
        feasible: violated.is_empty(),
        violated,
    }
}

/// Indices of the selected assets in a bitstring.
pub fn selected_indices(bits: &[u8]) -> Vec<usize> {
    bits.iter()
        .enumerate()
        .filter(|&(_, &b)| b != 0)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn spec(budget: usize) -> ProblemSpec {
        ProblemSpec::new(&[0.1, 0.2, 0.15], Array2::eye(3), budget, 1.0).unwrap()
    }

    #[test]
    fn within_budget_is_feasible() {
        let v = validate(&[1, 0, 1], &spec(2));
        assert!(v.feasible);
        assert!(v.violated.is_empty());
    }

    #[test]
    fn over_budget_is_flagged() {
        let v = validate(&[1, 1, 1], &spec(2));
        assert!(!v.feasible);
        assert_eq!(v.violated, vec![ConstraintId::BudgetExceeded]);
    }

    #[test]
    fn selected_indices_are_ordered() {
        assert_eq!(selected_indices(&[1, 0, 1]), vec![0, 2]);
        assert_eq!(selected_indices(&[0, 0, 0]), Vec::<usize>::new());
    }
}
