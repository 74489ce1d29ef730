//! The constrained portfolio-selection problem.
//!
//! A [`ProblemSpec`] is built once (from CLI flags or synthetic data)
//! and shared read-only across every solver run in an invocation.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// A single security in the selection universe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Position in the variable ordering (and qubit index).
    pub index: usize,
    /// Expected return of the asset.
    pub expected_return: f64,
}

/// A constrained portfolio-selection problem.
///
/// Minimize `x^T Σ x − λ·r^T x` over binary selection vectors `x`,
/// subject to choosing at most `budget` assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemSpec {
    /// Assets, ordered by variable index.
    pub assets: Vec<Asset>,
    /// Covariance matrix Σ (symmetric, assumed positive semi-definite).
    pub covariance: Array2<f64>,
    /// Maximum number of assets that may be selected.
    pub budget: usize,
    /// Risk-aversion trade-off λ between return and variance.
    pub risk_aversion: f64,
}

impl ProblemSpec {
    /// Create a problem from explicit returns and covariance.
    pub fn new(
        returns: &[f64],
        covariance: Array2<f64>,
        budget: usize,
        risk_aversion: f64,
    ) -> ModelResult<Self> {
        if budget == 0 {
            return Err(ModelError::InvalidBudget(budget));
        }
        let n = returns.len();
        let (rows, cols) = covariance.dim();
        if rows != n || cols != n {
            return Err(ModelError::CovarianceShape {
                rows,
                cols,
                n_assets: n,
            });
        }

        let assets = returns
            .iter()
            .enumerate()
            .map(|(index, &expected_return)| Asset {
                index,
                expected_return,
            })
            .collect();

        Ok(Self {
            assets,
            covariance,
            budget,
            risk_aversion,
        })
    }

    /// Generate a synthetic instance with plausible market data.
    ///
    /// Returns are drawn uniformly, and the covariance is a single-factor
    /// model `σ_ij = b_i b_j f + δ_ij e_i`, which is positive
    /// semi-definite by construction. Identical seeds produce identical
    /// instances.
    pub fn synthetic(
        n_assets: usize,
        budget: usize,
        risk_aversion: f64,
        seed: u64,
    ) -> ModelResult<Self> {
        let mut rng = StdRng::seed_from_u64(seed);

        let returns: Vec<f64> = (0..n_assets).map(|_| rng.gen_range(0.02..0.20)).collect();
        let loadings: Vec<f64> = (0..n_assets).map(|_| rng.gen_range(-0.5..1.5)).collect();
        let idio: Vec<f64> = (0..n_assets).map(|_| rng.gen_range(0.01..0.05)).collect();

        let factor_var = 0.02;
        let covariance = Array2::from_shape_fn((n_assets, n_assets), |(i, j)| {
            let common = loadings[i] * loadings[j] * factor_var;
            if i == j { common + idio[i] } else { common }
        });

        Self::new(&returns, covariance, budget, risk_aversion)
    }

    /// Number of assets (and binary variables).
    pub fn num_assets(&self) -> usize {
        self.assets.len()
    }

    /// Expected returns as a plain vector, ordered by variable index.
    pub fn returns(&self) -> Vec<f64> {
        self.assets.iter().map(|a| a.expected_return).collect()
    }

    /// The true constrained objective of a selection vector,
    /// ignoring the budget constraint: `x^T Σ x − λ·r^T x`.
    pub fn objective(&self, bits: &[u8]) -> f64 {
        let mut value = 0.0;
        for (i, &bi) in bits.iter().enumerate() {
            if bi == 0 {
                continue;
            }
            value -= self.risk_aversion * self.assets[i].expected_return;
            for (j, &bj) in bits.iter().enumerate() {
                if bj != 0 {
                    value += self.covariance[[i, j]];
                }
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn new_rejects_zero_budget() {
        let cov = Array2::eye(2);
        assert!(matches!(
            ProblemSpec::new(&[0.1, 0.2], cov, 0, 1.0),
            Err(ModelError::InvalidBudget(0))
        ));
    }

    #[test]
    fn new_rejects_shape_mismatch() {
        let cov = Array2::eye(3);
        assert!(matches!(
            ProblemSpec::new(&[0.1, 0.2], cov, 1, 1.0),
            Err(ModelError::CovarianceShape { .. })
        ));
    }

    #[test]
    fn synthetic_is_reproducible() {
        let a = ProblemSpec::synthetic(6, 3, 1.0, 42).unwrap();
        let b = ProblemSpec::synthetic(6, 3, 1.0, 42).unwrap();
        assert_eq!(a.returns(), b.returns());
        assert_eq!(a.covariance, b.covariance);
    }

    #[test]
    fn synthetic_covariance_is_symmetric() {
        let spec = ProblemSpec::synthetic(5, 2, 1.0, 7).unwrap();
        for i in 0..5 {
            for j in 0..5 {
                assert_relative_eq!(spec.covariance[[i, j]], spec.covariance[[j, i]]);
            }
        }
    }

    #[test]
    fn objective_matches_hand_computation() {
        let cov = arr2(&[[0.04, 0.01], [0.01, 0.09]]);
        let spec = ProblemSpec::new(&[0.1, 0.2], cov, 2, 0.5).unwrap();

        // Select both assets: variance = 0.04 + 0.09 + 2*0.01, return term
        // = 0.5 * (0.1 + 0.2).
        let expected = 0.15 - 0.15;
        assert_relative_eq!(spec.objective(&[1, 1]), expected, epsilon = 1e-12);
        assert_relative_eq!(spec.objective(&[0, 0]), 0.0);
    }
}
