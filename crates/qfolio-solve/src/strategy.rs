//! Objective strategies: how a batch of measured energies is collapsed
//! into the single score the classical optimizer sees.
//!
//! All three solvers share the variational loop and differ only here.
//! Scores are comparable within one run but not across strategies; the
//! decoded solution is always judged by its QUBO value instead.

use std::cmp::Ordering;

/// One measured outcome, reduced to what scoring needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedEnergy {
    /// Diagonal-observable energy of the measured bitstring.
    pub energy: f64,
    /// Probability mass of the outcome within its batch.
    pub probability: f64,
}

/// Collapses a batch of weighted energies into an optimizer score.
///
/// Implementations must be deterministic: the same batch always yields
/// the same score.
pub trait ObjectiveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Score a non-empty batch. Lower is better.
    fn score(&self, batch: &[WeightedEnergy]) -> f64;
}

fn total_mass(batch: &[WeightedEnergy]) -> f64 {
    batch.iter().map(|s| s.probability).sum()
}

/// Probability-weighted mean energy, the plain VQE objective.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanEnergy;

impl ObjectiveStrategy for MeanEnergy {
    fn name(&self) -> &'static str {
        "mean-energy"
    }

    fn score(&self, batch: &[WeightedEnergy]) -> f64 {
        debug_assert!(!batch.is_empty());
        let mass = total_mass(batch);
        batch.iter().map(|s| s.energy * s.probability).sum::<f64>() / mass
    }
}

/// Conditional value at risk: the mean over the lowest-energy `alpha`
/// fraction of the sampled mass.
///
/// Focusing on the best tail rewards parameter regions that place even
/// a little mass on good solutions, which flattens the optimization
/// landscape for constrained problems. A sample straddling the tail
/// boundary contributes only the mass that fits.
#[derive(Debug, Clone, Copy)]
pub struct Cvar {
    alpha: f64,
}

impl Cvar {
    /// `alpha` must already be validated to lie in `(0, 1]`.
    pub fn new(alpha: f64) -> Self {
        debug_assert!(alpha > 0.0 && alpha <= 1.0);
        Self { alpha }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl ObjectiveStrategy for Cvar {
    fn name(&self) -> &'static str {
        "cvar"
    }

    fn score(&self, batch: &[WeightedEnergy]) -> f64 {
        debug_assert!(!batch.is_empty());

        let mut sorted = batch.to_vec();
        sorted.sort_by(|a, b| {
            a.energy
                .partial_cmp(&b.energy)
                .unwrap_or(Ordering::Equal)
        });

        // At least the single best outcome always contributes, even when
        // alpha covers less mass than that outcome carries.
        let tail = self.alpha * total_mass(&sorted);
        let mut taken_mass = 0.0;
        let mut taken_energy = 0.0;
        for s in &sorted {
            let take = (tail - taken_mass).min(s.probability);
            taken_energy += take * s.energy;
            taken_mass += take;
            if taken_mass >= tail {
                break;
            }
        }
        taken_energy / taken_mass
    }
}

/// The QAOA cost objective. Numerically identical to [`MeanEnergy`];
/// kept as its own strategy so runs report which objective produced
/// their trace.
#[derive(Debug, Clone, Copy, Default)]
pub struct QaoaExpectation;

impl ObjectiveStrategy for QaoaExpectation {
    fn name(&self) -> &'static str {
        "qaoa-expectation"
    }

    fn score(&self, batch: &[WeightedEnergy]) -> f64 {
        MeanEnergy.score(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn we(energy: f64, probability: f64) -> WeightedEnergy {
        WeightedEnergy {
            energy,
            probability,
        }
    }

    #[test]
    fn mean_energy_weights_by_probability() {
        let batch = [we(1.0, 0.25), we(3.0, 0.75)];
        assert_relative_eq!(MeanEnergy.score(&batch), 2.5);
    }

    #[test]
    fn cvar_with_full_tail_equals_mean() {
        let batch = [we(-2.0, 0.1), we(0.5, 0.4), we(4.0, 0.5)];
        assert_relative_eq!(
            Cvar::new(1.0).score(&batch),
            MeanEnergy.score(&batch),
            epsilon = 1e-12
        );
    }

    #[test]
    fn cvar_takes_lowest_energy_tail() {
        // Tail of 0.5 covers all of the -1.0 outcome and half of 1.0.
        let batch = [we(1.0, 0.75), we(-1.0, 0.25)];
        let score = Cvar::new(0.5).score(&batch);
        assert_relative_eq!(score, (0.25 * -1.0 + 0.25 * 1.0) / 0.5);
    }

    #[test]
    fn cvar_tiny_alpha_scores_best_outcome() {
        let batch = [we(5.0, 0.9), we(-3.0, 0.1)];
        assert_relative_eq!(Cvar::new(0.01).score(&batch), -3.0);
    }

    #[test]
    fn cvar_is_monotone_in_alpha() {
        let batch = [we(-2.0, 0.2), we(0.0, 0.3), we(1.0, 0.3), we(6.0, 0.2)];
        let alphas = [0.05, 0.2, 0.5, 0.8, 1.0];
        let scores: Vec<f64> = alphas
            .iter()
            .map(|&a| Cvar::new(a).score(&batch))
            .collect();
        for pair in scores.windows(2) {
            assert!(pair[0] <= pair[1] + 1e-12);
        }
    }

    #[test]
    fn cvar_order_independent() {
        let a = [we(2.0, 0.5), we(-1.0, 0.5)];
        let b = [we(-1.0, 0.5), we(2.0, 0.5)];
        assert_relative_eq!(Cvar::new(0.4).score(&a), Cvar::new(0.4).score(&b));
    }

    #[test]
    fn qaoa_expectation_matches_mean() {
        let batch = [we(1.0, 0.5), we(-1.0, 0.5)];
        assert_relative_eq!(QaoaExpectation.score(&batch), MeanEnergy.score(&batch));
    }
}
