//! Classical reference solvers for benchmarking the variational runs.
//!
//! Small instances get exhaustive enumeration; anything larger falls
//! back to seeded single-flip simulated annealing over the same QUBO,
//! so quantum and classical answers are always judged on identical
//! energy surfaces.

use qfolio_model::{ProblemSpec, QuboModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{SolveError, SolveResult};
use crate::solution::Solution;

/// Enumeration is capped here; beyond it use [`SimulatedAnnealing`].
pub const BRUTE_FORCE_MAX_VARIABLES: usize = 20;

/// Exhaustive minimizer over all `2^n` assignments.
pub fn brute_force(spec: &ProblemSpec, qubo: &QuboModel) -> SolveResult<Solution> {
    let n = qubo.num_variables;
    if n > BRUTE_FORCE_MAX_VARIABLES {
        return Err(SolveError::ProblemTooLarge {
            num_variables: n,
            max: BRUTE_FORCE_MAX_VARIABLES,
        });
    }

    let mut best_bits = vec![0u8; n];
    let mut best_energy = qubo.evaluate(&best_bits);
    for assignment in 1u64..(1u64 << n) {
        let bits: Vec<u8> = (0..n).map(|i| ((assignment >> i) & 1) as u8).collect();
        let energy = qubo.evaluate(&bits);
        if energy < best_energy {
            best_energy = energy;
            best_bits = bits;
        }
    }

    Ok(Solution::decode(best_bits, spec, qubo))
}

/// Seeded single-flip Metropolis annealer.
#[derive(Debug, Clone)]
pub struct SimulatedAnnealing {
    sweeps: usize,
    restarts: usize,
    t_start: f64,
    t_end: f64,
    seed: u64,
}

impl SimulatedAnnealing {
    pub fn new(seed: u64) -> Self {
        Self {
            sweeps: 2_000,
            restarts: 4,
            t_start: 10.0,
            t_end: 1e-3,
            seed,
        }
    }

    pub fn with_sweeps(mut self, sweeps: usize) -> Self {
        self.sweeps = sweeps;
        self
    }

    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    pub fn with_temperature_range(mut self, t_start: f64, t_end: f64) -> Self {
        self.t_start = t_start;
        self.t_end = t_end;
        self
    }

    pub fn solve(&self, spec: &ProblemSpec, qubo: &QuboModel) -> SolveResult<Solution> {
        let n = qubo.num_variables;
        if n == 0 {
            return Ok(Solution::decode(Vec::new(), spec, qubo));
        }

        // Neighbor lists let a flip's energy delta be computed locally.
        let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for &((i, j), c) in &qubo.quadratic {
            neighbors[i].push((j, c));
            neighbors[j].push((i, c));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let cooling = (self.t_end / self.t_start).powf(1.0 / self.sweeps.max(1) as f64);

        let mut best_bits: Vec<u8> = Vec::new();
        let mut best_energy = f64::INFINITY;

        for restart in 0..self.restarts.max(1) {
            let mut bits: Vec<u8> = (0..n).map(|_| rng.r#gen::<bool>() as u8).collect();
            let mut energy = qubo.evaluate(&bits);
            let mut temperature = self.t_start;

            for _ in 0..self.sweeps {
                for _ in 0..n {
                    let k = rng.gen_range(0..n);
                    let delta = flip_delta(qubo, &neighbors, &bits, k);
                    let accept = delta <= 0.0
                        || rng.r#gen::<f64>() < (-delta / temperature).exp();
                    if accept {
                        bits[k] ^= 1;
                        energy += delta;
                    }
                }
                temperature *= cooling;
            }

            debug!(restart, energy, "annealing restart finished");
            if energy < best_energy {
                best_energy = energy;
                best_bits = bits;
            }
        }

        Ok(Solution::decode(best_bits, spec, qubo))
    }
}

/// Energy change from flipping variable `k` in place.
fn flip_delta(
    qubo: &QuboModel,
    neighbors: &[Vec<(usize, f64)>],
    bits: &[u8],
    k: usize,
) -> f64 {
    let mut local = qubo.linear[k];
    for &(j, c) in &neighbors[k] {
        if bits[j] != 0 {
            local += c;
        }
    }
    if bits[k] == 0 { local } else { -local }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use qfolio_model::{PenaltyConfig, compile};

    fn small_problem() -> (ProblemSpec, QuboModel) {
        let cov = Array2::from_diag(&ndarray::arr1(&[0.01, 0.02, 0.015, 0.005]));
        let spec = ProblemSpec::new(&[0.1, 0.2, 0.15, 0.05], cov, 2, 1.0).unwrap();
        let qubo = compile(&spec, &PenaltyConfig::suggested(&spec)).unwrap();
        (spec, qubo)
    }

    #[test]
    fn brute_force_finds_the_feasible_optimum() {
        let (spec, qubo) = small_problem();
        let solution = brute_force(&spec, &qubo).unwrap();
        // Diagonal covariance and a dominating penalty: the best pick is
        // the two highest risk-adjusted returns, assets 1 and 2.
        assert!(solution.feasible);
        assert_eq!(solution.selected, vec![1, 2]);
    }

    #[test]
    fn brute_force_rejects_oversized_problems() {
        let spec = ProblemSpec::synthetic(24, 4, 1.0, 1).unwrap();
        let qubo = compile(&spec, &PenaltyConfig::suggested(&spec)).unwrap();
        assert!(matches!(
            brute_force(&spec, &qubo),
            Err(SolveError::ProblemTooLarge {
                num_variables: 24,
                ..
            })
        ));
    }

    #[test]
    fn flip_delta_matches_full_reevaluation() {
        let (_, qubo) = small_problem();
        let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); 4];
        for &((i, j), c) in &qubo.quadratic {
            neighbors[i].push((j, c));
            neighbors[j].push((i, c));
        }

        let bits = [1u8, 0, 1, 0];
        for k in 0..4 {
            let mut flipped = bits;
            flipped[k] ^= 1;
            let expected = qubo.evaluate(&flipped) - qubo.evaluate(&bits);
            assert_relative_eq!(
                flip_delta(&qubo, &neighbors, &bits, k),
                expected,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn annealing_matches_brute_force_on_small_instances() {
        let (spec, qubo) = small_problem();
        let exact = brute_force(&spec, &qubo).unwrap();
        let annealed = SimulatedAnnealing::new(11)
            .with_sweeps(500)
            .solve(&spec, &qubo)
            .unwrap();
        assert_relative_eq!(annealed.qubo_value, exact.qubo_value, epsilon = 1e-9);
    }

    #[test]
    fn annealing_is_reproducible() {
        let (spec, qubo) = small_problem();
        let a = SimulatedAnnealing::new(5).solve(&spec, &qubo).unwrap();
        let b = SimulatedAnnealing::new(5).solve(&spec, &qubo).unwrap();
        assert_eq!(a.bits, b.bits);
    }
}
