//! Simultaneous perturbation stochastic approximation.
//!
//! Estimates the gradient from two evaluations per iteration regardless
//! of dimension, which keeps circuit counts low when the parameter
//! vector is large. Perturbation directions come from a seeded RNG so
//! runs are reproducible.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Optimizer, project};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Propose the positive perturbation next.
    Perturb,
    /// Waiting for the score at `base + c_k * delta`.
    ScorePlus,
    /// Waiting for the score at `base - c_k * delta`.
    ScoreMinus,
}

pub struct Spsa {
    num_params: usize,
    bounds: Vec<(f64, f64)>,
    rng: StdRng,

    // Standard gain-sequence constants (Spall's guidelines).
    a: f64,
    c: f64,
    alpha: f64,
    gamma: f64,
    stability: f64,

    iteration: usize,
    base: Vec<f64>,
    delta: Vec<f64>,
    score_plus: f64,
    phase: Phase,
    started: bool,

    tolerance: f64,
    prev_score: f64,
    best_params: Option<Vec<f64>>,
    best_score: f64,
    converged: bool,
}

impl Spsa {
    pub fn new(num_params: usize, seed: u64) -> Self {
        Self {
            num_params,
            bounds: vec![(-TAU, TAU); num_params],
            rng: StdRng::seed_from_u64(seed),
            a: 0.1,
            c: 0.1,
            alpha: 0.602,
            gamma: 0.101,
            stability: 10.0,
            iteration: 0,
            base: vec![0.0; num_params],
            delta: Vec::new(),
            score_plus: 0.0,
            phase: Phase::Perturb,
            started: false,
            tolerance: 1e-6,
            prev_score: f64::MAX,
            best_params: None,
            best_score: f64::MAX,
            converged: false,
        }
    }

    pub fn with_bounds(mut self, bounds: Vec<(f64, f64)>) -> Self {
        assert_eq!(bounds.len(), self.num_params);
        self.bounds = bounds;
        self
    }

    pub fn with_step_size(mut self, a: f64) -> Self {
        self.a = a;
        self
    }

    pub fn with_perturbation(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Rademacher direction: each coordinate is +1 or -1.
    fn draw_delta(&mut self) {
        self.delta = (0..self.num_params)
            .map(|_| if self.rng.r#gen::<bool>() { 1.0 } else { -1.0 })
            .collect();
    }

    fn gains(&self) -> (f64, f64) {
        let k = self.iteration as f64;
        let a_k = self.a / (k + 1.0 + self.stability).powf(self.alpha);
        let c_k = self.c / (k + 1.0).powf(self.gamma);
        (a_k, c_k)
    }

    fn perturbed(&self, sign: f64) -> Vec<f64> {
        let (_, c_k) = self.gains();
        let point: Vec<f64> = self
            .base
            .iter()
            .zip(self.delta.iter())
            .map(|(&p, &d)| p + sign * c_k * d)
            .collect();
        project(&point, &self.bounds)
    }
}

impl Optimizer for Spsa {
    fn step(&mut self, params: &[f64], score: f64) -> Vec<f64> {
        if score < self.best_score {
            self.best_score = score;
            self.best_params = Some(params.to_vec());
        }

        match self.phase {
            Phase::Perturb => {
                if !self.started {
                    self.base = params.to_vec();
                    self.started = true;
                }
                self.iteration += 1;
                self.draw_delta();
                self.phase = Phase::ScorePlus;
                self.perturbed(1.0)
            }

            Phase::ScorePlus => {
                self.score_plus = score;
                self.phase = Phase::ScoreMinus;
                self.perturbed(-1.0)
            }

            Phase::ScoreMinus => {
                let score_minus = score;
                let (a_k, c_k) = self.gains();

                let update: Vec<f64> = self
                    .base
                    .iter()
                    .zip(self.delta.iter())
                    .map(|(&p, &d)| {
                        let gradient = (self.score_plus - score_minus) / (2.0 * c_k * d);
                        p - a_k * gradient
                    })
                    .collect();
                self.base = project(&update, &self.bounds);

                let midpoint = (self.score_plus + score_minus) / 2.0;
                if (midpoint - self.prev_score).abs() < self.tolerance {
                    self.converged = true;
                }
                self.prev_score = midpoint;

                self.phase = Phase::Perturb;
                self.base.clone()
            }
        }
    }

    fn converged(&self) -> bool {
        self.converged
    }

    fn best_params(&self) -> Option<&[f64]> {
        self.best_params.as_deref()
    }

    fn best_score(&self) -> f64 {
        self.best_score
    }
}
