//! Nelder-Mead simplex search as an ask/tell state machine.

use std::cmp::Ordering;
use std::f64::consts::TAU;

use super::{Optimizer, project};

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Where the machine is between two `step` calls, i.e. which point the
/// pending score belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Scoring the initial simplex vertices one by one.
    BuildSimplex,
    /// Scoring the reflected point.
    Reflecting,
    /// Scoring the expanded point; the reflection score is stashed in
    /// `trial_score`.
    Expanding,
    /// Scoring the contracted point.
    Contracting,
    /// Re-scoring the shrunk vertices one by one.
    Shrinking,
}

/// Derivative-free simplex optimizer.
///
/// Works well for the low-dimensional, mildly noisy cost surfaces the
/// variational ansaetze produce. Parameters are rotation angles, so the
/// default bounds span a full period in either direction.
pub struct NelderMead {
    num_params: usize,
    bounds: Vec<(f64, f64)>,
    tolerance: f64,

    simplex: Vec<Vec<f64>>,
    scores: Vec<f64>,
    pending: usize,
    phase: Phase,
    trial: Vec<f64>,
    trial_score: f64,

    best_params: Option<Vec<f64>>,
    best_score: f64,
    converged: bool,
}

impl NelderMead {
    pub fn new(num_params: usize) -> Self {
        Self {
            num_params,
            bounds: vec![(-TAU, TAU); num_params],
            tolerance: 1e-8,
            simplex: Vec::new(),
            scores: Vec::new(),
            pending: 0,
            phase: Phase::BuildSimplex,
            trial: Vec::new(),
            trial_score: f64::MAX,
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

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Seed the simplex: the start point plus one vertex per coordinate.
    fn build_simplex(&mut self, start: &[f64]) {
        let step = 0.5;
        self.simplex.clear();
        self.scores.clear();
        self.simplex.push(start.to_vec());
        self.scores.push(f64::MAX);
        for i in 0..self.num_params {
            let mut vertex = start.to_vec();
            let delta = if start[i].abs() < 1e-10 {
                step
            } else {
                step * start[i].abs()
            };
            vertex[i] += delta;
            self.simplex.push(project(&vertex, &self.bounds));
            self.scores.push(f64::MAX);
        }
    }

    fn sort_vertices(&mut self) {
        let mut order: Vec<usize> = (0..self.simplex.len()).collect();
        order.sort_by(|&a, &b| {
            self.scores[a]
                .partial_cmp(&self.scores[b])
                .unwrap_or(Ordering::Equal)
        });
        self.simplex = order.iter().map(|&i| self.simplex[i].clone()).collect();
        self.scores = order.iter().map(|&i| self.scores[i]).collect();
    }

    fn centroid(&self) -> Vec<f64> {
        // All vertices except the worst.
        let n = self.simplex.len() - 1;
        let mut center = vec![0.0; self.num_params];
        for vertex in &self.simplex[..n] {
            for (c, &v) in center.iter_mut().zip(vertex.iter()) {
                *c += v;
            }
        }
        for c in &mut center {
            *c /= n as f64;
        }
        center
    }

    /// Point `centroid + coeff * (centroid - anchor)`, projected.
    fn line_point(&self, anchor: &[f64], coeff: f64) -> Vec<f64> {
        let centroid = self.centroid();
        let point: Vec<f64> = centroid
            .iter()
            .zip(anchor.iter())
            .map(|(&c, &a)| c + coeff * (c - a))
            .collect();
        project(&point, &self.bounds)
    }

    fn spread_is_small(&self) -> bool {
        let worst = self.scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let best = self.scores.iter().copied().fold(f64::INFINITY, f64::min);
        if worst - best < self.tolerance {
            return true;
        }
        let max_dist = self.simplex[1..]
            .iter()
            .map(|v| {
                self.simplex[0]
                    .iter()
                    .zip(v.iter())
                    .map(|(a, b)| (a - b).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .fold(0.0f64, f64::max);
        max_dist < self.tolerance
    }

    /// Sort, check the stop condition, and either return the best vertex
    /// or propose the next reflection.
    fn advance(&mut self) -> Vec<f64> {
        self.sort_vertices();
        if self.spread_is_small() {
            self.converged = true;
            return self.simplex[0].clone();
        }
        let worst = self.simplex[self.num_params].clone();
        self.trial = self.line_point(&worst, REFLECT);
        self.phase = Phase::Reflecting;
        self.trial.clone()
    }

    fn replace_worst(&mut self, point: Vec<f64>, score: f64) {
        self.simplex[self.num_params] = point;
        self.scores[self.num_params] = score;
    }
}

impl Optimizer for NelderMead {
    fn step(&mut self, params: &[f64], score: f64) -> Vec<f64> {
        if score < self.best_score {
            self.best_score = score;
            self.best_params = Some(params.to_vec());
        }

        if self.simplex.is_empty() {
            self.build_simplex(params);
            self.scores[0] = score;
            self.pending = 1;
            return self.simplex[self.pending].clone();
        }

        match self.phase {
            Phase::BuildSimplex => {
                self.scores[self.pending] = score;
                self.pending += 1;
                if self.pending < self.simplex.len() {
                    return self.simplex[self.pending].clone();
                }
                self.advance()
            }

            Phase::Reflecting => {
                self.trial_score = score;
                let best = self.scores[0];
                let second_worst = self.scores[self.num_params - 1];
                let worst = self.scores[self.num_params];

                if score < best {
                    // Keep pushing in the same direction.
                    let reflected = self.trial.clone();
                    self.trial = self.line_point(&reflected, -EXPAND);
                    self.phase = Phase::Expanding;
                    self.trial.clone()
                } else if score < second_worst {
                    let reflected = self.trial.clone();
                    self.replace_worst(reflected, score);
                    self.advance()
                } else {
                    // Contract toward whichever of reflection/worst is
                    // better.
                    let anchor = if score < worst {
                        self.trial.clone()
                    } else {
                        self.simplex[self.num_params].clone()
                    };
                    self.trial = self.line_point(&anchor, -CONTRACT);
                    self.phase = Phase::Contracting;
                    self.trial.clone()
                }
            }

            Phase::Expanding => {
                if score < self.trial_score {
                    self.replace_worst(params.to_vec(), score);
                } else {
                    let worst = self.simplex[self.num_params].clone();
                    let reflected = self.line_point(&worst, REFLECT);
                    self.replace_worst(reflected, self.trial_score);
                }
                self.advance()
            }

            Phase::Contracting => {
                if score < self.scores[self.num_params] {
                    self.replace_worst(params.to_vec(), score);
                    self.advance()
                } else {
                    // Contraction failed: shrink every vertex toward the
                    // best one and re-score.
                    let best = self.simplex[0].clone();
                    for vertex in self.simplex[1..].iter_mut() {
                        let shrunk: Vec<f64> = best
                            .iter()
                            .zip(vertex.iter())
                            .map(|(&b, &v)| b + SHRINK * (v - b))
                            .collect();
                        *vertex = project(&shrunk, &self.bounds);
                    }
                    self.pending = 1;
                    self.phase = Phase::Shrinking;
                    self.simplex[1].clone()
                }
            }

            Phase::Shrinking => {
                self.scores[self.pending] = score;
                self.pending += 1;
                if self.pending < self.simplex.len() {
                    return self.simplex[self.pending].clone();
                }
                self.advance()
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
