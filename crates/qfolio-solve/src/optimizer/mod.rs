//! Derivative-free classical optimizers driving the variational loop.
//!
//! Both optimizers follow an ask/tell protocol: the loop hands in the
//! parameters it just evaluated together with their score, and gets
//! back the next point to evaluate. The loop stays in control of
//! iteration counting, tracing and the convergence window; the
//! optimizer only proposes points and may additionally signal its own
//! internal stop condition.

mod nelder_mead;
mod spsa;

pub use nelder_mead::NelderMead;
pub use spsa::Spsa;

/// Ask/tell interface shared by the classical optimizers.
pub trait Optimizer: Send {
    /// Report the score of `params` and receive the next point to
    /// evaluate.
    fn step(&mut self, params: &[f64], score: f64) -> Vec<f64>;

    /// Whether the optimizer's own stop condition has fired.
    fn converged(&self) -> bool;

    /// Best parameters reported so far.
    fn best_params(&self) -> Option<&[f64]>;

    /// Best score reported so far.
    fn best_score(&self) -> f64;
}

/// Clamp each coordinate into its bound interval.
fn project(params: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
    params
        .iter()
        .zip(bounds.iter())
        .map(|(&p, &(lo, hi))| p.clamp(lo, hi))
        .collect()
}
