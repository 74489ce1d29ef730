//! Solver configuration.

use serde::{Deserialize, Serialize};

use crate::error::{SolveError, SolveResult};

/// Which hybrid solver to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverKind {
    /// Plain VQE: mean energy over the sampled distribution.
    Vqe,
    /// CVaR-VQE: mean energy over the lowest-energy tail.
    Cvar,
    /// QAOA with the problem Hamiltonian as the cost layer.
    Qaoa,
}

impl SolverKind {
    pub fn name(&self) -> &'static str {
        match self {
            SolverKind::Vqe => "vqe",
            SolverKind::Cvar => "cvar",
            SolverKind::Qaoa => "qaoa",
        }
    }
}

/// Tunable knobs shared by every variational run.
///
/// Defaults follow the sizes that work well for portfolios of up to ~16
/// assets; use the `with_*` setters to override individual fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    pub kind: SolverKind,
    /// Hard cap on optimizer iterations.
    pub max_iterations: usize,
    /// Score change below this counts toward the convergence window.
    pub tolerance: f64,
    /// Consecutive small-change iterations required to declare
    /// convergence.
    pub patience: usize,
    /// CVaR tail fraction; only read when `kind` is [`SolverKind::Cvar`].
    pub cvar_alpha: f64,
    /// Rotation-layer repetitions of the hardware-efficient ansatz.
    pub reps: usize,
    /// Cost/mixer layer pairs; only read when `kind` is
    /// [`SolverKind::Qaoa`].
    pub qaoa_layers: usize,
    /// Measurement shots per iteration; `0` scores the exact
    /// distribution.
    pub shots: u32,
    /// Seed for parameter initialization and shot sampling.
    pub seed: u64,
}

impl SolverConfig {
    pub fn new(kind: SolverKind) -> Self {
        Self {
            kind,
            max_iterations: 150,
            tolerance: 1e-6,
            patience: 3,
            cvar_alpha: 0.2,
            reps: 1,
            qaoa_layers: 2,
            shots: 0,
            seed: 42,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = patience;
        self
    }

    pub fn with_cvar_alpha(mut self, cvar_alpha: f64) -> Self {
        self.cvar_alpha = cvar_alpha;
        self
    }

    pub fn with_reps(mut self, reps: usize) -> Self {
        self.reps = reps;
        self
    }

    pub fn with_qaoa_layers(mut self, qaoa_layers: usize) -> Self {
        self.qaoa_layers = qaoa_layers;
        self
    }

    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fail-fast validation; run before any circuit is built.
    pub fn validate(&self) -> SolveResult<()> {
        if self.max_iterations == 0 {
            return Err(SolveError::ZeroBudget {
                name: "max_iterations",
            });
        }
        if self.patience == 0 {
            return Err(SolveError::ZeroBudget { name: "patience" });
        }
        if self.reps == 0 {
            return Err(SolveError::ZeroBudget { name: "reps" });
        }
        if self.qaoa_layers == 0 {
            return Err(SolveError::ZeroBudget { name: "qaoa_layers" });
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(SolveError::InvalidTolerance(self.tolerance));
        }
        if self.kind == SolverKind::Cvar
            && !(self.cvar_alpha > 0.0 && self.cvar_alpha <= 1.0)
        {
            return Err(SolveError::InvalidAlpha(self.cvar_alpha));
        }
        Ok(())
    }

    /// Variational parameter count for a register of `num_qubits`.
    pub fn num_parameters(&self, num_qubits: usize) -> usize {
        match self.kind {
            SolverKind::Vqe | SolverKind::Cvar => {
                qfolio_sim::hardware_efficient_num_parameters(num_qubits, self.reps)
            }
            SolverKind::Qaoa => qfolio_sim::qaoa_num_parameters(self.qaoa_layers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        for kind in [SolverKind::Vqe, SolverKind::Cvar, SolverKind::Qaoa] {
            assert!(SolverConfig::new(kind).validate().is_ok());
        }
    }

    #[test]
    fn rejects_bad_alpha() {
        let config = SolverConfig::new(SolverKind::Cvar).with_cvar_alpha(0.0);
        assert!(matches!(
            config.validate(),
            Err(SolveError::InvalidAlpha(_))
        ));
        let config = SolverConfig::new(SolverKind::Cvar).with_cvar_alpha(1.5);
        assert!(matches!(
            config.validate(),
            Err(SolveError::InvalidAlpha(_))
        ));
    }

    #[test]
    fn alpha_only_checked_for_cvar() {
        let config = SolverConfig::new(SolverKind::Vqe).with_cvar_alpha(0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_budgets() {
        let config = SolverConfig::new(SolverKind::Vqe).with_max_iterations(0);
        assert!(matches!(
            config.validate(),
            Err(SolveError::ZeroBudget {
                name: "max_iterations"
            })
        ));
        let config = SolverConfig::new(SolverKind::Vqe).with_patience(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_tolerance() {
        let config = SolverConfig::new(SolverKind::Vqe).with_tolerance(f64::NAN);
        assert!(config.validate().is_err());
        let config = SolverConfig::new(SolverKind::Vqe).with_tolerance(-1e-6);
        assert!(config.validate().is_err());
    }

    #[test]
    fn parameter_counts() {
        let vqe = SolverConfig::new(SolverKind::Vqe).with_reps(2);
        assert_eq!(vqe.num_parameters(4), 16);
        let qaoa = SolverConfig::new(SolverKind::Qaoa).with_qaoa_layers(3);
        assert_eq!(qaoa.num_parameters(4), 6);
    }
}
