//! Hybrid variational solvers for compiled portfolio QUBOs.
//!
//! The entry point is [`VariationalLoop`]: borrow a compiled problem
//! and an executor, pick a [`SolverKind`], and run. Three objective
//! strategies share the loop:
//!
//! - [`MeanEnergy`] — plain VQE over a hardware-efficient ansatz.
//! - [`Cvar`] — CVaR-VQE, scoring only the lowest-energy tail.
//! - [`QaoaExpectation`] — QAOA with the problem Hamiltonian as cost
//!   layers.
//!
//! [`brute_force`] and [`SimulatedAnnealing`] solve the same QUBO
//! classically for benchmarking. Every stochastic piece is seeded, so
//! a run is a pure function of its configuration.

pub mod classical;
pub mod config;
pub mod error;
pub mod optimizer;
pub mod solution;
pub mod strategy;
pub mod variational;

pub use classical::{BRUTE_FORCE_MAX_VARIABLES, SimulatedAnnealing, brute_force};
pub use config::{SolverConfig, SolverKind};
pub use error::{SolveError, SolveResult};
pub use optimizer::{NelderMead, Optimizer, Spsa};
pub use solution::{ConvergenceTrace, RunOutcome, RunState, Solution, TracePoint};
pub use strategy::{Cvar, MeanEnergy, ObjectiveStrategy, QaoaExpectation, WeightedEnergy};
pub use variational::VariationalLoop;
