//! Solver adapter.
//!
//! A [`MilpSolver`] receives a [`LinearModel`] and a budget and reports a
//! termination status together with one value per model variable. The
//! pipeline only ever talks to this trait, so any MILP engine can be plugged
//! in; [`GoodLpSolver`] is the bundled implementation.

mod good_lp_solver;


use std::fmt::{self, Debug};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lp::LinearModel;

pub use good_lp_solver::GoodLpSolver;

/// Budget handed to a solver for one solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveOptions {
    pub time_limit: Duration,
    /// Relative optimality gap at which the solver may stop early.
    pub relative_gap: f64,
}

impl SolveOptions {
    pub fn new(time_limit: Duration, relative_gap: f64) -> Self {
        Self {
            time_limit,
            relative_gap,
        }
    }
}

/// Termination status of a solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SolveStatus {
    /// Proven optimal within the gap tolerance.
    Optimal,
    /// Time limit reached with a feasible incumbent.
    TimeLimitFeasible,
    Infeasible,
    Error(String),
}

impl SolveStatus {
    /// Returns true if the outcome carries a usable assignment.
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::TimeLimitFeasible)
    }

    pub fn is_suboptimal(&self) -> bool {
        matches!(self, SolveStatus::TimeLimitFeasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => f.write_str("optimal"),
            SolveStatus::TimeLimitFeasible => f.write_str("time limit (feasible)"),
            SolveStatus::Infeasible => f.write_str("infeasible"),
            SolveStatus::Error(msg) => write!(f, "error: {msg}"),
        }
    }
}

/// Result of one solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    pub objective_value: Option<f64>,
    /// One value per model variable, indexed by [`VarId`](crate::lp::VarId).
    /// Empty unless the status has a solution.
    pub values: Vec<f64>,
}

impl SolveOutcome {
    pub fn solved(status: SolveStatus, objective_value: f64, values: Vec<f64>) -> Self {
        Self {
            status,
            objective_value: Some(objective_value),
            values,
        }
    }

    pub fn infeasible() -> Self {
        Self {
            status: SolveStatus::Infeasible,
            objective_value: None,
            values: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: SolveStatus::Error(message.into()),
            objective_value: None,
            values: Vec::new(),
        }
    }
}

/// An opaque MILP engine.
///
/// Implementations must block until the solve terminates or the time limit
/// expires. A limit hit without any incumbent is reported as
/// [`SolveStatus::Error`].
pub trait MilpSolver: Send + Sync + Debug {
    fn solve(&self, model: &LinearModel, options: &SolveOptions) -> SolveOutcome;

    /// Name shown in logs.
    fn name(&self) -> &'static str {
        "milp"
    }
}

impl<T: MilpSolver + ?Sized> MilpSolver for Box<T> {
    fn solve(&self, model: &LinearModel, options: &SolveOptions) -> SolveOutcome {
        (**self).solve(model, options)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
