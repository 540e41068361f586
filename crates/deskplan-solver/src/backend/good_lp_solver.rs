//! `good_lp` backend running the pure-Rust microlp engine.

use std::time::Instant;

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError,
    Solution, SolutionStatus, SolverModel, Variable, WithMipGap, WithTimeLimit,
};
use tracing::debug;

use super::{MilpSolver, SolveOptions, SolveOutcome, SolveStatus};
use crate::lp::{Cmp, LinearExpr, LinearModel, Sense, VarKind};

/// Solves models with `good_lp` in the calling thread.
///
/// The time limit and the relative gap are handed to microlp's branch and
/// bound. A search stopped by the clock keeps its incumbent and reports
/// [`SolveStatus::TimeLimitFeasible`]; a search stopped by the gap reports
/// [`SolveStatus::Optimal`], since the incumbent is optimal within tolerance.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpSolver;

impl GoodLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl MilpSolver for GoodLpSolver {
    fn solve(&self, model: &LinearModel, options: &SolveOptions) -> SolveOutcome {
        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = model
            .variables()
            .iter()
            .map(|v| match v.kind {
                VarKind::Binary => vars.add(variable().binary()),
                VarKind::NonNegInteger => vars.add(variable().integer().min(0)),
            })
            .collect();

        let objective = to_expression(model.objective(), &handles);
        let unsolved = match model.sense() {
            Sense::Maximize => vars.maximise(objective),
            Sense::Minimize => vars.minimise(objective),
        };
        let problem = unsolved
            .using(default_solver)
            .with_time_limit(options.time_limit.as_secs_f64())
            .with_mip_gap(options.relative_gap as f32);
        let mut problem = match problem {
            Ok(problem) => problem,
            Err(err) => return SolveOutcome::error(err.to_string()),
        };
        for c in model.constraints() {
            let lhs = to_expression(&c.lhs, &handles);
            problem.add_constraint(match c.cmp {
                Cmp::Le => constraint::leq(lhs, c.rhs),
                Cmp::Ge => constraint::geq(lhs, c.rhs),
                Cmp::Eq => constraint::eq(lhs, c.rhs),
            });
        }

        debug!(
            event = "backend_solve",
            variables = handles.len(),
            constraints = model.constraints().len(),
            time_limit_s = options.time_limit.as_secs(),
            relative_gap = options.relative_gap,
        );

        let started = Instant::now();
        match problem.solve() {
            Ok(solution) => decode(&solution, &handles, model),
            Err(ResolutionError::Infeasible) => SolveOutcome::infeasible(),
            Err(_) if started.elapsed() >= options.time_limit => SolveOutcome::error(format!(
                "time limit of {}s reached without an incumbent",
                options.time_limit.as_secs_f64()
            )),
            Err(err) => SolveOutcome::error(err.to_string()),
        }
    }

    fn name(&self) -> &'static str {
        "good_lp/microlp"
    }
}

/// Maps a terminated search onto the adapter's statuses.
pub(super) fn classify(status: SolutionStatus) -> SolveStatus {
    match status {
        SolutionStatus::Optimal | SolutionStatus::GapLimit => SolveStatus::Optimal,
        SolutionStatus::TimeLimit => SolveStatus::TimeLimitFeasible,
    }
}

pub(super) fn decode<S: Solution>(
    solution: &S,
    handles: &[Variable],
    model: &LinearModel,
) -> SolveOutcome {
    // every variable is integral; strip solver noise
    let values: Vec<f64> = handles.iter().map(|&h| solution.value(h).round()).collect();
    let objective_value = model.objective_value(&values);
    SolveOutcome::solved(classify(solution.status()), objective_value, values)
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::from(expr.constant);
    for &(var, coef) in &expr.terms {
        out += coef * handles[var.index()];
    }
    out
}
