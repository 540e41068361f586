//! Solver-independent linear model.
//!
//! The formulation builders produce a [`LinearModel`]; a
//! [`MilpSolver`](crate::backend::MilpSolver) turns it into a concrete solver
//! problem. Keeping the model as plain data lets tests inspect constraint
//! families and evaluate candidate assignments with [`LinearModel::check`]
//! without running a solver.

use std::fmt;

use serde::Serialize;

/// Index of a variable inside its [`LinearModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VarId(pub(crate) usize);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VarKind {
    Binary,
    /// Integer with lower bound 0 and no upper bound.
    NonNegInteger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    pub kind: VarKind,
}

/// `sum(coef * var) + constant`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of `vars` with unit coefficients.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
            constant: 0.0,
        }
    }

    pub fn term(var: VarId, coef: f64) -> Self {
        Self {
            terms: vec![(var, coef)],
            constant: 0.0,
        }
    }

    pub fn add(&mut self, var: VarId, coef: f64) -> &mut Self {
        self.terms.push((var, coef));
        self
    }

    pub fn with(mut self, var: VarId, coef: f64) -> Self {
        self.terms.push((var, coef));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluates the expression against one value per model variable.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * values.get(v.0).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cmp {
    Le,
    Ge,
    Eq,
}

impl fmt::Display for Cmp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cmp::Le => "<=",
            Cmp::Ge => ">=",
            Cmp::Eq => "==",
        })
    }
}

/// `lhs cmp rhs`, tagged with the family it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    pub family: &'static str,
    pub lhs: LinearExpr,
    pub cmp: Cmp,
    pub rhs: f64,
}

impl Constraint {
    const TOLERANCE: f64 = 1e-6;

    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        let lhs = self.lhs.evaluate(values);
        match self.cmp {
            Cmp::Le => lhs <= self.rhs + Self::TOLERANCE,
            Cmp::Ge => lhs >= self.rhs - Self::TOLERANCE,
            Cmp::Eq => (lhs - self.rhs).abs() <= Self::TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sense {
    Maximize,
    Minimize,
}

/// Variables, one objective and a list of constraints.
#[derive(Debug, Clone, Serialize)]
pub struct LinearModel {
    variables: Vec<Variable>,
    sense: Sense,
    objective: LinearExpr,
    constraints: Vec<Constraint>,
}

impl LinearModel {
    pub fn new(sense: Sense) -> Self {
        Self {
            variables: Vec::new(),
            sense,
            objective: LinearExpr::new(),
            constraints: Vec::new(),
        }
    }

    pub fn add_var(&mut self, name: impl Into<String>, kind: VarKind) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(Variable {
            name: name.into(),
            kind,
        });
        id
    }

    pub fn set_objective(&mut self, objective: LinearExpr) {
        self.objective = objective;
    }

    pub fn add_constraint(&mut self, family: &'static str, lhs: LinearExpr, cmp: Cmp, rhs: f64) {
        self.constraints.push(Constraint {
            family,
            lhs,
            cmp,
            rhs,
        });
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Constraints of one family, in insertion order.
    pub fn family<'a>(&'a self, family: &'a str) -> impl Iterator<Item = &'a Constraint> + 'a {
        self.constraints.iter().filter(move |c| c.family == family)
    }

    /// Counts constraints per family in first-insertion order.
    pub fn family_counts(&self) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<(&'static str, usize)> = Vec::new();
        for c in &self.constraints {
            match counts.iter_mut().find(|(f, _)| *f == c.family) {
                Some((_, n)) => *n += 1,
                None => counts.push((c.family, 1)),
            }
        }
        counts
    }

    /// Returns the constraints violated by `values`.
    ///
    /// Variable kinds are checked too: a binary outside {0, 1} or a negative
    /// or fractional integer is reported as a violation of the pseudo-family
    /// `"domain"`.
    pub fn check(&self, values: &[f64]) -> Vec<Violation> {
        let mut violations = Vec::new();
        for (i, var) in self.variables.iter().enumerate() {
            let v = values.get(i).copied().unwrap_or(0.0);
            let tol = Constraint::TOLERANCE;
            let integral = (v - v.round()).abs() <= tol;
            let ok = match var.kind {
                VarKind::Binary => integral && (-tol..=1.0 + tol).contains(&v),
                VarKind::NonNegInteger => integral && v >= -tol,
            };
            if !ok {
                violations.push(Violation {
                    family: "domain",
                    detail: format!("{} = {v}", var.name),
                });
            }
        }
        for c in &self.constraints {
            if !c.is_satisfied(values) {
                violations.push(Violation {
                    family: c.family,
                    detail: format!("{} {} {}", c.lhs.evaluate(values), c.cmp, c.rhs),
                });
            }
        }
        violations
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.evaluate(values)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub family: &'static str,
    pub detail: String,
}

#[cfg(test)]
mod tests;
