//! LP oracle - a deterministic wrapper over the microlp simplex solver
//!
//! The factory pipeline talks to this module through plain index-based
//! constraint rows; `microlp` variable handles never leak out. Infeasible and
//! unbounded are outcomes, not errors: the two-phase driver branches on them.

use microlp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem};
use thiserror::Error;

use crate::solver::TOLERANCE;

/// Direction of optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// Relation of a constraint row to its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
}

/// A single constraint row: `Σ coeff · x[var] ⋈ rhs`.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub terms: Vec<(usize, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

/// A linear program over box-bounded continuous variables.
#[derive(Debug, Clone)]
pub struct LinearProgram {
    sense: Sense,
    objective: Vec<f64>,
    bounds: Vec<(f64, f64)>,
    constraints: Vec<Constraint>,
}

/// Result of one oracle invocation.
#[derive(Debug, Clone)]
pub enum LpOutcome {
    Optimal(LpSolution),
    Infeasible,
    Unbounded,
}

#[derive(Debug, Clone)]
pub struct LpSolution {
    /// Optimal variable values, index-aligned with `add_var` calls.
    pub x: Vec<f64>,
    pub objective: f64,
}

#[derive(Debug, Error)]
pub enum LpError {
    #[error("LP oracle failed: {0}")]
    Oracle(String),
}

impl LinearProgram {
    pub fn new(sense: Sense) -> Self {
        Self {
            sense,
            objective: Vec::new(),
            bounds: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Add a non-negative variable with the given objective coefficient.
    pub fn add_var(&mut self, objective: f64) -> usize {
        self.add_var_bounded(objective, (0.0, f64::INFINITY))
    }

    /// Add a variable with explicit `(lower, upper)` bounds.
    pub fn add_var_bounded(&mut self, objective: f64, bounds: (f64, f64)) -> usize {
        self.objective.push(objective);
        self.bounds.push(bounds);
        self.objective.len() - 1
    }

    pub fn add_constraint(&mut self, terms: Vec<(usize, f64)>, relation: Relation, rhs: f64) {
        self.constraints.push(Constraint {
            terms,
            relation,
            rhs,
        });
    }

    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    /// A row with no effective terms is decided here rather than handed to
    /// the solver: `0 = rhs` and `0 ≤ rhs` either hold trivially or prove the
    /// whole program infeasible.
    fn trivial_verdict(constraint: &Constraint) -> Option<bool> {
        if constraint.terms.iter().any(|&(_, coeff)| coeff != 0.0) {
            return None;
        }
        let holds = match constraint.relation {
            Relation::Eq => constraint.rhs.abs() <= TOLERANCE,
            Relation::Le => constraint.rhs >= -TOLERANCE,
        };
        Some(holds)
    }

    /// Solve the program. Deterministic: identical inputs produce identical
    /// outcomes and identical solution vectors.
    pub fn solve(&self) -> Result<LpOutcome, LpError> {
        let mut live_rows = Vec::with_capacity(self.constraints.len());
        for constraint in &self.constraints {
            match Self::trivial_verdict(constraint) {
                Some(true) => {}
                Some(false) => return Ok(LpOutcome::Infeasible),
                None => live_rows.push(constraint),
            }
        }

        if live_rows.is_empty() {
            return Ok(self.solve_unconstrained());
        }

        let direction = match self.sense {
            Sense::Minimize => OptimizationDirection::Minimize,
            Sense::Maximize => OptimizationDirection::Maximize,
        };
        let mut problem = Problem::new(direction);
        let vars: Vec<_> = self
            .objective
            .iter()
            .zip(&self.bounds)
            .map(|(&coeff, &bounds)| problem.add_var(coeff, bounds))
            .collect();
        for constraint in live_rows {
            let mut expr = LinearExpr::empty();
            for &(var, coeff) in &constraint.terms {
                expr.add(vars[var], coeff);
            }
            let op = match constraint.relation {
                Relation::Eq => ComparisonOp::Eq,
                Relation::Le => ComparisonOp::Le,
            };
            problem.add_constraint(expr, op, constraint.rhs);
        }

        match problem.solve() {
            Ok(solution) => {
                let x = vars.iter().map(|&var| solution[var]).collect();
                Ok(LpOutcome::Optimal(LpSolution {
                    x,
                    objective: solution.objective(),
                }))
            }
            Err(microlp::Error::Infeasible) => Ok(LpOutcome::Infeasible),
            Err(microlp::Error::Unbounded) => Ok(LpOutcome::Unbounded),
            Err(other) => Err(LpError::Oracle(other.to_string())),
        }
    }

    /// With every row trivially satisfied, each variable optimizes its own
    /// objective term against its bounds.
    fn solve_unconstrained(&self) -> LpOutcome {
        let mut x = Vec::with_capacity(self.objective.len());
        let mut objective = 0.0;
        for (&coeff, &(lower, upper)) in self.objective.iter().zip(&self.bounds) {
            let prefers_upper = match self.sense {
                Sense::Minimize => coeff < 0.0,
                Sense::Maximize => coeff > 0.0,
            };
            let value = if coeff == 0.0 || !prefers_upper {
                lower
            } else {
                upper
            };
            if !value.is_finite() {
                return LpOutcome::Unbounded;
            }
            x.push(value);
            objective += coeff * value;
        }
        LpOutcome::Optimal(LpSolution { x, objective })
    }
}
