//! Numeric solver oracles shared by the factory and belts pipelines

pub mod lp;
pub mod maxflow;

pub use lp::{Constraint, LinearProgram, LpError, LpOutcome, LpSolution, Relation, Sense};
pub use maxflow::{FlowNetwork, MaxFlowResult};

/// Canonical comparison tolerance for every numeric decision in both
/// pipelines. Chained tolerances are avoided: values are compared against
/// this constant directly, never against products of it.
pub const TOLERANCE: f64 = 1e-9;

/// Snap solver noise to an exact zero before a value is reported.
pub fn snap(value: f64) -> f64 {
    if value.abs() <= TOLERANCE {
        0.0
    } else {
        value
    }
}
