//! Factory pipeline - steady-state production planning
//!
//! Normalizes module effects, reduces the recipe catalogue to a linear
//! program, and drives the two-phase solve: exact target first, maximum
//! achievable rate with bottleneck diagnosis on infeasibility.

pub mod builder;
pub mod normalize;
pub mod problem;
pub mod report;
pub mod solve;

pub use problem::{FactoryInput, FactoryProblem, FactoryProblemError};
pub use report::{Bottlenecks, FactoryReport};
pub use solve::{solve, FactoryError};
