//! Belts pipeline - feasible routing through bounded flow networks
//!
//! Rewrites a network with edge lower bounds and node throughput caps into a
//! plain max-flow instance, tests the saturation condition, and maps the
//! result back: per-edge flows when feasible, a min-cut certificate when not.

pub mod certificate;
pub mod problem;
pub mod report;
pub mod solve;
pub mod transform;

pub use problem::{BeltInput, BeltProblem, BeltProblemError};
pub use report::{BeltReport, CutEdge, FlowEntry};
pub use solve::{solve, BeltError};
