//! Flowrate: steady-state production planning and belt routing solvers
//!
//! Two independent pipelines behind one CLI: `factory` reduces a recipe
//! catalogue to a linear program and drives a two-phase solve; `belts`
//! reduces a bounded flow network to a single max-flow computation and
//! extracts a min-cut certificate when routing is impossible.

pub mod belts;
pub mod cli;
pub mod factory;
pub mod solver;
