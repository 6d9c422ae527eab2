//! Max-flow driver - feasibility test and flow reconstruction

use thiserror::Error;

use crate::belts::certificate::certificate;
use crate::belts::problem::{BeltInput, BeltProblem, BeltProblemError};
use crate::belts::report::{BeltReport, FlowEntry};
use crate::belts::transform::transform;
use crate::solver::{snap, TOLERANCE};

#[derive(Debug, Error)]
pub enum BeltError {
    #[error(transparent)]
    Problem(#[from] BeltProblemError),

    #[error("flow problem is unbounded; check for missing capacities")]
    Unbounded,
}

/// Solve one belts invocation end to end. Infeasibility is a report carrying
/// the min-cut certificate, not an error.
pub fn solve(input: BeltInput) -> Result<BeltReport, BeltError> {
    let problem = BeltProblem::from_input(input)?;
    let mut transformed = transform(&problem);

    // Nothing to route: every lower bound is absorbed by a balanced
    // circulation and each edge simply carries its own lower bound.
    if transformed.expected <= TOLERANCE {
        let flows = problem
            .edges
            .iter()
            .map(|edge| FlowEntry {
                from: edge.from.clone(),
                to: edge.to.clone(),
                flow: snap(edge.lower),
            })
            .collect();
        return Ok(BeltReport::feasible(flows));
    }

    let result = transformed
        .network
        .run(transformed.super_source, transformed.super_sink);
    if !result.value.is_finite() {
        return Err(BeltError::Unbounded);
    }

    if result.value >= transformed.expected - TOLERANCE {
        let flows = problem
            .edges
            .iter()
            .zip(&transformed.edge_arcs)
            .map(|(edge, &arc)| FlowEntry {
                from: edge.from.clone(),
                to: edge.to.clone(),
                flow: snap(edge.lower + transformed.network.arc_flow(arc)),
            })
            .collect();
        Ok(BeltReport::feasible(flows))
    } else {
        Ok(certificate(&problem, &transformed, &result))
    }
}
