//! Min-cut certificate extraction for infeasible networks
//!
//! The oracle's source-side partition is mapped back through the split-node
//! and edge bookkeeping: a split node whose in-vertex is reachable while its
//! out-vertex is not has a binding throughput cap; an original edge whose arc
//! crosses the cut has a binding upper bound.

use crate::belts::problem::BeltProblem;
use crate::belts::report::{BeltReport, CutEdge};
use crate::belts::transform::TransformedGraph;
use crate::solver::MaxFlowResult;

pub fn certificate(
    problem: &BeltProblem,
    transformed: &TransformedGraph,
    result: &MaxFlowResult,
) -> BeltReport {
    let reachable = |node: petgraph::graph::NodeIndex| result.source_side[node.index()];

    let mut cut_reachable = Vec::new();
    let mut tight_nodes = Vec::new();
    for (id, &(v_in, v_out)) in &transformed.node_ports {
        if reachable(v_in) {
            cut_reachable.push(id.clone());
        }
        if v_in != v_out && reachable(v_in) && !reachable(v_out) {
            tight_nodes.push(id.clone());
        }
    }

    let mut tight_edges: Vec<CutEdge> = problem
        .edges
        .iter()
        .filter(|edge| {
            let tail = transformed.node_ports[&edge.from].1;
            let head = transformed.node_ports[&edge.to].0;
            reachable(tail) && !reachable(head)
        })
        .map(|edge| CutEdge {
            from: edge.from.clone(),
            to: edge.to.clone(),
        })
        .collect();
    tight_edges.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));

    BeltReport::infeasible(
        transformed.expected - result.value,
        cut_reachable,
        tight_nodes,
        tight_edges,
    )
}
