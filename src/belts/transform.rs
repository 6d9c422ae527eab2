//! Graph transformation - node splitting, lower-bound rewrite, super wiring
//!
//! The classical bounded-flow reduction: capped interior nodes split into an
//! in/out vertex pair joined by a cap-limited arc, `[lo, hi]` edges become
//! `hi - lo` residual arcs plus per-node demand deltas, and a super
//! source/sink pair absorbs the demands. Any feasible flow in the original
//! network corresponds bijectively to an `S* → T*` flow of value `expected`.

use std::collections::BTreeMap;

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::belts::problem::BeltProblem;
use crate::solver::{FlowNetwork, TOLERANCE};

/// The transformed network plus the bidirectional bookkeeping needed to map
/// oracle results back onto the original graph.
pub struct TransformedGraph {
    pub network: FlowNetwork,
    pub super_source: NodeIndex,
    pub super_sink: NodeIndex,
    /// Flow value that certifies feasibility: total supply plus total
    /// positive residual demand.
    pub expected: f64,
    pub total_supply: f64,
    /// Transformed arc per original edge, index-aligned with `problem.edges`.
    pub edge_arcs: Vec<EdgeIndex>,
    /// `v → (v_in, v_out)`; the two coincide for unsplit nodes.
    pub node_ports: BTreeMap<String, (NodeIndex, NodeIndex)>,
}

impl TransformedGraph {
    pub fn is_split(&self, id: &str) -> bool {
        self.node_ports
            .get(id)
            .map(|&(v_in, v_out)| v_in != v_out)
            .unwrap_or(false)
    }
}

pub fn transform(problem: &BeltProblem) -> TransformedGraph {
    let mut network = FlowNetwork::new();
    let mut node_ports = BTreeMap::new();

    for (id, cap) in &problem.caps {
        let interior = !problem.sources.contains_key(id) && *id != problem.sink;
        match cap {
            Some(cap) if interior => {
                let v_in = network.add_node();
                let v_out = network.add_node();
                network.add_arc(v_in, v_out, *cap);
                node_ports.insert(id.clone(), (v_in, v_out));
            }
            _ => {
                let v = network.add_node();
                node_ports.insert(id.clone(), (v, v));
            }
        }
    }

    let mut demand: BTreeMap<&str, f64> = BTreeMap::new();
    let mut edge_arcs = Vec::with_capacity(problem.edges.len());
    for edge in &problem.edges {
        let tail = node_ports[&edge.from].1;
        let head = node_ports[&edge.to].0;
        let capacity = edge
            .upper
            .map(|upper| (upper - edge.lower).max(0.0))
            .unwrap_or(f64::INFINITY);
        edge_arcs.push(network.add_arc(tail, head, capacity));
        *demand.entry(edge.to.as_str()).or_insert(0.0) += edge.lower;
        *demand.entry(edge.from.as_str()).or_insert(0.0) -= edge.lower;
    }

    let super_source = network.add_node();
    let super_sink = network.add_node();

    let mut total_supply = 0.0;
    for (id, &supply) in &problem.sources {
        // Sources are never split, so the single port doubles as s_out.
        network.add_arc(super_source, node_ports[id].1, supply);
        total_supply += supply;
    }

    let mut total_demand = 0.0;
    for (id, &delta) in &demand {
        if delta > TOLERANCE {
            network.add_arc(super_source, node_ports[*id].0, delta);
            total_demand += delta;
        } else if delta < -TOLERANCE {
            network.add_arc(node_ports[*id].1, super_sink, -delta);
        }
    }

    // total_supply is exactly the flow a feasible solution routes through
    // the sink: it balances the super-side capacity totals, so saturating
    // S* forces every T* arc tight as well. A looser capacity would let
    // demand flow short-circuit through the sink and corrupt reconstruction.
    network.add_arc(node_ports[&problem.sink].0, super_sink, total_supply);

    TransformedGraph {
        network,
        super_source,
        super_sink,
        expected: total_supply + total_demand,
        total_supply,
        edge_arcs,
        node_ports,
    }
}
