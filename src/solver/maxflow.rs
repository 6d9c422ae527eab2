//! Max-flow oracle - Dinic's algorithm over a petgraph residual network
//!
//! Arcs are inserted in forward/reverse pairs, so the reverse twin of arc `e`
//! is always the edge index `e ^ 1` and the flow routed through a forward arc
//! can be read off its twin's residual capacity. The reported min cut is the
//! canonical source-side partition (residual reachability), which is the same
//! for every maximum flow, so the oracle output is deterministic.

use std::collections::VecDeque;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};

use crate::solver::TOLERANCE;

const UNLABELED: usize = usize::MAX;

/// A capacitated directed network accepting infinite capacities.
#[derive(Debug)]
pub struct FlowNetwork {
    residual: DiGraph<(), f64>,
    /// Outgoing residual arcs (both directions) per node, insertion order.
    adjacency: Vec<Vec<(EdgeIndex, NodeIndex)>>,
}

/// Outcome of one max-flow run.
#[derive(Debug, Clone)]
pub struct MaxFlowResult {
    /// Total flow routed from source to sink.
    pub value: f64,
    /// `source_side[v]` is true iff `v` is reachable from the source in the
    /// final residual graph.
    pub source_side: Vec<bool>,
}

impl FlowNetwork {
    pub fn new() -> Self {
        Self {
            residual: DiGraph::new(),
            adjacency: Vec::new(),
        }
    }

    pub fn add_node(&mut self) -> NodeIndex {
        self.adjacency.push(Vec::new());
        self.residual.add_node(())
    }

    pub fn node_count(&self) -> usize {
        self.residual.node_count()
    }

    /// Add a capacitated arc and its zero-capacity reverse twin. The returned
    /// handle is valid for `arc_flow` after a run.
    pub fn add_arc(&mut self, from: NodeIndex, to: NodeIndex, capacity: f64) -> EdgeIndex {
        let forward = self.residual.add_edge(from, to, capacity);
        let reverse = self.residual.add_edge(to, from, 0.0);
        self.adjacency[from.index()].push((forward, to));
        self.adjacency[to.index()].push((reverse, from));
        forward
    }

    fn twin(arc: EdgeIndex) -> EdgeIndex {
        EdgeIndex::new(arc.index() ^ 1)
    }

    /// Flow routed through a forward arc. Meaningful once `run` returned.
    pub fn arc_flow(&self, arc: EdgeIndex) -> f64 {
        self.residual[Self::twin(arc)]
    }

    /// Compute a maximum flow from `source` to `sink`.
    pub fn run(&mut self, source: NodeIndex, sink: NodeIndex) -> MaxFlowResult {
        let mut value = 0.0;
        while let Some(levels) = self.level_graph(source, sink) {
            let mut cursors = vec![0usize; self.node_count()];
            loop {
                let pushed = self.augment(source, sink, f64::INFINITY, &levels, &mut cursors);
                if pushed <= TOLERANCE {
                    break;
                }
                value += pushed;
            }
        }

        MaxFlowResult {
            value,
            source_side: self.residual_reachable(source),
        }
    }

    /// BFS levels over arcs with spare residual capacity; `None` once the
    /// sink can no longer be reached.
    fn level_graph(&self, source: NodeIndex, sink: NodeIndex) -> Option<Vec<usize>> {
        let mut levels = vec![UNLABELED; self.node_count()];
        levels[source.index()] = 0;
        let mut queue = VecDeque::from([source]);
        while let Some(node) = queue.pop_front() {
            for &(arc, next) in &self.adjacency[node.index()] {
                if self.residual[arc] > TOLERANCE && levels[next.index()] == UNLABELED {
                    levels[next.index()] = levels[node.index()] + 1;
                    queue.push_back(next);
                }
            }
        }
        if levels[sink.index()] == UNLABELED {
            None
        } else {
            Some(levels)
        }
    }

    /// DFS one augmenting path along the level graph, saturating arcs as it
    /// unwinds. `cursors` implements the standard dead-arc skip so each arc
    /// is inspected once per phase.
    fn augment(
        &mut self,
        node: NodeIndex,
        sink: NodeIndex,
        limit: f64,
        levels: &[usize],
        cursors: &mut [usize],
    ) -> f64 {
        if node == sink {
            return limit;
        }
        while cursors[node.index()] < self.adjacency[node.index()].len() {
            let (arc, next) = self.adjacency[node.index()][cursors[node.index()]];
            let spare = self.residual[arc];
            if spare > TOLERANCE && levels[next.index()] == levels[node.index()] + 1 {
                let pushed = self.augment(next, sink, limit.min(spare), levels, cursors);
                if pushed > TOLERANCE {
                    self.residual[arc] -= pushed;
                    self.residual[Self::twin(arc)] += pushed;
                    return pushed;
                }
            }
            cursors[node.index()] += 1;
        }
        0.0
    }

    fn residual_reachable(&self, source: NodeIndex) -> Vec<bool> {
        let mut reachable = vec![false; self.node_count()];
        reachable[source.index()] = true;
        let mut queue = VecDeque::from([source]);
        while let Some(node) = queue.pop_front() {
            for &(arc, next) in &self.adjacency[node.index()] {
                if self.residual[arc] > TOLERANCE && !reachable[next.index()] {
                    reachable[next.index()] = true;
                    queue.push_back(next);
                }
            }
        }
        reachable
    }
}
