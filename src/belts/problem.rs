//! Belt network input schema and problem validation

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use thiserror::Error;

use crate::solver::TOLERANCE;

/// One node as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    pub id: String,

    /// Throughput cap; null or absent means unbounded.
    #[serde(default)]
    pub cap: Option<f64>,
}

/// One directed edge with its flow bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,

    /// Lower flow bound, defaults to 0.
    #[serde(default)]
    pub lower: f64,

    /// Upper flow bound; null or absent means unbounded.
    #[serde(default)]
    pub upper: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceSpec {
    pub id: String,
    pub supply: f64,
}

/// The full belts input document.
#[derive(Debug, Clone, Deserialize)]
pub struct BeltInput {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
    pub sink: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum BeltProblemError {
    #[error("node id must not be empty")]
    EmptyNodeId,

    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),

    #[error("node '{0}' must have a non-negative cap")]
    BadCap(String),

    #[error("edge references unknown node '{0}'")]
    UnknownEdgeNode(String),

    #[error("source '{0}' is not a declared node")]
    UnknownSource(String),

    #[error("duplicate source '{0}'")]
    DuplicateSource(String),

    #[error("source '{0}' must have a non-negative supply")]
    BadSupply(String),

    #[error("sink '{0}' is not a declared node")]
    UnknownSink(String),

    #[error("the sink '{0}' cannot also be a source")]
    SinkIsSource(String),

    #[error("edge {0} -> {1} must have a non-negative lower bound")]
    NegativeLower(String, String),

    #[error("edge {0} -> {1} has an upper bound below its lower bound")]
    BoundsInverted(String, String),

    #[error("the sink '{0}' must not have outgoing edges")]
    SinkHasOutEdges(String),

    #[error("source '{0}' has no outgoing edge")]
    SourceWithoutEdges(String),

    #[error("lower bounds through capped node '{0}' exceed its cap")]
    LowerExceedsCap(String),
}

/// A validated edge; order matches the input document.
#[derive(Debug, Clone)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub lower: f64,
    pub upper: Option<f64>,
}

/// The validated network. Node and source maps are ordered; the edge list
/// preserves input order, which the output contract depends on.
#[derive(Debug, Clone)]
pub struct BeltProblem {
    /// Every declared node and its optional throughput cap.
    pub caps: BTreeMap<String, Option<f64>>,
    pub edges: Vec<Edge>,
    pub sources: BTreeMap<String, f64>,
    pub sink: String,
}

impl BeltProblem {
    pub fn from_input(input: BeltInput) -> Result<Self, BeltProblemError> {
        let mut caps = BTreeMap::new();
        for node in input.nodes {
            if node.id.is_empty() {
                return Err(BeltProblemError::EmptyNodeId);
            }
            if let Some(cap) = node.cap {
                if !cap.is_finite() || cap < 0.0 {
                    return Err(BeltProblemError::BadCap(node.id));
                }
            }
            if caps.insert(node.id.clone(), node.cap).is_some() {
                return Err(BeltProblemError::DuplicateNode(node.id));
            }
        }

        if !caps.contains_key(&input.sink) {
            return Err(BeltProblemError::UnknownSink(input.sink));
        }

        let mut sources = BTreeMap::new();
        for source in input.sources {
            if !caps.contains_key(&source.id) {
                return Err(BeltProblemError::UnknownSource(source.id));
            }
            if source.id == input.sink {
                return Err(BeltProblemError::SinkIsSource(source.id));
            }
            if !source.supply.is_finite() || source.supply < 0.0 {
                return Err(BeltProblemError::BadSupply(source.id));
            }
            if sources.insert(source.id.clone(), source.supply).is_some() {
                return Err(BeltProblemError::DuplicateSource(source.id));
            }
        }

        let mut edges = Vec::with_capacity(input.edges.len());
        let mut has_out_edge = BTreeSet::new();
        for edge in input.edges {
            for endpoint in [&edge.from, &edge.to] {
                if !caps.contains_key(endpoint) {
                    return Err(BeltProblemError::UnknownEdgeNode(endpoint.clone()));
                }
            }
            if !edge.lower.is_finite() || edge.lower < 0.0 {
                return Err(BeltProblemError::NegativeLower(edge.from, edge.to));
            }
            if let Some(upper) = edge.upper {
                if !upper.is_finite() || upper < edge.lower - TOLERANCE {
                    return Err(BeltProblemError::BoundsInverted(edge.from, edge.to));
                }
            }
            if edge.from == input.sink {
                return Err(BeltProblemError::SinkHasOutEdges(input.sink));
            }
            has_out_edge.insert(edge.from.clone());
            edges.push(Edge {
                from: edge.from,
                to: edge.to,
                lower: edge.lower,
                upper: edge.upper,
            });
        }

        for id in sources.keys() {
            if !has_out_edge.contains(id) {
                return Err(BeltProblemError::SourceWithoutEdges(id.clone()));
            }
        }

        // A capped interior node can never honor lower bounds beyond its
        // throughput, in either direction.
        for (id, cap) in &caps {
            let interior = !sources.contains_key(id) && *id != input.sink;
            if let (Some(cap), true) = (cap, interior) {
                let lower_in: f64 = edges
                    .iter()
                    .filter(|edge| edge.to == *id)
                    .map(|edge| edge.lower)
                    .sum();
                let lower_out: f64 = edges
                    .iter()
                    .filter(|edge| edge.from == *id)
                    .map(|edge| edge.lower)
                    .sum();
                if lower_in > cap + TOLERANCE || lower_out > cap + TOLERANCE {
                    return Err(BeltProblemError::LowerExceedsCap(id.clone()));
                }
            }
        }

        Ok(Self {
            caps,
            edges,
            sources,
            sink: input.sink,
        })
    }
}
