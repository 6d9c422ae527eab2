//! Belts output schema

use serde::Serialize;

/// Realized flow on one original edge; output order matches input order.
#[derive(Debug, Clone, Serialize)]
pub struct FlowEntry {
    pub from: String,
    pub to: String,
    pub flow: f64,
}

/// An original edge crossing the min cut.
#[derive(Debug, Clone, Serialize)]
pub struct CutEdge {
    pub from: String,
    pub to: String,
}

/// Everything the belts tool can print.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BeltReport {
    Feasible {
        feasible: bool,
        flows: Vec<FlowEntry>,
    },
    Infeasible {
        feasible: bool,
        deficit: f64,
        cut_reachable: Vec<String>,
        tight_nodes: Vec<String>,
        tight_edges: Vec<CutEdge>,
    },
    Error {
        feasible: bool,
        error: String,
    },
}

impl BeltReport {
    pub fn feasible(flows: Vec<FlowEntry>) -> Self {
        Self::Feasible {
            feasible: true,
            flows,
        }
    }

    pub fn infeasible(
        deficit: f64,
        cut_reachable: Vec<String>,
        tight_nodes: Vec<String>,
        tight_edges: Vec<CutEdge>,
    ) -> Self {
        Self::Infeasible {
            feasible: false,
            deficit,
            cut_reachable,
            tight_nodes,
            tight_edges,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            feasible: false,
            error: message.into(),
        }
    }
}
