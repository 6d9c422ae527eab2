//! Factory output schema
//!
//! Serialized field order matches the wire contract; recipe maps are
//! `BTreeMap` so keys come out sorted.

use std::collections::BTreeMap;

use serde::Serialize;

/// Binding capacity constraints at the Phase-2 optimum.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Bottlenecks {
    /// Machine types whose count cap is binding.
    pub machines: Vec<String>,

    /// Raw items whose supply cap is binding.
    pub raws: Vec<String>,
}

/// Everything the factory tool can print.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FactoryReport {
    Feasible {
        feasible: bool,
        crafts_per_min: BTreeMap<String, f64>,
        total_machines: f64,
        target_per_min: f64,
    },
    Limited {
        feasible: bool,
        max_feasible_target_per_min: f64,
        crafts_per_min: BTreeMap<String, f64>,
        bottlenecks: Bottlenecks,
    },
    Error {
        feasible: bool,
        error: String,
    },
}

impl FactoryReport {
    pub fn feasible(
        crafts_per_min: BTreeMap<String, f64>,
        total_machines: f64,
        target_per_min: f64,
    ) -> Self {
        Self::Feasible {
            feasible: true,
            crafts_per_min,
            total_machines,
            target_per_min,
        }
    }

    pub fn limited(
        max_feasible_target_per_min: f64,
        crafts_per_min: BTreeMap<String, f64>,
        bottlenecks: Bottlenecks,
    ) -> Self {
        Self::Limited {
            feasible: false,
            max_feasible_target_per_min,
            crafts_per_min,
            bottlenecks,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            feasible: false,
            error: message.into(),
        }
    }
}
