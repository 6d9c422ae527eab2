//! Factory input schema and problem validation
//!
//! The JSON shapes deserialize leniently (unknown fields ignored, optional
//! collections defaulted) and `FactoryProblem::from_input` promotes them into
//! a validated, deterministically ordered problem the rest of the pipeline
//! can trust.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use thiserror::Error;

/// One recipe as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeSpec {
    pub id: String,

    /// Items consumed per craft.
    #[serde(default)]
    pub inputs: BTreeMap<String, f64>,

    /// Items produced per craft, before productivity.
    #[serde(default)]
    pub outputs: BTreeMap<String, f64>,

    /// Base craft time in seconds.
    pub time_s: f64,

    /// Machine type this recipe runs on.
    pub machine: String,
}

/// A module installed in a machine type.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ModuleSpec {
    /// Speed modifier, additive to 1.0.
    #[serde(default)]
    pub speed: f64,

    /// Productivity modifier, additive to 1.0.
    #[serde(default)]
    pub prod: f64,
}

/// One machine type as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineSpec {
    pub id: String,

    /// Maximum machine count; null or absent means uncapped.
    #[serde(default)]
    pub max_count: Option<f64>,

    /// Base craft speed multiplier.
    pub base_speed: f64,

    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetSpec {
    pub item: String,
    pub rate_per_min: f64,
}

/// The full factory input document.
#[derive(Debug, Clone, Deserialize)]
pub struct FactoryInput {
    #[serde(default)]
    pub recipes: Vec<RecipeSpec>,
    #[serde(default)]
    pub machines: Vec<MachineSpec>,
    #[serde(default)]
    pub raw_caps: BTreeMap<String, f64>,
    pub target: TargetSpec,
}

#[derive(Debug, Error, PartialEq)]
pub enum FactoryProblemError {
    #[error("recipe id must not be empty")]
    EmptyRecipeId,

    #[error("machine id must not be empty")]
    EmptyMachineId,

    #[error("duplicate recipe id '{0}'")]
    DuplicateRecipe(String),

    #[error("duplicate machine id '{0}'")]
    DuplicateMachine(String),

    #[error("recipe '{0}' uses unknown machine '{1}'")]
    UnknownMachine(String, String),

    #[error("recipe '{0}' must have time_s > 0")]
    NonPositiveTime(String),

    #[error("recipe '{0}' has a negative quantity for item '{1}'")]
    NegativeQuantity(String, String),

    #[error("machine '{0}' must have base_speed > 0")]
    NonPositiveSpeed(String),

    #[error("machine '{0}' has a non-positive effective speed after modules")]
    NonPositiveEffectiveSpeed(String),

    #[error("machine '{0}' must have a non-negative max_count")]
    NegativeMachineCap(String),

    #[error("raw cap for '{0}' must be a non-negative number")]
    BadRawCap(String),

    #[error("target item must not be empty")]
    EmptyTargetItem,

    #[error("target rate_per_min must be a non-negative number")]
    BadTargetRate,

    #[error("target item '{0}' must not be a raw material")]
    RawTarget(String),
}

/// A validated recipe.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: String,
    pub inputs: BTreeMap<String, f64>,
    pub outputs: BTreeMap<String, f64>,
    pub time_s: f64,
    pub machine: String,
}

/// A validated machine type with its installed modules.
#[derive(Debug, Clone)]
pub struct Machine {
    pub max_count: Option<f64>,
    pub base_speed: f64,
    pub modules: Vec<ModuleSpec>,
}

/// The validated problem. Recipes are sorted by id; machines and raw caps
/// live in ordered maps, so every traversal downstream is deterministic.
#[derive(Debug, Clone)]
pub struct FactoryProblem {
    pub recipes: Vec<Recipe>,
    pub machines: BTreeMap<String, Machine>,
    pub raw_caps: BTreeMap<String, f64>,
    pub target_item: String,
    pub target_rate: f64,
    /// Non-raw, non-target items referenced by any recipe. Each must balance
    /// to zero in steady state; byproducts are ordinary members of this set.
    pub intermediates: BTreeSet<String>,
}

impl FactoryProblem {
    pub fn from_input(input: FactoryInput) -> Result<Self, FactoryProblemError> {
        if input.target.item.is_empty() {
            return Err(FactoryProblemError::EmptyTargetItem);
        }
        if !input.target.rate_per_min.is_finite() || input.target.rate_per_min < 0.0 {
            return Err(FactoryProblemError::BadTargetRate);
        }

        let mut machines = BTreeMap::new();
        for spec in input.machines {
            if spec.id.is_empty() {
                return Err(FactoryProblemError::EmptyMachineId);
            }
            if !spec.base_speed.is_finite() || spec.base_speed <= 0.0 {
                return Err(FactoryProblemError::NonPositiveSpeed(spec.id));
            }
            let speed_mod: f64 = spec.modules.iter().map(|module| module.speed).sum();
            if 1.0 + speed_mod <= 0.0 {
                return Err(FactoryProblemError::NonPositiveEffectiveSpeed(spec.id));
            }
            if let Some(cap) = spec.max_count {
                if !cap.is_finite() || cap < 0.0 {
                    return Err(FactoryProblemError::NegativeMachineCap(spec.id));
                }
            }
            let machine = Machine {
                max_count: spec.max_count,
                base_speed: spec.base_speed,
                modules: spec.modules,
            };
            if machines.insert(spec.id.clone(), machine).is_some() {
                return Err(FactoryProblemError::DuplicateMachine(spec.id));
            }
        }

        let mut recipes = Vec::with_capacity(input.recipes.len());
        let mut seen_recipes = BTreeSet::new();
        let mut items = BTreeSet::new();
        for spec in input.recipes {
            if spec.id.is_empty() {
                return Err(FactoryProblemError::EmptyRecipeId);
            }
            if !seen_recipes.insert(spec.id.clone()) {
                return Err(FactoryProblemError::DuplicateRecipe(spec.id));
            }
            if !machines.contains_key(&spec.machine) {
                return Err(FactoryProblemError::UnknownMachine(spec.id, spec.machine));
            }
            if !spec.time_s.is_finite() || spec.time_s <= 0.0 {
                return Err(FactoryProblemError::NonPositiveTime(spec.id));
            }
            for (item, &qty) in spec.inputs.iter().chain(spec.outputs.iter()) {
                if !qty.is_finite() || qty < 0.0 {
                    return Err(FactoryProblemError::NegativeQuantity(
                        spec.id.clone(),
                        item.clone(),
                    ));
                }
                items.insert(item.clone());
            }
            recipes.push(Recipe {
                id: spec.id,
                inputs: spec.inputs,
                outputs: spec.outputs,
                time_s: spec.time_s,
                machine: spec.machine,
            });
        }
        recipes.sort_by(|a, b| a.id.cmp(&b.id));

        for (item, &cap) in &input.raw_caps {
            if !cap.is_finite() || cap < 0.0 {
                return Err(FactoryProblemError::BadRawCap(item.clone()));
            }
        }
        if input.raw_caps.contains_key(&input.target.item) {
            return Err(FactoryProblemError::RawTarget(input.target.item));
        }

        let intermediates = items
            .into_iter()
            .filter(|item| *item != input.target.item && !input.raw_caps.contains_key(item))
            .collect();

        Ok(Self {
            recipes,
            machines,
            raw_caps: input.raw_caps,
            target_item: input.target.item,
            target_rate: input.target.rate_per_min,
            intermediates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(id: &str) -> MachineSpec {
        MachineSpec {
            id: id.to_string(),
            max_count: Some(10.0),
            base_speed: 1.0,
            modules: Vec::new(),
        }
    }

    fn recipe(id: &str, machine: &str) -> RecipeSpec {
        RecipeSpec {
            id: id.to_string(),
            inputs: BTreeMap::from([("ore".to_string(), 1.0)]),
            outputs: BTreeMap::from([("plate".to_string(), 1.0)]),
            time_s: 1.0,
            machine: machine.to_string(),
        }
    }

    fn input() -> FactoryInput {
        FactoryInput {
            recipes: vec![recipe("smelt", "furnace")],
            machines: vec![machine("furnace")],
            raw_caps: BTreeMap::from([("ore".to_string(), 60.0)]),
            target: TargetSpec {
                item: "plate".to_string(),
                rate_per_min: 30.0,
            },
        }
    }

    #[test]
    fn test_valid_input_classifies_items() {
        let problem = FactoryProblem::from_input(input()).unwrap();
        assert_eq!(problem.recipes.len(), 1);
        assert!(problem.raw_caps.contains_key("ore"));
        assert!(problem.intermediates.is_empty());
        assert_eq!(problem.target_item, "plate");
    }

    #[test]
    fn test_byproducts_are_intermediates() {
        let mut spec = input();
        spec.recipes[0]
            .outputs
            .insert("slag".to_string(), 0.5);
        let problem = FactoryProblem::from_input(spec).unwrap();
        assert!(problem.intermediates.contains("slag"));
    }

    #[test]
    fn test_unknown_machine_rejected() {
        let mut spec = input();
        spec.recipes[0].machine = "assembler".to_string();
        assert_eq!(
            FactoryProblem::from_input(spec).unwrap_err(),
            FactoryProblemError::UnknownMachine(
                "smelt".to_string(),
                "assembler".to_string()
            )
        );
    }

    #[test]
    fn test_duplicate_recipe_rejected() {
        let mut spec = input();
        spec.recipes.push(recipe("smelt", "furnace"));
        assert_eq!(
            FactoryProblem::from_input(spec).unwrap_err(),
            FactoryProblemError::DuplicateRecipe("smelt".to_string())
        );
    }

    #[test]
    fn test_raw_target_rejected() {
        let mut spec = input();
        spec.raw_caps.insert("plate".to_string(), 5.0);
        assert_eq!(
            FactoryProblem::from_input(spec).unwrap_err(),
            FactoryProblemError::RawTarget("plate".to_string())
        );
    }

    #[test]
    fn test_non_positive_time_rejected() {
        let mut spec = input();
        spec.recipes[0].time_s = 0.0;
        assert_eq!(
            FactoryProblem::from_input(spec).unwrap_err(),
            FactoryProblemError::NonPositiveTime("smelt".to_string())
        );
    }

    #[test]
    fn test_negative_raw_cap_rejected() {
        let mut spec = input();
        spec.raw_caps.insert("ore".to_string(), -1.0);
        assert_eq!(
            FactoryProblem::from_input(spec).unwrap_err(),
            FactoryProblemError::BadRawCap("ore".to_string())
        );
    }

    #[test]
    fn test_module_stack_cannot_stall_machine() {
        let mut spec = input();
        spec.machines[0].modules = vec![ModuleSpec {
            speed: -1.0,
            prod: 0.0,
        }];
        assert_eq!(
            FactoryProblem::from_input(spec).unwrap_err(),
            FactoryProblemError::NonPositiveEffectiveSpeed(
                "furnace".to_string()
            )
        );
    }

    #[test]
    fn test_recipes_sorted_by_id() {
        let mut spec = input();
        spec.recipes.insert(0, {
            let mut r = recipe("z-late", "furnace");
            r.inputs.clear();
            r.outputs = BTreeMap::from([("plate".to_string(), 1.0)]);
            r
        });
        let problem = FactoryProblem::from_input(spec).unwrap();
        assert_eq!(problem.recipes[0].id, "smelt");
        assert_eq!(problem.recipes[1].id, "z-late");
    }
}
