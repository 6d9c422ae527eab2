//! Module effect resolution - effective rates per recipe
//!
//! Speed modules multiply crafting rate only; productivity modules multiply
//! outputs only, never inputs.

use crate::factory::problem::{FactoryProblem, Recipe};

/// Effective per-recipe rates after module resolution.
#[derive(Debug, Clone, Copy)]
pub struct RecipeRate {
    /// Effective crafts per minute of one machine running this recipe.
    pub crafts_per_min: f64,
    /// Machines required per craft/min, the LP objective coefficient.
    pub machine_cost: f64,
    /// Aggregate productivity modifier of the assigned machine.
    pub prod_mod: f64,
}

/// Resolve module effects for every recipe, index-aligned with
/// `problem.recipes`. Validation guarantees the machine exists and the
/// effective speed is positive.
pub fn normalize(problem: &FactoryProblem) -> Vec<RecipeRate> {
    problem
        .recipes
        .iter()
        .map(|recipe| {
            let machine = &problem.machines[&recipe.machine];
            let speed_mod: f64 = machine.modules.iter().map(|module| module.speed).sum();
            let prod_mod: f64 = machine.modules.iter().map(|module| module.prod).sum();
            let crafts_per_min = machine.base_speed * (1.0 + speed_mod) * 60.0 / recipe.time_s;
            RecipeRate {
                crafts_per_min,
                machine_cost: 1.0 / crafts_per_min,
                prod_mod,
            }
        })
        .collect()
}

/// Net flow of `item` per craft of `recipe`: productivity-boosted output
/// minus input. Positive means the recipe produces the item on net.
pub fn net_coefficient(recipe: &Recipe, rate: &RecipeRate, item: &str) -> f64 {
    let produced = recipe.outputs.get(item).copied().unwrap_or(0.0) * (1.0 + rate.prod_mod);
    let consumed = recipe.inputs.get(item).copied().unwrap_or(0.0);
    produced - consumed
}
