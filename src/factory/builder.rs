//! LP assembly for the factory pipeline
//!
//! Rows and columns are emitted in a fixed order (recipes, intermediates and
//! raws lexicographic, target equality last, machine caps before raw rows) so
//! the oracle sees byte-identical programs across runs.

use crate::factory::normalize::{net_coefficient, RecipeRate};
use crate::factory::problem::FactoryProblem;
use crate::solver::{LinearProgram, Relation, Sense};

/// Phase-2 programs carry one extra variable: the achieved target rate.
pub struct PhaseTwoLp {
    pub lp: LinearProgram,
    /// Index of the achieved-rate variable `y`.
    pub rate_var: usize,
}

/// Nonzero balance terms of `item` across all recipes.
fn balance_terms(problem: &FactoryProblem, rates: &[RecipeRate], item: &str) -> Vec<(usize, f64)> {
    problem
        .recipes
        .iter()
        .zip(rates)
        .enumerate()
        .filter_map(|(var, (recipe, rate))| {
            let net = net_coefficient(recipe, rate, item);
            (net != 0.0).then_some((var, net))
        })
        .collect()
}

/// Shared inequality rows: machine capacities, then `net_flow(raw) ≤ 0`, then
/// `consumption(raw) ≤ cap` for each raw item.
fn add_capacity_rows(lp: &mut LinearProgram, problem: &FactoryProblem, rates: &[RecipeRate]) {
    for (machine_id, machine) in &problem.machines {
        if let Some(cap) = machine.max_count {
            let terms: Vec<(usize, f64)> = problem
                .recipes
                .iter()
                .zip(rates)
                .enumerate()
                .filter_map(|(var, (recipe, rate))| {
                    (recipe.machine == *machine_id).then_some((var, rate.machine_cost))
                })
                .collect();
            lp.add_constraint(terms, Relation::Le, cap);
        }
    }
    for item in problem.raw_caps.keys() {
        lp.add_constraint(balance_terms(problem, rates, item), Relation::Le, 0.0);
    }
    for (item, &cap) in &problem.raw_caps {
        let negated = balance_terms(problem, rates, item)
            .into_iter()
            .map(|(var, net)| (var, -net))
            .collect();
        lp.add_constraint(negated, Relation::Le, cap);
    }
}

/// Phase 1: hit the requested target rate exactly while minimizing machines.
pub fn build_phase1(problem: &FactoryProblem, rates: &[RecipeRate]) -> LinearProgram {
    let mut lp = LinearProgram::new(Sense::Minimize);
    for rate in rates {
        lp.add_var(rate.machine_cost);
    }
    for item in &problem.intermediates {
        lp.add_constraint(balance_terms(problem, rates, item), Relation::Eq, 0.0);
    }
    lp.add_constraint(
        balance_terms(problem, rates, &problem.target_item),
        Relation::Eq,
        problem.target_rate,
    );
    add_capacity_rows(&mut lp, problem, rates);
    lp
}

/// Phase 2: free the target rate into a variable `y` and maximize it under
/// the same capacity rows.
pub fn build_phase2(problem: &FactoryProblem, rates: &[RecipeRate]) -> PhaseTwoLp {
    let mut lp = LinearProgram::new(Sense::Maximize);
    for _ in rates {
        lp.add_var(0.0);
    }
    let rate_var = lp.add_var(1.0);
    for item in &problem.intermediates {
        lp.add_constraint(balance_terms(problem, rates, item), Relation::Eq, 0.0);
    }
    let mut target_row = balance_terms(problem, rates, &problem.target_item);
    target_row.push((rate_var, -1.0));
    lp.add_constraint(target_row, Relation::Eq, 0.0);
    add_capacity_rows(&mut lp, problem, rates);
    PhaseTwoLp { lp, rate_var }
}
