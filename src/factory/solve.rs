//! Two-phase LP driver and bottleneck analysis
//!
//! Phase 1 asks for the requested target rate outright. Only when the oracle
//! proves that infeasible does Phase 2 relax the target into a variable and
//! maximize it; the binding capacity rows at that optimum become the
//! bottleneck diagnosis.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::factory::builder::{build_phase1, build_phase2};
use crate::factory::normalize::{net_coefficient, normalize, RecipeRate};
use crate::factory::problem::{FactoryInput, FactoryProblem, FactoryProblemError};
use crate::factory::report::{Bottlenecks, FactoryReport};
use crate::solver::{snap, LpError, LpOutcome, LpSolution, TOLERANCE};

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error(transparent)]
    Problem(#[from] FactoryProblemError),

    #[error("linear program is unbounded; raw supply caps are missing")]
    Unbounded,

    #[error(transparent)]
    Oracle(#[from] LpError),

    #[error("solver returned non-finite values")]
    NonFinite,
}

/// Solve one factory invocation end to end. Infeasibility is a report, not
/// an error; errors are reserved for invalid input and oracle anomalies.
pub fn solve(input: FactoryInput) -> Result<FactoryReport, FactoryError> {
    let problem = FactoryProblem::from_input(input)?;
    let rates = normalize(&problem);

    match build_phase1(&problem, &rates).solve()? {
        LpOutcome::Optimal(solution) => feasible_report(&problem, &solution),
        LpOutcome::Unbounded => Err(FactoryError::Unbounded),
        LpOutcome::Infeasible => run_phase2(&problem, &rates),
    }
}

fn run_phase2(problem: &FactoryProblem, rates: &[RecipeRate]) -> Result<FactoryReport, FactoryError> {
    let phase2 = build_phase2(problem, rates);
    match phase2.lp.solve()? {
        LpOutcome::Optimal(solution) => {
            let achieved = snap(solution.x[phase2.rate_var]);
            let crafts = crafts_map(problem, &solution.x)?;
            let bottlenecks = bottlenecks(problem, rates, &solution.x);
            Ok(FactoryReport::limited(achieved, crafts, bottlenecks))
        }
        // Unreachable once caps are validated non-negative: the zero plan
        // satisfies every row. Kept as a handled result regardless.
        LpOutcome::Infeasible => {
            let crafts = problem
                .recipes
                .iter()
                .map(|recipe| (recipe.id.clone(), 0.0))
                .collect();
            Ok(FactoryReport::limited(0.0, crafts, Bottlenecks::default()))
        }
        LpOutcome::Unbounded => Err(FactoryError::Unbounded),
    }
}

fn feasible_report(
    problem: &FactoryProblem,
    solution: &LpSolution,
) -> Result<FactoryReport, FactoryError> {
    if !solution.objective.is_finite() {
        return Err(FactoryError::NonFinite);
    }
    let crafts = crafts_map(problem, &solution.x)?;
    Ok(FactoryReport::feasible(
        crafts,
        snap(solution.objective),
        problem.target_rate,
    ))
}

fn crafts_map(
    problem: &FactoryProblem,
    x: &[f64],
) -> Result<BTreeMap<String, f64>, FactoryError> {
    let mut crafts = BTreeMap::new();
    for (recipe, &value) in problem.recipes.iter().zip(x) {
        if !value.is_finite() {
            return Err(FactoryError::NonFinite);
        }
        crafts.insert(recipe.id.clone(), snap(value));
    }
    Ok(crafts)
}

/// Name every finite capacity row with zero slack at `x`. Equality rows are
/// never candidates.
fn bottlenecks(problem: &FactoryProblem, rates: &[RecipeRate], x: &[f64]) -> Bottlenecks {
    let mut binding = Bottlenecks::default();
    for (machine_id, machine) in &problem.machines {
        if let Some(cap) = machine.max_count {
            let used: f64 = problem
                .recipes
                .iter()
                .zip(rates)
                .zip(x)
                .filter(|((recipe, _), _)| recipe.machine == *machine_id)
                .map(|((_, rate), &crafts)| rate.machine_cost * crafts)
                .sum();
            if (cap - used).abs() <= TOLERANCE {
                binding.machines.push(machine_id.clone());
            }
        }
    }
    for (item, &cap) in &problem.raw_caps {
        let consumed: f64 = problem
            .recipes
            .iter()
            .zip(rates)
            .zip(x)
            .map(|((recipe, rate), &crafts)| -net_coefficient(recipe, rate, item) * crafts)
            .sum();
        if (cap - consumed).abs() <= TOLERANCE {
            binding.raws.push(item.clone());
        }
    }
    binding
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::factory::problem::{MachineSpec, ModuleSpec, RecipeSpec, TargetSpec};
    use crate::factory::report::FactoryReport;

    fn smelter(modules: Vec<ModuleSpec>, max_count: Option<f64>) -> MachineSpec {
        MachineSpec {
            id: "furnace".to_string(),
            max_count,
            base_speed: 1.0,
            modules,
        }
    }

    // ========================================================================
    // Phase 1
    // ========================================================================

    #[test]
    fn test_free_recipe_hits_target() {
        // One recipe conjuring iron from nothing: 30/min needs 30 crafts/min
        // at 60 crafts/min per machine, half a machine in total.
        let input = FactoryInput {
            recipes: vec![RecipeSpec {
                id: "mine".to_string(),
                inputs: BTreeMap::new(),
                outputs: BTreeMap::from([("iron".to_string(), 1.0)]),
                time_s: 1.0,
                machine: "furnace".to_string(),
            }],
            machines: vec![smelter(Vec::new(), Some(10.0))],
            raw_caps: BTreeMap::new(),
            target: TargetSpec {
                item: "iron".to_string(),
                rate_per_min: 30.0,
            },
        };

        match solve(input).unwrap() {
            FactoryReport::Feasible {
                crafts_per_min,
                total_machines,
                target_per_min,
                ..
            } => {
                assert!((crafts_per_min["mine"] - 30.0).abs() < 1e-6);
                assert!((total_machines - 0.5).abs() < 1e-6);
                assert_eq!(target_per_min, 30.0);
            }
            other => panic!("expected feasible, got {:?}", other),
        }
    }

    #[test]
    fn test_productivity_stretches_raw_supply() {
        // Each craft yields 1.5 plate for 1 ore, so 90 plate/min costs only
        // 60 ore/min, exactly the cap.
        let input = FactoryInput {
            recipes: vec![RecipeSpec {
                id: "smelt".to_string(),
                inputs: BTreeMap::from([("ore".to_string(), 1.0)]),
                outputs: BTreeMap::from([("plate".to_string(), 1.0)]),
                time_s: 1.0,
                machine: "furnace".to_string(),
            }],
            machines: vec![smelter(
                vec![ModuleSpec {
                    speed: 0.0,
                    prod: 0.5,
                }],
                Some(10.0),
            )],
            raw_caps: BTreeMap::from([("ore".to_string(), 60.0)]),
            target: TargetSpec {
                item: "plate".to_string(),
                rate_per_min: 90.0,
            },
        };

        match solve(input).unwrap() {
            FactoryReport::Feasible { crafts_per_min, .. } => {
                assert!((crafts_per_min["smelt"] - 60.0).abs() < 1e-6);
            }
            other => panic!("expected feasible, got {:?}", other),
        }
    }

    // ========================================================================
    // Phase 2
    // ========================================================================

    #[test]
    fn test_raw_cap_limits_target() {
        // Same factory, target 120/min: ore runs out at 90/min of plate.
        let input = FactoryInput {
            recipes: vec![RecipeSpec {
                id: "smelt".to_string(),
                inputs: BTreeMap::from([("ore".to_string(), 1.0)]),
                outputs: BTreeMap::from([("plate".to_string(), 1.0)]),
                time_s: 1.0,
                machine: "furnace".to_string(),
            }],
            machines: vec![smelter(
                vec![ModuleSpec {
                    speed: 0.0,
                    prod: 0.5,
                }],
                Some(10.0),
            )],
            raw_caps: BTreeMap::from([("ore".to_string(), 60.0)]),
            target: TargetSpec {
                item: "plate".to_string(),
                rate_per_min: 120.0,
            },
        };

        match solve(input).unwrap() {
            FactoryReport::Limited {
                max_feasible_target_per_min,
                crafts_per_min,
                bottlenecks,
                ..
            } => {
                assert!((max_feasible_target_per_min - 90.0).abs() < 1e-6);
                assert!((crafts_per_min["smelt"] - 60.0).abs() < 1e-6);
                assert_eq!(bottlenecks.raws, vec!["ore".to_string()]);
                assert!(bottlenecks.machines.is_empty());
            }
            other => panic!("expected limited, got {:?}", other),
        }
    }

    #[test]
    fn test_machine_cap_limits_target() {
        // One furnace at 60 crafts/min cannot deliver 120 plates/min.
        let input = FactoryInput {
            recipes: vec![RecipeSpec {
                id: "smelt".to_string(),
                inputs: BTreeMap::from([("ore".to_string(), 1.0)]),
                outputs: BTreeMap::from([("plate".to_string(), 1.0)]),
                time_s: 1.0,
                machine: "furnace".to_string(),
            }],
            machines: vec![smelter(Vec::new(), Some(1.0))],
            raw_caps: BTreeMap::from([("ore".to_string(), 1000.0)]),
            target: TargetSpec {
                item: "plate".to_string(),
                rate_per_min: 120.0,
            },
        };

        match solve(input).unwrap() {
            FactoryReport::Limited {
                max_feasible_target_per_min,
                bottlenecks,
                ..
            } => {
                assert!((max_feasible_target_per_min - 60.0).abs() < 1e-6);
                assert_eq!(bottlenecks.machines, vec!["furnace".to_string()]);
                assert!(bottlenecks.raws.is_empty());
            }
            other => panic!("expected limited, got {:?}", other),
        }
    }

    #[test]
    fn test_unproducible_target_maxes_at_zero() {
        let input = FactoryInput {
            recipes: vec![RecipeSpec {
                id: "smelt".to_string(),
                inputs: BTreeMap::from([("ore".to_string(), 1.0)]),
                outputs: BTreeMap::from([("plate".to_string(), 1.0)]),
                time_s: 1.0,
                machine: "furnace".to_string(),
            }],
            machines: vec![smelter(Vec::new(), Some(10.0))],
            raw_caps: BTreeMap::from([("ore".to_string(), 60.0)]),
            target: TargetSpec {
                item: "rocket".to_string(),
                rate_per_min: 1.0,
            },
        };

        match solve(input).unwrap() {
            FactoryReport::Limited {
                max_feasible_target_per_min,
                ..
            } => assert_eq!(max_feasible_target_per_min, 0.0),
            other => panic!("expected limited, got {:?}", other),
        }
    }

    #[test]
    fn test_byproduct_must_balance() {
        // Smelting emits slag with no consumer, so any positive rate is
        // infeasible and the achievable maximum is zero.
        let input = FactoryInput {
            recipes: vec![RecipeSpec {
                id: "smelt".to_string(),
                inputs: BTreeMap::from([("ore".to_string(), 1.0)]),
                outputs: BTreeMap::from([
                    ("plate".to_string(), 1.0),
                    ("slag".to_string(), 0.5),
                ]),
                time_s: 1.0,
                machine: "furnace".to_string(),
            }],
            machines: vec![smelter(Vec::new(), Some(10.0))],
            raw_caps: BTreeMap::from([("ore".to_string(), 60.0)]),
            target: TargetSpec {
                item: "plate".to_string(),
                rate_per_min: 30.0,
            },
        };

        match solve(input).unwrap() {
            FactoryReport::Limited {
                max_feasible_target_per_min,
                ..
            } => assert_eq!(max_feasible_target_per_min, 0.0),
            other => panic!("expected limited, got {:?}", other),
        }
    }

    #[test]
    fn test_byproduct_consumed_by_cycle() {
        // The slag loop turns the byproduct back into ore, restoring balance.
        let input = FactoryInput {
            recipes: vec![
                RecipeSpec {
                    id: "smelt".to_string(),
                    inputs: BTreeMap::from([("ore".to_string(), 1.0)]),
                    outputs: BTreeMap::from([
                        ("plate".to_string(), 1.0),
                        ("slag".to_string(), 0.5),
                    ]),
                    time_s: 1.0,
                    machine: "furnace".to_string(),
                },
                RecipeSpec {
                    id: "crush".to_string(),
                    inputs: BTreeMap::from([("slag".to_string(), 1.0)]),
                    outputs: BTreeMap::new(),
                    time_s: 1.0,
                    machine: "furnace".to_string(),
                },
            ],
            machines: vec![smelter(Vec::new(), Some(10.0))],
            raw_caps: BTreeMap::from([("ore".to_string(), 60.0)]),
            target: TargetSpec {
                item: "plate".to_string(),
                rate_per_min: 30.0,
            },
        };

        match solve(input).unwrap() {
            FactoryReport::Feasible { crafts_per_min, .. } => {
                assert!((crafts_per_min["smelt"] - 30.0).abs() < 1e-6);
                assert!((crafts_per_min["crush"] - 15.0).abs() < 1e-6);
            }
            other => panic!("expected feasible, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_target_rate_is_trivially_feasible() {
        let input = FactoryInput {
            recipes: Vec::new(),
            machines: Vec::new(),
            raw_caps: BTreeMap::new(),
            target: TargetSpec {
                item: "iron".to_string(),
                rate_per_min: 0.0,
            },
        };

        match solve(input).unwrap() {
            FactoryReport::Feasible {
                total_machines,
                crafts_per_min,
                ..
            } => {
                assert_eq!(total_machines, 0.0);
                assert!(crafts_per_min.is_empty());
            }
            other => panic!("expected feasible, got {:?}", other),
        }
    }
}
