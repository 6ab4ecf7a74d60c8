//! Property-based tests for the grade formula engine.
//!
//! These check properties that must hold for any roster: order
//! independence, determinism, clamping bounds and pending propagation.

use std::collections::{BTreeMap, BTreeSet};

use gradebook_core::aggregate::compute_roster_finals;
use gradebook_core::builder::generate_formula;
use gradebook_core::coverage::validate_coverage;
use gradebook_core::evaluator::evaluate_final_grade;
use gradebook_core::model::{AverageMode, ComponentValue, RosterEntry};
use proptest::collection::{btree_set, vec};
use proptest::option;
use proptest::prelude::*;

fn siglas(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("P{i}")).collect()
}

fn values(siglas: &[String], grades: &[f64]) -> Vec<ComponentValue> {
    siglas
        .iter()
        .zip(grades)
        .map(|(s, g)| ComponentValue::new(s.clone(), Some(*g)))
        .collect()
}

fn roster_strategy() -> impl Strategy<Value = Vec<RosterEntry>> {
    vec(vec(option::of(-5.0f64..15.0), 3), 0..30).prop_map(|rows| {
        let names = siglas(3);
        rows.into_iter()
            .enumerate()
            .map(|(i, grades)| RosterEntry {
                student_id: format!("s{i}"),
                name: None,
                component_values: names
                    .iter()
                    .cloned()
                    .zip(grades)
                    .collect::<BTreeMap<_, _>>(),
            })
            .collect()
    })
}

/// Splits 1000 at the given cut points into positive parts.
fn thousandths(cuts: &BTreeSet<u32>) -> Vec<u32> {
    let mut bounds = vec![0];
    bounds.extend(cuts.iter().copied());
    bounds.push(1000);
    bounds.windows(2).map(|w| w[1] - w[0]).collect()
}

proptest! {
    /// Shuffling the roster only shuffles the output.
    #[test]
    fn roster_order_does_not_change_grades(
        roster in roster_strategy(),
        seed in any::<u64>(),
    ) {
        let formula = "(P1 * 0.25) + (P2 * 0.25) + (P3 * 0.5)";
        let forward = compute_roster_finals(formula, &roster);

        let mut shuffled = roster.clone();
        // Deterministic rotation keyed by the seed.
        if !shuffled.is_empty() {
            let k = (seed as usize) % shuffled.len();
            shuffled.rotate_left(k);
            shuffled.reverse();
        }
        let permuted = compute_roster_finals(formula, &shuffled);

        prop_assert_eq!(forward.len(), roster.len());
        prop_assert_eq!(permuted.len(), roster.len());
        let by_id: BTreeMap<_, _> = forward
            .iter()
            .map(|f| (f.student_id.clone(), f.final_grade))
            .collect();
        for f in &permuted {
            prop_assert_eq!(by_id[&f.student_id], f.final_grade);
        }
    }

    /// Identical inputs always produce identical outputs.
    #[test]
    fn evaluation_is_deterministic(grades in vec(-20.0f64..20.0, 1..8)) {
        let names = siglas(grades.len());
        let formula = generate_formula(&names, AverageMode::Simple, None).unwrap();
        let v = values(&names, &grades);
        prop_assert_eq!(evaluate_final_grade(&formula, &v), evaluate_final_grade(&formula, &v));
    }

    /// A simple average of clamped inputs always lands in [0, 10].
    #[test]
    fn simple_average_stays_in_range(grades in vec(-1000.0f64..1000.0, 1..10)) {
        let names = siglas(grades.len());
        let formula = generate_formula(&names, AverageMode::Simple, None).unwrap();
        let grade = evaluate_final_grade(&formula, &values(&names, &grades));
        let grade = grade.expect("all components graded");
        prop_assert!((0.0..=10.0).contains(&grade), "grade {} out of range", grade);
    }

    /// The final grade never exceeds 10, whatever the formula multiplies by.
    #[test]
    fn final_grade_never_exceeds_ten(g in 0.0f64..10.0, factor in 0.0f64..100.0) {
        let formula = format!("P1 * {factor}");
        let v = vec![ComponentValue::new("P1", Some(g))];
        if let Some(grade) = evaluate_final_grade(&formula, &v) {
            prop_assert!(grade <= 10.0);
        }
    }

    /// All components at 10 give exactly 10 for simple and unit-sum weighted formulas.
    #[test]
    fn perfect_scores_give_ten(cuts in btree_set(1u32..1000, 0..6)) {
        let parts = thousandths(&cuts);
        let names = siglas(parts.len());
        let tens = vec![10.0; parts.len()];

        let simple = generate_formula(&names, AverageMode::Simple, None).unwrap();
        prop_assert_eq!(evaluate_final_grade(&simple, &values(&names, &tens)), Some(10.0));

        let weighted = names
            .iter()
            .zip(&parts)
            .map(|(s, p)| format!("({s} * {})", *p as f64 / 1000.0))
            .collect::<Vec<_>>()
            .join(" + ");
        prop_assert_eq!(evaluate_final_grade(&weighted, &values(&names, &tens)), Some(10.0));
    }

    /// Any missing component makes the grade pending.
    #[test]
    fn one_missing_grade_blocks(
        grades in vec(0.0f64..10.0, 2..8),
        missing in any::<prop::sample::Index>(),
    ) {
        let names = siglas(grades.len());
        let formula = generate_formula(&names, AverageMode::Simple, None).unwrap();
        let mut v = values(&names, &grades);
        v[missing.index(grades.len())].value = None;
        prop_assert_eq!(evaluate_final_grade(&formula, &v), None);
    }

    /// Built formulas never trip the coverage check, and weights stay near 1.
    #[test]
    fn built_weighted_formulas_are_covered(weights in vec(0.5f64..100.0, 1..8)) {
        let names = siglas(weights.len());
        let formula = generate_formula(&names, AverageMode::Weighted, Some(&weights)).unwrap();
        let report = validate_coverage(&formula, &names);
        prop_assert!(report.is_clean(), "{:?}", report);

        let sum: f64 = formula
            .split(" + ")
            .filter_map(|term| term.trim_end_matches(')').rsplit(' ').next())
            .map(|w| w.parse::<f64>().unwrap())
            .sum();
        prop_assert!((sum - 1.0).abs() < 0.005 * weights.len() as f64, "sum {}", sum);
    }
}
