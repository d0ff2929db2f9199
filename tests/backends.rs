// Unit commitment solved through the native backends, one module per feature.

#![cfg(any(feature = "highs", feature = "coin_cbc"))]

use indexmap::IndexMap;
use unitopt::{GeneratorCommitment, GeneratorData, SolutionStatus, UnitCommitment};

const TOLERANCE: f64 = 1e-6;

fn two_generators() -> IndexMap<String, GeneratorData> {
    IndexMap::from([
        ("G1".to_string(), GeneratorData::new(100.0, 20.0, 50.0)),
        ("G2".to_string(), GeneratorData::new(150.0, 10.0, 100.0)),
    ])
}

fn solved(solver: &str, demand: f64, verbose: bool) -> GeneratorCommitment {
    let mut model = UnitCommitment::new(["G1", "G2"], two_generators(), demand)
        .into_model(solver)
        .expect("backend is compiled in");
    model.solve(verbose).expect("solve should not error");
    model
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[cfg(feature = "highs")]
mod highs {
    use super::*;

    #[test]
    fn commitment_duals_price_demand_at_the_marginal_unit() {
        let model = solved("highs", 130.0, false);

        assert_close(model.objective_value().unwrap(), 1850.0);
        assert_close(model.variable_value("u", Some("G1")).unwrap(), 1.0);
        // both units committed; G1 is the one with room left, so it sets the price
        assert_close(model.dual("demand_constraint", None).unwrap(), 20.0);
        assert!(model.dual("capacity_constraint", Some("G1")).is_some());
        assert!(model.dual("capacity_constraint", Some("G2")).is_some());

        let report = model.constraint_duals_report();
        assert!(report.starts_with("Constraint Duals (Shadow Prices):"), "{}", report);
        assert!(report.contains("demand_constraint = "), "{}", report);
        assert!(report.contains("capacity_constraint[G1] = "), "{}", report);
        assert!(!report.contains("unavailable"), "{}", report);
    }

    #[test]
    fn low_demand_is_priced_by_the_only_running_unit() {
        let model = solved("highs", 80.0, true);

        assert_close(model.objective_value().unwrap(), 950.0);
        assert_close(model.variable_value("u", Some("G1")).unwrap(), 0.0);
        assert_close(model.dual("demand_constraint", None).unwrap(), 10.0);
    }

    #[test]
    fn infeasible_demand_has_no_duals() {
        let model = solved("highs", 151.0, false);

        assert_eq!(model.solution().unwrap().status, SolutionStatus::Infeasible);
        assert_eq!(model.objective_value(), None);
        assert_eq!(model.dual("demand_constraint", None), None);
        assert!(model
            .constraint_duals_report()
            .contains("demand_constraint = unavailable"));
    }
}

#[cfg(feature = "coin_cbc")]
mod cbc {
    use super::*;

    #[test]
    fn low_demand_commits_only_the_cheap_unit() {
        let model = solved("cbc", 80.0, false);

        assert_eq!(model.solver_name(), "COIN-OR CBC");
        assert_close(model.objective_value().unwrap(), 950.0);
        assert_close(model.variable_value("u", Some("G1")).unwrap(), 0.0);
        assert_close(model.variable_value("p", Some("G2")).unwrap(), 80.0);
        // CBC reports no duals
        assert_eq!(model.dual("demand_constraint", None), None);
    }

    #[test]
    fn verbose_solve_reaches_the_same_answer() {
        let model = solved("cbc", 80.0, true);
        assert_close(model.objective_value().unwrap(), 950.0);
    }

    #[test]
    fn demand_above_capacity_is_infeasible() {
        let model = solved("cbc", 151.0, false);

        assert_eq!(model.solution().unwrap().status, SolutionStatus::Infeasible);
        assert_eq!(model.objective_value(), None);
        assert_eq!(model.dispatch(), None);
    }
}
