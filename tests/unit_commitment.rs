// End-to-end unit commitment solves against the pure Rust backend.

#![cfg(feature = "microlp")]

use indexmap::IndexMap;
use proptest::prelude::*;
use unitopt::{
    GeneratorCommitment, GeneratorData, ModelState, SolutionStatus, SolverError, UnitCommitment,
};

const TOLERANCE: f64 = 1e-6;

fn two_generators() -> IndexMap<String, GeneratorData> {
    IndexMap::from([
        ("G1".to_string(), GeneratorData::new(100.0, 20.0, 50.0)),
        ("G2".to_string(), GeneratorData::new(150.0, 10.0, 100.0)),
    ])
}

fn solved(generators: &[&str], gen_data: IndexMap<String, GeneratorData>, demand: f64) -> GeneratorCommitment {
    let mut model = UnitCommitment::new(generators.iter().copied(), gen_data, demand)
        .into_model("microlp")
        .expect("microlp is compiled in");
    model.solve(false).expect("solve should not error");
    model
}

fn value(model: &GeneratorCommitment, var: &str, generator: &str) -> f64 {
    model.variable_value(var, Some(generator)).unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn low_demand_commits_only_the_cheap_unit() {
    let model = solved(&["G1", "G2"], two_generators(), 80.0);

    assert_eq!(model.state(), ModelState::Solved);
    assert_eq!(model.solution().unwrap().status, SolutionStatus::Optimal);
    assert_close(model.objective_value().unwrap(), 950.0);
    assert_close(value(&model, "u", "G1"), 0.0);
    assert_close(value(&model, "u", "G2"), 1.0);
    assert_close(value(&model, "p", "G1"), 0.0);
    assert_close(value(&model, "p", "G2"), 80.0);
}

#[test]
fn high_demand_commits_both_units() {
    let model = solved(&["G1", "G2"], two_generators(), 130.0);

    assert_close(model.objective_value().unwrap(), 1850.0);
    assert_close(value(&model, "u", "G1"), 1.0);
    assert_close(value(&model, "u", "G2"), 1.0);
    assert_close(value(&model, "p", "G1"), 30.0);
    assert_close(value(&model, "p", "G2"), 100.0);

    let dispatch = model.dispatch().unwrap();
    assert!(dispatch.iter().all(|unit| unit.committed));
    let report = model.results_report();
    assert!(report.contains("Total Cost: $1,850.00"), "{}", report);
}

#[test]
fn demand_above_capacity_is_infeasible() {
    let model = solved(&["G1", "G2"], two_generators(), 151.0);

    assert_eq!(model.solution().unwrap().status, SolutionStatus::Infeasible);
    assert_eq!(model.objective_value(), None);
    assert_eq!(model.dispatch(), None);
    assert!(model.results_report().contains("Total Cost: unavailable"));
}

#[test]
fn unavailable_solver_fails_before_any_model_exists() {
    let err = UnitCommitment::new(["G1", "G2"], two_generators(), 80.0)
        .into_model("glpk")
        .err()
        .unwrap();
    assert!(matches!(err, SolverError::SolverNotAvailable(_)));
}

#[test]
fn objective_is_unavailable_before_solving() {
    let mut model = UnitCommitment::new(["G1", "G2"], two_generators(), 80.0)
        .into_model("microlp")
        .unwrap();
    assert_eq!(model.objective_value(), None);

    model.build().unwrap();
    assert_eq!(model.objective_value(), None);
    assert_eq!(model.results_report(), "Model not solved yet.");
}

#[test]
fn resolving_keeps_the_same_answer() {
    let mut model = solved(&["G1", "G2"], two_generators(), 80.0);
    model.solve(false).unwrap();
    assert_close(model.objective_value().unwrap(), 950.0);
}

fn generator_fleet() -> impl Strategy<Value = Vec<GeneratorData>> {
    prop::collection::vec(
        (1.0..200.0f64, 1.0..50.0f64, 1.0..100.0f64)
            .prop_map(|(fixed, var, cap)| GeneratorData::new(fixed, var, cap)),
        1..4,
    )
}

fn fleet_model(fleet: &[GeneratorData], demand: f64) -> GeneratorCommitment {
    let names: Vec<String> = (0..fleet.len()).map(|i| format!("G{}", i + 1)).collect();
    let gen_data: IndexMap<String, GeneratorData> =
        names.iter().cloned().zip(fleet.iter().copied()).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    solved(&refs, gen_data, demand)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn feasible_demand_is_met_exactly(fleet in generator_fleet(), share in 0.0..1.0f64) {
        let total: f64 = fleet.iter().map(|g| g.capacity).sum();
        let demand = total * share;
        let model = fleet_model(&fleet, demand);

        prop_assert_eq!(model.solution().unwrap().status, SolutionStatus::Optimal);
        let dispatch = model.dispatch().unwrap();
        let output: f64 = dispatch.iter().map(|unit| unit.power).sum();
        prop_assert!((output - demand).abs() < 1e-5, "output {} != demand {}", output, demand);

        for unit in &dispatch {
            if !unit.committed {
                prop_assert!(unit.power.abs() < 1e-5, "{} idle but produces {}", unit.name, unit.power);
            }
            prop_assert!(unit.power <= unit.capacity + 1e-5);
        }
    }

    #[test]
    fn cost_never_falls_as_demand_rises(
        fleet in generator_fleet(),
        low in 0.0..1.0f64,
        extra in 0.0..1.0f64,
    ) {
        let total: f64 = fleet.iter().map(|g| g.capacity).sum();
        let low_demand = total * low;
        let high_demand = low_demand + (total - low_demand) * extra;

        let low_cost = fleet_model(&fleet, low_demand).objective_value().unwrap();
        let high_cost = fleet_model(&fleet, high_demand).objective_value().unwrap();
        prop_assert!(
            high_cost >= low_cost - 1e-6 * (1.0 + low_cost.abs()),
            "demand {} costs {} but {} costs {}",
            low_demand, low_cost, high_demand, high_cost
        );
    }
}
