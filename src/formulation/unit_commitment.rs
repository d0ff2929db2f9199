// Generator unit commitment: choose which generators run and how much each
// produces so that total output meets demand at minimum fixed plus variable cost.
//
//   minimize   Σ_g fixed_cost[g]·u[g] + var_cost[g]·p[g]
//   subject to p[g] <= capacity[g]·u[g]      for every g
//              Σ_g p[g] == demand
//              u[g] ∈ {0, 1}, p[g] >= 0

use std::fmt::Write as _;

use indexmap::IndexMap;

use super::{Formulation, OptimizationModel, NOT_SOLVED};
use crate::domain::{solver_service::SolverError, value_objects::OptimizationType};
use crate::model::{LinearExpr, Model, ModelError, VariableDomain};

pub const GENERATORS: &str = "GENERATORS";
pub const FIXED_COST: &str = "fixed_cost";
pub const VAR_COST: &str = "var_cost";
pub const CAPACITY: &str = "capacity";
pub const COMMITMENT: &str = "u";
pub const POWER: &str = "p";
pub const OBJECTIVE: &str = "obj";
pub const CAPACITY_CONSTRAINT: &str = "capacity_constraint";
pub const DEMAND_CONSTRAINT: &str = "demand_constraint";

/// Cost and size of one generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorData {
    /// Cost of running the unit at all
    pub fixed_cost: f64,
    /// Cost per MW produced
    pub var_cost: f64,
    /// Maximum output in MW
    pub capacity: f64,
}

impl GeneratorData {
    pub fn new(fixed_cost: f64, var_cost: f64, capacity: f64) -> Self {
        Self {
            fixed_cost,
            var_cost,
            capacity,
        }
    }
}

/// Problem data of a unit commitment instance.
///
/// Inputs are taken as given; a generator without an entry in `gen_data` surfaces
/// as [`ModelError::MissingParameterValue`] when the model is built, and entries
/// for generators outside `generators` are ignored.
#[derive(Debug, Clone)]
pub struct UnitCommitment {
    generators: Vec<String>,
    gen_data: IndexMap<String, GeneratorData>,
    demand: f64,
}

/// Unit commitment wrapped in the model lifecycle
pub type GeneratorCommitment = OptimizationModel<UnitCommitment>;

impl UnitCommitment {
    pub fn new<I, S>(generators: I, gen_data: IndexMap<String, GeneratorData>, demand: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            generators: generators.into_iter().map(Into::into).collect(),
            gen_data,
            demand,
        }
    }

    /// Wrap this instance in the lifecycle, locating `solver_name` immediately
    pub fn into_model(self, solver_name: &str) -> Result<GeneratorCommitment, SolverError> {
        OptimizationModel::new(self, solver_name)
    }

    pub fn generators(&self) -> &[String] {
        &self.generators
    }

    pub fn gen_data(&self) -> &IndexMap<String, GeneratorData> {
        &self.gen_data
    }

    /// Total system demand in MW
    pub fn demand(&self) -> f64 {
        self.demand
    }
}

impl Formulation for UnitCommitment {
    fn name(&self) -> &str {
        "UnitCommitment"
    }

    fn declare_sets_and_params(&self, model: &mut Model) -> Result<(), ModelError> {
        model.add_set(GENERATORS, self.generators.iter().cloned())?;

        let fields: [(&str, fn(&GeneratorData) -> f64); 3] = [
            (FIXED_COST, |d: &GeneratorData| d.fixed_cost),
            (VAR_COST, |d: &GeneratorData| d.var_cost),
            (CAPACITY, |d: &GeneratorData| d.capacity),
        ];
        for (name, field) in fields {
            model.add_indexed_param(name, GENERATORS, |g| self.gen_data.get(g).map(field))?;
        }
        Ok(())
    }

    fn declare_variables(&self, model: &mut Model) -> Result<(), ModelError> {
        model.add_indexed_var(COMMITMENT, GENERATORS, VariableDomain::Binary)?;
        model.add_indexed_var(POWER, GENERATORS, VariableDomain::NonNegativeReals)
    }

    fn declare_objective(&self, model: &mut Model) -> Result<(), ModelError> {
        let cost = model
            .set(GENERATORS)?
            .elements()
            .map(|g| -> Result<LinearExpr, ModelError> {
                Ok(model.param(FIXED_COST, g)? * model.var(COMMITMENT, g)?
                    + model.param(VAR_COST, g)? * model.var(POWER, g)?)
            })
            .sum::<Result<LinearExpr, ModelError>>()?;
        model.set_objective(OBJECTIVE, cost, OptimizationType::Minimize)
    }

    fn declare_constraints(&self, model: &mut Model) -> Result<(), ModelError> {
        model.add_indexed_constraints(CAPACITY_CONSTRAINT, GENERATORS, |m, g| {
            let power = LinearExpr::from(m.var(POWER, g)?);
            Ok(power.leq(m.param(CAPACITY, g)? * m.var(COMMITMENT, g)?))
        })?;

        let total_output = model
            .set(GENERATORS)?
            .elements()
            .map(|g| model.var(POWER, g))
            .sum::<Result<LinearExpr, ModelError>>()?;
        model.add_constraint(DEMAND_CONSTRAINT, total_output.equals(self.demand))
    }
}

/// Solved state of one generator
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorDispatch {
    pub name: String,
    /// Commitment rounded to on/off
    pub committed: bool,
    /// Output in MW
    pub power: f64,
    /// Capacity in MW
    pub capacity: f64,
}

impl OptimizationModel<UnitCommitment> {
    /// Per-generator commitment and output, `None` unless the last solve was optimal
    pub fn dispatch(&self) -> Option<Vec<GeneratorDispatch>> {
        let model = self.model();
        model
            .set(GENERATORS)
            .ok()?
            .elements()
            .map(|g| {
                Some(GeneratorDispatch {
                    name: g.to_string(),
                    committed: model.variable_value(COMMITMENT, Some(g))?.round() >= 1.0,
                    power: model.variable_value(POWER, Some(g))?,
                    capacity: model.param(CAPACITY, g).ok()?,
                })
            })
            .collect()
    }

    /// Status, total cost, generator table and duals as printable text
    pub fn results_report(&self) -> String {
        if self.solution().is_none() {
            return NOT_SOLVED.to_string();
        }

        let mut out = self.solver_status_report();
        let total = self
            .objective_value()
            .map_or_else(|| "unavailable".to_string(), |v| format!("${}", format_money(v)));
        let _ = write!(out, "\n\nTotal Cost: {}\n\nGenerator Status:", total);

        match self.dispatch() {
            Some(dispatch) => {
                for unit in dispatch {
                    let _ = write!(
                        out,
                        "\n  {}: on={}, power={:.1}/{:.0} MW",
                        unit.name,
                        u8::from(unit.committed),
                        unit.power,
                        unit.capacity
                    );
                }
            }
            None => out.push_str("\n  unavailable"),
        }

        let _ = write!(out, "\n\n{}", self.constraint_duals_report());
        out
    }

    pub fn print_results(&self) {
        println!("{}", self.results_report());
    }
}

/// `1234567.891` -> `1,234,567.89`
fn format_money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, cents)
}
