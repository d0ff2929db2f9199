// Model lifecycle shared by every formulation
//
// A Formulation supplies four declare stages; OptimizationModel owns the Model they
// populate, runs the stages in order, hands the finished model to a SolverService
// and keeps the latest Solution.
//
//   Unbuilt --build--> Built --solve--> Solved --solve--> Solved

pub mod unit_commitment;

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{
    program::{Solution, SolverConfig},
    solver_service::{SolverError, SolverService},
};
use crate::model::{components::Label, Model, ModelError};
use crate::solver::SolverFactory;

pub use unit_commitment::{GeneratorCommitment, GeneratorData, GeneratorDispatch, UnitCommitment};

/// Message reported by every query that needs a solve first
pub const NOT_SOLVED: &str = "Model not solved yet.";

/// Errors surfaced by [`OptimizationModel::solve`]
#[derive(Debug, thiserror::Error)]
pub enum OptimizationError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// The four declare stages of a concrete problem.
///
/// Stages run in declaration order and may only reference components declared by
/// earlier stages: sets and parameters, then variables, then the objective, then
/// constraints.
pub trait Formulation {
    /// Name given to the model built from this formulation
    fn name(&self) -> &str;

    fn declare_sets_and_params(&self, model: &mut Model) -> Result<(), ModelError>;

    fn declare_variables(&self, model: &mut Model) -> Result<(), ModelError>;

    fn declare_objective(&self, model: &mut Model) -> Result<(), ModelError>;

    fn declare_constraints(&self, model: &mut Model) -> Result<(), ModelError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    Unbuilt,
    Built,
    Solved,
}

/// A formulation together with its model, solver and latest result
pub struct OptimizationModel<F: Formulation> {
    formulation: F,
    solver: Arc<dyn SolverService>,
    model: Model,
    state: ModelState,
    result: Option<Solution>,
}

impl<F: Formulation> OptimizationModel<F> {
    /// Wrap `formulation`, locating the named solver immediately.
    ///
    /// Fails with [`SolverError::SolverNotAvailable`] when the solver is unknown or
    /// not compiled into this build; no model is created in that case.
    pub fn new(formulation: F, solver_name: &str) -> Result<Self, SolverError> {
        let solver = SolverFactory::from_name(solver_name)?;
        Ok(Self::with_solver(formulation, solver))
    }

    /// Wrap `formulation` with an already constructed solver service
    pub fn with_solver(formulation: F, solver: Arc<dyn SolverService>) -> Self {
        let model = Model::new(formulation.name());
        Self {
            formulation,
            solver,
            model,
            state: ModelState::Unbuilt,
            result: None,
        }
    }

    pub fn formulation(&self) -> &F {
        &self.formulation
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn is_built(&self) -> bool {
        self.state != ModelState::Unbuilt
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    /// Latest solver response, `None` before the first solve
    pub fn solution(&self) -> Option<&Solution> {
        self.result.as_ref()
    }

    /// Run the four declare stages in order.
    ///
    /// A model is built at most once: a second call fails with
    /// [`ModelError::AlreadyBuilt`]. If a stage fails, the partial model is
    /// discarded and the state stays `Unbuilt`.
    pub fn build(&mut self) -> Result<&mut Self, ModelError> {
        if self.is_built() {
            return Err(ModelError::AlreadyBuilt(self.model.name().to_string()));
        }

        if let Err(err) = self.run_stages() {
            self.model = Model::new(self.formulation.name());
            return Err(err);
        }

        self.state = ModelState::Built;
        info!(
            model = self.model.name(),
            variables = self.model.variables().map(|v| v.len()).sum::<usize>(),
            constraints = self.model.num_constraints(),
            "model built"
        );
        Ok(self)
    }

    fn run_stages(&mut self) -> Result<(), ModelError> {
        let model = &mut self.model;
        debug!(model = model.name(), "declaring sets and parameters");
        self.formulation.declare_sets_and_params(model)?;
        debug!(model = model.name(), "declaring variables");
        self.formulation.declare_variables(model)?;
        debug!(model = model.name(), "declaring objective");
        self.formulation.declare_objective(model)?;
        debug!(model = model.name(), "declaring constraints");
        self.formulation.declare_constraints(model)
    }

    /// Build if needed, then solve with the configured backend.
    ///
    /// Infeasible and unbounded outcomes are not errors; they are recorded in the
    /// stored [`Solution`]. Each call replaces the previous result.
    pub fn solve(&mut self, verbose: bool) -> Result<&mut Self, OptimizationError> {
        if !self.is_built() {
            self.build()?;
        }

        let config = SolverConfig {
            verbose,
            compute_duals: self.solver.supports_duals(),
        };
        let program = self.model.to_program()?.with_config(config);
        info!(
            model = self.model.name(),
            solver = self.solver.name(),
            columns = program.num_columns(),
            rows = program.rows.len(),
            "solving"
        );

        let solution = self.solver.solve(&program)?;
        self.model.load_solution(&solution);
        if solution.is_optimal() {
            info!(
                model = self.model.name(),
                objective = ?solution.objective_value,
                elapsed_ms = solution.statistics.solve_time_ms,
                "solved"
            );
        } else {
            warn!(model = self.model.name(), status = %solution.status, "solve finished without an optimum");
        }

        self.result = Some(solution);
        self.state = ModelState::Solved;
        Ok(self)
    }

    /// Objective of the latest solve, `None` unless it was optimal
    pub fn objective_value(&self) -> Option<f64> {
        self.result
            .as_ref()
            .filter(|s| s.is_optimal())
            .and_then(|s| s.objective_value)
    }

    /// Solved value of a variable entry (`index` is `None` for scalars)
    pub fn variable_value(&self, name: &str, index: Option<&str>) -> Option<f64> {
        self.model.variable_value(name, index)
    }

    /// Dual of a constraint entry, when the backend reported duals
    pub fn dual(&self, group: &str, index: Option<&str>) -> Option<f64> {
        self.model.dual(group, index)
    }

    pub fn solver_status_report(&self) -> String {
        let Some(solution) = &self.result else {
            return NOT_SOLVED.to_string();
        };
        let stats = &solution.statistics;
        let objective = solution
            .objective_value
            .map_or_else(|| "unavailable".to_string(), |v| v.to_string());

        let mut out = String::new();
        let _ = writeln!(out, "Solver: {}", self.solver.name());
        let _ = writeln!(out, "Status: {}", solution.status);
        let _ = writeln!(out, "Message: {}", solution.message);
        let _ = writeln!(out, "Objective: {}", objective);
        let _ = writeln!(
            out,
            "Variables: {} ({} binary, {} integer)",
            stats.num_variables, stats.num_binary_vars, stats.num_integer_vars
        );
        let _ = writeln!(out, "Constraints: {}", stats.num_constraints);
        let _ = write!(out, "Solve time: {:.3} ms", stats.solve_time_ms);
        out
    }

    pub fn print_solver_status(&self) {
        println!("{}", self.solver_status_report());
    }

    pub fn constraint_duals_report(&self) -> String {
        if self.result.is_none() {
            return NOT_SOLVED.to_string();
        }

        let mut out = String::from("Constraint Duals (Shadow Prices):");
        for group in self.model.constraint_groups() {
            for (index, _, dual) in group.iter() {
                let label = Label(group.name(), index);
                let _ = match dual {
                    Some(value) => write!(out, "\n  {} = {}", label, value),
                    None => write!(out, "\n  {} = unavailable", label),
                };
            }
        }
        out
    }

    pub fn print_constraint_duals(&self) {
        println!("\n{}", self.constraint_duals_report());
    }
}
