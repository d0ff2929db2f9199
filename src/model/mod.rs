// Algebraic model: named sets, parameters, variables, one objective and
// constraint groups, lowered into a LinearProgram for the solver.
//
// Components must be declared before anything references them. Declarations check
// that the indexing set exists, and expressions check that every variable handle was
// issued by this model, so an out-of-order build fails with a ModelError instead of
// producing a malformed program.

pub mod components;
pub mod expr;

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use tracing::debug;

use crate::domain::program::{LinearProgram, ObjectiveFunction, Row, Solution};
use crate::domain::value_objects::OptimizationType;

pub use components::{
    ConstraintGroup, Index, Objective, Parameter, Set, Variable, VariableDomain,
};
pub use expr::{LinearConstraint, LinearExpr, VarRef};

use components::{Label, VariableEntry};

/// Structural errors raised while declaring or lowering a model
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Set '{0}' has not been declared")]
    UndeclaredSet(String),

    #[error("Parameter '{0}' has not been declared")]
    UndeclaredParameter(String),

    #[error("Variable '{0}' has not been declared")]
    UndeclaredVariable(String),

    #[error("'{element}' is not an index of '{component}'")]
    UnknownElement { component: String, element: String },

    #[error("'{0}' is indexed and needs an element")]
    ScalarIndexMismatch(String),

    #[error("A component named '{0}' already exists")]
    DuplicateComponent(String),

    #[error("Element '{element}' appears more than once in set '{set}'")]
    DuplicateElement { set: String, element: String },

    #[error("No value for parameter '{parameter}' at '{element}'")]
    MissingParameterValue { parameter: String, element: String },

    #[error("Model '{0}' has no objective")]
    MissingObjective(String),

    #[error("Model '{0}' has already been built")]
    AlreadyBuilt(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

/// Mutable aggregate populated by a formulation's declare stages
#[derive(Debug, Clone)]
pub struct Model {
    id: u64,
    name: String,
    sets: IndexMap<String, Set>,
    parameters: IndexMap<String, Parameter>,
    variables: IndexMap<String, Variable>,
    objective: Option<Objective>,
    constraints: IndexMap<String, ConstraintGroup>,
    num_columns: usize,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            sets: IndexMap::new(),
            parameters: IndexMap::new(),
            variables: IndexMap::new(),
            objective: None,
            constraints: IndexMap::new(),
            num_columns: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True until the first component is declared
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
            && self.parameters.is_empty()
            && self.variables.is_empty()
            && self.objective.is_none()
            && self.constraints.is_empty()
    }

    fn ensure_unique(&self, name: &str) -> Result<()> {
        let taken = self.sets.contains_key(name)
            || self.parameters.contains_key(name)
            || self.variables.contains_key(name)
            || self.constraints.contains_key(name)
            || self.objective.as_ref().is_some_and(|o| o.name == name);
        if taken {
            Err(ModelError::DuplicateComponent(name.to_string()))
        } else {
            Ok(())
        }
    }

    /// Reject handles issued by another model, even when their column exists here
    fn ensure_columns(&self, expr: &LinearExpr) -> Result<()> {
        let foreign = expr
            .terms()
            .iter()
            .find(|(v, _)| v.model() != self.id || v.column() >= self.num_columns);
        match foreign {
            Some((var, _)) => Err(ModelError::UndeclaredVariable(format!(
                "column {} of another model",
                var.column()
            ))),
            None => Ok(()),
        }
    }

    // Sets

    pub fn add_set<I, S>(&mut self, name: &str, elements: I) -> Result<&Set>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_unique(name)?;
        let set = Set::new(name, elements)?;
        debug!(set = name, size = set.len(), "declared set");
        Ok(self.sets.entry(name.to_string()).or_insert(set))
    }

    pub fn set(&self, name: &str) -> Result<&Set> {
        self.sets
            .get(name)
            .ok_or_else(|| ModelError::UndeclaredSet(name.to_string()))
    }

    pub fn sets(&self) -> impl Iterator<Item = &Set> + '_ {
        self.sets.values()
    }

    // Parameters

    /// Declare a parameter over `set`, reading each element's value from `lookup`.
    /// Values the lookup knows for elements outside the set are never asked for.
    pub fn add_indexed_param<F>(&mut self, name: &str, set: &str, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<f64>,
    {
        self.ensure_unique(name)?;
        let values = self
            .set(set)?
            .elements()
            .map(|element| {
                lookup(element)
                    .map(|value| (Some(element.to_string()), value))
                    .ok_or_else(|| ModelError::MissingParameterValue {
                        parameter: name.to_string(),
                        element: element.to_string(),
                    })
            })
            .collect::<Result<IndexMap<_, _>>>()?;

        self.parameters.insert(
            name.to_string(),
            Parameter {
                name: name.to_string(),
                set: Some(set.to_string()),
                values,
            },
        );
        Ok(())
    }

    pub fn add_scalar_param(&mut self, name: &str, value: f64) -> Result<()> {
        self.ensure_unique(name)?;
        self.parameters.insert(
            name.to_string(),
            Parameter {
                name: name.to_string(),
                set: None,
                values: IndexMap::from([(None, value)]),
            },
        );
        Ok(())
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// Value of an indexed parameter at `element`
    pub fn param(&self, name: &str, element: &str) -> Result<f64> {
        let parameter = self
            .parameters
            .get(name)
            .ok_or_else(|| ModelError::UndeclaredParameter(name.to_string()))?;
        parameter
            .get(Some(element))
            .ok_or_else(|| ModelError::UnknownElement {
                component: name.to_string(),
                element: element.to_string(),
            })
    }

    pub fn scalar_param(&self, name: &str) -> Result<f64> {
        let parameter = self
            .parameters
            .get(name)
            .ok_or_else(|| ModelError::UndeclaredParameter(name.to_string()))?;
        parameter
            .get(None)
            .ok_or_else(|| ModelError::ScalarIndexMismatch(name.to_string()))
    }

    // Variables

    fn insert_variable(&mut self, name: &str, set: Option<&str>, domain: VariableDomain, indices: Vec<Index>) {
        let mut entries = IndexMap::with_capacity(indices.len());
        for index in indices {
            entries.insert(
                index,
                VariableEntry {
                    var: VarRef::new(self.id, self.num_columns),
                    value: None,
                },
            );
            self.num_columns += 1;
        }
        debug!(variable = name, entries = entries.len(), ?domain, "declared variable");
        self.variables.insert(
            name.to_string(),
            Variable {
                name: name.to_string(),
                set: set.map(str::to_string),
                domain,
                entries,
            },
        );
    }

    pub fn add_indexed_var(&mut self, name: &str, set: &str, domain: VariableDomain) -> Result<()> {
        self.ensure_unique(name)?;
        let indices = self
            .set(set)?
            .elements()
            .map(|e| Some(e.to_string()))
            .collect();
        self.insert_variable(name, Some(set), domain, indices);
        Ok(())
    }

    pub fn add_scalar_var(&mut self, name: &str, domain: VariableDomain) -> Result<VarRef> {
        self.ensure_unique(name)?;
        let var = VarRef::new(self.id, self.num_columns);
        self.insert_variable(name, None, domain, vec![None]);
        Ok(var)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.variables.values()
    }

    /// Handle to the entry of an indexed variable at `element`
    pub fn var(&self, name: &str, element: &str) -> Result<VarRef> {
        let variable = self
            .variables
            .get(name)
            .ok_or_else(|| ModelError::UndeclaredVariable(name.to_string()))?;
        variable
            .get(Some(element))
            .ok_or_else(|| ModelError::UnknownElement {
                component: name.to_string(),
                element: element.to_string(),
            })
    }

    pub fn scalar_var(&self, name: &str) -> Result<VarRef> {
        let variable = self
            .variables
            .get(name)
            .ok_or_else(|| ModelError::UndeclaredVariable(name.to_string()))?;
        variable
            .get(None)
            .ok_or_else(|| ModelError::ScalarIndexMismatch(name.to_string()))
    }

    /// Solved value of a variable entry, `None` before an optimal solve
    pub fn variable_value(&self, name: &str, index: Option<&str>) -> Option<f64> {
        self.variables.get(name)?.value(index)
    }

    // Objective

    pub fn set_objective(&mut self, name: &str, expr: LinearExpr, sense: OptimizationType) -> Result<()> {
        if self.objective.is_some() {
            return Err(ModelError::DuplicateComponent(name.to_string()));
        }
        self.ensure_unique(name)?;
        self.ensure_columns(&expr)?;
        debug!(objective = name, %sense, terms = expr.terms().len(), "declared objective");
        self.objective = Some(Objective {
            name: name.to_string(),
            expr,
            sense,
        });
        Ok(())
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    // Constraints

    pub fn add_constraint(&mut self, name: &str, constraint: LinearConstraint) -> Result<()> {
        self.ensure_unique(name)?;
        self.ensure_columns(constraint.expr())?;
        let mut group = ConstraintGroup::new(name, None);
        group.insert(None, constraint);
        debug!(constraint = name, "declared constraint");
        self.constraints.insert(name.to_string(), group);
        Ok(())
    }

    /// Declare one constraint per element of `set`, each produced by `rule`
    pub fn add_indexed_constraints<F>(&mut self, name: &str, set: &str, mut rule: F) -> Result<()>
    where
        F: FnMut(&Model, &str) -> Result<LinearConstraint>,
    {
        self.ensure_unique(name)?;
        let elements: Vec<String> = self.set(set)?.elements().map(str::to_string).collect();

        let mut group = ConstraintGroup::new(name, Some(set));
        for element in elements {
            let constraint = rule(self, &element)?;
            self.ensure_columns(constraint.expr())?;
            group.insert(Some(element), constraint);
        }
        debug!(constraint = name, entries = group.len(), "declared constraint group");
        self.constraints.insert(name.to_string(), group);
        Ok(())
    }

    pub fn constraint_group(&self, name: &str) -> Option<&ConstraintGroup> {
        self.constraints.get(name)
    }

    pub fn constraint_groups(&self) -> impl Iterator<Item = &ConstraintGroup> + '_ {
        self.constraints.values()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.values().map(ConstraintGroup::len).sum()
    }

    /// Dual of one constraint entry from the latest solve
    pub fn dual(&self, group: &str, index: Option<&str>) -> Option<f64> {
        self.constraints.get(group)?.dual(index)
    }

    // Lowering

    /// Flatten the model into a program with one column per variable entry and
    /// one row per constraint entry, both in declaration order.
    pub fn to_program(&self) -> Result<LinearProgram> {
        let objective = self
            .objective
            .as_ref()
            .ok_or_else(|| ModelError::MissingObjective(self.name.clone()))?;

        let mut columns = Vec::with_capacity(self.num_columns);
        for variable in self.variables.values() {
            for (index, entry) in &variable.entries {
                debug_assert_eq!(entry.var.column(), columns.len());
                let label = Label(&variable.name, index.as_deref()).to_string();
                columns.push(variable.domain.column(label));
            }
        }

        let function = ObjectiveFunction::new(objective.sense, objective.expr.collapsed())
            .with_constant(objective.expr.constant_value());

        let mut program = LinearProgram::new(function)
            .with_name(self.name.clone())
            .with_columns(columns);
        for group in self.constraints.values() {
            for (index, entry) in &group.entries {
                let label = Label(&group.name, index.as_deref()).to_string();
                let constraint = &entry.constraint;
                program = program.add_row(Row::new(
                    label,
                    constraint.relation(),
                    constraint.expr().collapsed(),
                    constraint.rhs(),
                ));
            }
        }
        Ok(program)
    }

    /// Replace loaded values and duals with those of `solution`.
    ///
    /// Values are only loaded from an optimal solution covering every column;
    /// duals only when the backend reported one per row.
    pub fn load_solution(&mut self, solution: &Solution) {
        let values = (solution.is_optimal() && solution.variable_values.len() == self.num_columns)
            .then_some(solution.variable_values.as_slice());
        for entry in self.variables.values_mut().flat_map(|v| v.entries.values_mut()) {
            entry.value = values.map(|v| v[entry.var.column()]);
        }

        let num_rows = self.num_constraints();
        let duals = solution
            .dual_values
            .as_deref()
            .filter(|d| d.len() == num_rows);
        let entries = self
            .constraints
            .values_mut()
            .flat_map(|g| g.entries.values_mut());
        for (row, entry) in entries.enumerate() {
            entry.dual = duals.map(|d| d[row]);
        }
    }
}
