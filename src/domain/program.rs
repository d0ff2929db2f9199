// Flat linear program exchanged with solver backends
//
// The algebraic `Model` is lowered into this shape before a solve; adapters only
// ever see columns, rows and sparse terms indexed by column position.

use super::value_objects::{ConstraintType, OptimizationType, SolutionStatus, VariableType};

/// Sparse linear terms as `(column index, coefficient)` pairs
pub type Terms = Vec<(usize, f64)>;

/// Decision column of a linear program
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub variable_type: VariableType,
    pub lower_bound: f64,
    pub upper_bound: Option<f64>,
}

impl Column {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variable_type: VariableType::Continuous,
            lower_bound: 0.0,
            upper_bound: None,
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variable_type: VariableType::Integer,
            lower_bound: 0.0,
            upper_bound: None,
        }
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variable_type: VariableType::Binary,
            lower_bound: 0.0,
            upper_bound: Some(1.0),
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: Option<f64>) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn is_integer(&self) -> bool {
        self.variable_type.is_integer()
    }
}

/// Linear objective with a constant offset
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveFunction {
    pub optimization_type: OptimizationType,
    pub terms: Terms,
    pub constant: f64,
}

impl ObjectiveFunction {
    pub fn new(optimization_type: OptimizationType, terms: Terms) -> Self {
        Self {
            optimization_type,
            terms,
            constant: 0.0,
        }
    }

    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }

    /// Objective value at the given column values
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.constant + dot(&self.terms, values)
    }
}

/// Named linear row `terms REL bound`
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub name: String,
    pub constraint_type: ConstraintType,
    pub terms: Terms,
    pub bound: f64,
}

impl Row {
    pub fn new(
        name: impl Into<String>,
        constraint_type: ConstraintType,
        terms: Terms,
        bound: f64,
    ) -> Self {
        Self {
            name: name.into(),
            constraint_type,
            terms,
            bound,
        }
    }
}

/// Configuration handed to the backend along with the program
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Forward the backend's own log output to stdout. Backends without log output
    /// of their own (microlp) ignore it.
    pub verbose: bool,
    /// Ask for one dual value per row when the backend can provide them
    pub compute_duals: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            compute_duals: true,
        }
    }
}

/// Complete solver request
#[derive(Debug, Clone)]
pub struct LinearProgram {
    pub name: String,
    pub objective: ObjectiveFunction,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub solver_config: SolverConfig,
}

impl LinearProgram {
    pub fn new(objective: ObjectiveFunction) -> Self {
        Self {
            name: String::new(),
            objective,
            columns: Vec::new(),
            rows: Vec::new(),
            solver_config: SolverConfig::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn add_row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.solver_config = config;
        self
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_integer_columns(&self) -> usize {
        self.columns.iter().filter(|c| c.is_integer()).count()
    }

    pub fn num_binary_columns(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.variable_type == VariableType::Binary)
            .count()
    }

    pub fn is_mixed_integer(&self) -> bool {
        self.num_integer_columns() > 0
    }

    /// Statistics skeleton describing this program's size
    pub fn statistics(&self) -> SolverStatistics {
        SolverStatistics {
            solve_time_ms: 0.0,
            num_variables: self.num_columns() as u32,
            num_constraints: self.rows.len() as u32,
            num_integer_vars: (self.num_integer_columns() - self.num_binary_columns()) as u32,
            num_binary_vars: self.num_binary_columns() as u32,
        }
    }
}

fn dot(terms: &[(usize, f64)], values: &[f64]) -> f64 {
    terms
        .iter()
        .map(|&(col, coeff)| coeff * values.get(col).copied().unwrap_or(0.0))
        .sum()
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
    pub num_integer_vars: u32,
    pub num_binary_vars: u32,
}

/// Solver response
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolutionStatus,
    /// Only present when `status` is optimal
    pub objective_value: Option<f64>,
    /// One value per column, empty unless optimal
    pub variable_values: Vec<f64>,
    /// One dual per row when the backend reports them
    pub dual_values: Option<Vec<f64>>,
    pub message: String,
    pub statistics: SolverStatistics,
}

impl Solution {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            objective_value: None,
            variable_values: Vec::new(),
            dual_values: None,
            message: message.into(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn optimal(value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            objective_value: Some(value),
            variable_values,
            dual_values: None,
            message: "Optimal solution found".to_string(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn infeasible() -> Self {
        Self::new(
            SolutionStatus::Infeasible,
            "Problem is infeasible: no solution satisfies all constraints",
        )
    }

    pub fn unbounded() -> Self {
        Self::new(
            SolutionStatus::Unbounded,
            "Problem is unbounded: objective can be improved infinitely",
        )
    }

    pub fn with_duals(mut self, duals: Vec<f64>) -> Self {
        self.dual_values = Some(duals);
        self
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_column_program() -> LinearProgram {
        let objective = ObjectiveFunction::new(OptimizationType::Minimize, vec![(0, 3.0), (1, 2.0)])
            .with_constant(5.0);
        LinearProgram::new(objective)
            .with_name("tiny")
            .with_columns(vec![Column::binary("u"), Column::continuous("p")])
            .add_row(Row::new("cap", ConstraintType::LessThanOrEqual, vec![(1, 1.0), (0, -10.0)], 0.0))
    }

    #[test]
    fn objective_includes_constant() {
        let program = two_column_program();
        assert_eq!(program.objective.evaluate(&[1.0, 4.0]), 5.0 + 3.0 + 8.0);
    }

    #[test]
    fn statistics_split_binary_from_integer() {
        let program = two_column_program();
        let stats = program.statistics();
        assert_eq!(stats.num_variables, 2);
        assert_eq!(stats.num_constraints, 1);
        assert_eq!(stats.num_binary_vars, 1);
        assert_eq!(stats.num_integer_vars, 0);
        assert!(program.is_mixed_integer());
    }

    #[test]
    fn non_optimal_solutions_carry_no_objective() {
        let solution = Solution::infeasible();
        assert!(!solution.is_optimal());
        assert!(solution.objective_value.is_none());
        assert!(solution.dual_values.is_none());
    }
}
