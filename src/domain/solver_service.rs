// Domain service interface for solving linear programs
// Every backend adapter implements this contract; formulations never see the backend itself.

use super::program::{LinearProgram, Solution};

/// Error types for the solver service
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Narrow request/response contract to an external solving engine.
///
/// Infeasible and unbounded programs are answered with a [`Solution`] carrying that
/// status; `Err` is reserved for malformed requests and backend failures.
pub trait SolverService: Send + Sync {
    /// Solve a linear program, blocking until the backend returns.
    ///
    /// `solver_config.verbose` is a request, not a guarantee: backends with no log
    /// output of their own ignore it.
    fn solve(&self, problem: &LinearProgram) -> Result<Solution>;

    /// Check a program for structural problems without solving it
    fn validate(&self, problem: &LinearProgram) -> Result<()> {
        let mut errors = Vec::new();
        let num_columns = problem.num_columns();

        if let Some(&(col, _)) = problem
            .objective
            .terms
            .iter()
            .find(|(col, _)| *col >= num_columns)
        {
            errors.push(format!(
                "Objective references column {} but problem has {} columns",
                col, num_columns
            ));
        }

        for row in &problem.rows {
            if let Some(&(col, _)) = row.terms.iter().find(|(col, _)| *col >= num_columns) {
                errors.push(format!(
                    "Row '{}' references column {} but problem has {} columns",
                    row.name, col, num_columns
                ));
            }
            if !row.bound.is_finite() || row.terms.iter().any(|(_, c)| !c.is_finite()) {
                errors.push(format!("Row '{}' has a non-finite coefficient or bound", row.name));
            }
        }

        if problem.objective.terms.iter().any(|(_, c)| !c.is_finite()) {
            errors.push("Objective has a non-finite coefficient".to_string());
        }

        for column in &problem.columns {
            if let Some(upper) = column.upper_bound {
                if column.lower_bound > upper {
                    errors.push(format!(
                        "Column '{}' has lower bound ({}) > upper bound ({})",
                        column.name, column.lower_bound, upper
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidProblem(errors.join("; ")))
        }
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;

    /// Check if this solver supports mixed-integer programming
    fn supports_mip(&self) -> bool;

    /// Check if this solver reports row duals
    fn supports_duals(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::program::{Column, ObjectiveFunction, Row};
    use crate::domain::value_objects::{ConstraintType, OptimizationType};

    struct NullSolver;

    impl SolverService for NullSolver {
        fn solve(&self, _problem: &LinearProgram) -> Result<Solution> {
            Ok(Solution::infeasible())
        }

        fn name(&self) -> &str {
            "null"
        }

        fn supports_mip(&self) -> bool {
            false
        }
    }

    #[test]
    fn validate_accepts_well_formed_program() {
        let program = LinearProgram::new(ObjectiveFunction::new(OptimizationType::Minimize, vec![(0, 1.0)]))
            .with_columns(vec![Column::continuous("x")])
            .add_row(Row::new("r", ConstraintType::GreaterThanOrEqual, vec![(0, 1.0)], 2.0));
        assert!(NullSolver.validate(&program).is_ok());
    }

    #[test]
    fn validate_reports_every_problem() {
        let program = LinearProgram::new(ObjectiveFunction::new(OptimizationType::Minimize, vec![(3, 1.0)]))
            .with_columns(vec![Column::continuous("x").with_bounds(2.0, Some(1.0))])
            .add_row(Row::new("r", ConstraintType::Equal, vec![(0, f64::NAN)], 2.0));

        let message = NullSolver.validate(&program).unwrap_err().to_string();
        assert!(message.contains("Objective references column 3"));
        assert!(message.contains("Row 'r' has a non-finite"));
        assert!(message.contains("Column 'x' has lower bound"));
    }

    #[test]
    fn duals_are_opt_in() {
        assert!(!NullSolver.supports_duals());
    }
}
