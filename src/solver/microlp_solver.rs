// microlp adapter: pure Rust branch-and-bound, always linkable

use std::time::Instant;

use good_lp::{solvers::microlp::microlp, SolverModel};
use tracing::debug;

use super::good_lp_model::{constraints, interpret, lower, Lowered};
use crate::domain::{
    program::{LinearProgram, Solution},
    solver_service::{Result, SolverService},
    value_objects::OptimizationType,
};

pub struct MicrolpSolver;

impl MicrolpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MicrolpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for MicrolpSolver {
    fn solve(&self, problem: &LinearProgram) -> Result<Solution> {
        self.validate(problem)?;

        let started = Instant::now();
        if problem.solver_config.verbose {
            debug!(solver = self.name(), "backend has no log output of its own");
        }

        let Lowered {
            vars,
            objective,
            columns,
        } = lower(problem);
        let unsolved = match problem.objective.optimization_type {
            OptimizationType::Minimize => vars.minimise(objective),
            OptimizationType::Maximize => vars.maximise(objective),
        };
        let mut model = unsolved.using(microlp);
        for constraint in constraints(problem, &columns) {
            model = model.with(constraint);
        }

        interpret(model.solve(), problem, &columns, started)
    }

    fn name(&self) -> &str {
        "microlp"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::program::{Column, ObjectiveFunction, Row};
    use crate::domain::value_objects::{ConstraintType, OptimizationType, SolutionStatus};

    fn knapsack() -> LinearProgram {
        // maximize 150a + 90b + 120c  s.t.  7a + 3b + 4c <= 10, binaries
        let objective = ObjectiveFunction::new(
            OptimizationType::Maximize,
            vec![(0, 150.0), (1, 90.0), (2, 120.0)],
        );
        LinearProgram::new(objective)
            .with_name("knapsack")
            .with_columns(vec![Column::binary("a"), Column::binary("b"), Column::binary("c")])
            .add_row(Row::new(
                "weight",
                ConstraintType::LessThanOrEqual,
                vec![(0, 7.0), (1, 3.0), (2, 4.0)],
                10.0,
            ))
    }

    #[test]
    fn solves_small_binary_program() {
        let solution = MicrolpSolver::new().solve(&knapsack()).unwrap();

        assert_eq!(solution.status, SolutionStatus::Optimal);
        let value = solution.objective_value.unwrap();
        assert!((value - 240.0).abs() < 1e-6, "objective = {}", value);
        // a and b fit together, adding c would overflow
        assert!((solution.variable_values[0] - 1.0).abs() < 1e-6);
        assert!(solution.variable_values[2].abs() < 1e-6);
        assert_eq!(solution.statistics.num_binary_vars, 3);
        assert!(solution.dual_values.is_none());
    }

    #[test]
    fn reports_infeasible_programs_as_status() {
        let program = knapsack().add_row(Row::new(
            "impossible",
            ConstraintType::GreaterThanOrEqual,
            vec![(0, 1.0), (1, 1.0), (2, 1.0)],
            4.0,
        ));
        let solution = MicrolpSolver::new().solve(&program).unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.objective_value.is_none());
    }
}
