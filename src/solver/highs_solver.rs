// HiGHS Solver Adapter
// Translates the flat program to a HiGHS row problem and reads back row duals.

use std::time::Instant;

use highs::{Col, HighsModelStatus, RowProblem, Sense};
use tracing::{debug, warn};

use crate::domain::{
    program::{LinearProgram, Solution as DomainSolution},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{ConstraintType, OptimizationType},
};

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the HiGHS problem. With `fixed` set, integer columns are pinned to their
/// rounded values and everything is continuous, which yields the LP whose duals
/// price the rows at the integer solution.
fn row_problem(problem: &LinearProgram, fixed: Option<&[f64]>) -> RowProblem {
    let mut costs = vec![0.0; problem.num_columns()];
    for &(col, coeff) in &problem.objective.terms {
        costs[col] += coeff;
    }

    let mut pb = RowProblem::default();
    let mut cols: Vec<Col> = Vec::with_capacity(costs.len());
    for (i, column) in problem.columns.iter().enumerate() {
        let lower = column.lower_bound;
        let upper = column.upper_bound.unwrap_or(f64::INFINITY);
        let col = match fixed {
            Some(values) if column.is_integer() => {
                let v = values[i].round();
                pb.add_column(costs[i], v..=v)
            }
            None if column.is_integer() => pb.add_integer_column(costs[i], lower..=upper),
            _ => pb.add_column(costs[i], lower..=upper),
        };
        cols.push(col);
    }

    for row in &problem.rows {
        let terms: Vec<(Col, f64)> = row.terms.iter().map(|&(i, c)| (cols[i], c)).collect();
        match row.constraint_type {
            ConstraintType::LessThanOrEqual => pb.add_row(..=row.bound, &terms),
            ConstraintType::Equal => pb.add_row(row.bound..=row.bound, &terms),
            ConstraintType::GreaterThanOrEqual => pb.add_row(row.bound.., &terms),
        }
    }
    pb
}

fn sense(problem: &LinearProgram) -> Sense {
    match problem.objective.optimization_type {
        OptimizationType::Minimize => Sense::Minimise,
        OptimizationType::Maximize => Sense::Maximise,
    }
}

impl HighsSolver {
    /// Row duals of the program with its integer columns fixed at `values`
    fn fixed_integer_duals(&self, problem: &LinearProgram, values: &[f64]) -> Option<Vec<f64>> {
        let mut model = row_problem(problem, Some(values)).optimise(sense(problem));
        model.set_option("output_flag", false);
        let solved = model.solve();
        if matches!(solved.status(), HighsModelStatus::Optimal) {
            Some(solved.get_solution().dual_rows().to_vec())
        } else {
            warn!(status = ?solved.status(), "fixed LP for duals did not solve");
            None
        }
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, problem: &LinearProgram) -> Result<DomainSolution> {
        self.validate(problem)?;

        let started = Instant::now();
        let mut model = row_problem(problem, None).optimise(sense(problem));
        model.set_option("output_flag", problem.solver_config.verbose);
        debug!(solver = self.name(), columns = problem.num_columns(), "dispatching to HiGHS");

        let solved = model.solve();
        let mut statistics = problem.statistics();
        statistics.solve_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        let solution = match solved.status() {
            HighsModelStatus::Optimal => {
                let solution_data = solved.get_solution();
                let values = solution_data.columns().to_vec();
                let objective = problem.objective.evaluate(&values);

                let duals = if !problem.solver_config.compute_duals {
                    None
                } else if problem.is_mixed_integer() {
                    self.fixed_integer_duals(problem, &values)
                } else {
                    Some(solution_data.dual_rows().to_vec())
                };

                let solution = DomainSolution::optimal(objective, values)
                    .with_message(format!("Optimal solution found for '{}'", problem.name));
                match duals {
                    Some(duals) => solution.with_duals(duals),
                    None => solution,
                }
            }
            HighsModelStatus::Infeasible => DomainSolution::infeasible(),
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                DomainSolution::unbounded()
            }
            status => {
                return Err(SolverError::ExecutionFailed(format!(
                    "HiGHS solver returned status: {:?}",
                    status
                )))
            }
        };

        Ok(solution.with_statistics(statistics))
    }

    fn name(&self) -> &str {
        "HiGHS"
    }

    fn supports_mip(&self) -> bool {
        true
    }

    fn supports_duals(&self) -> bool {
        true
    }
}
