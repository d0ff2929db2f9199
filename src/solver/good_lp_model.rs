// Lowering shared by the adapters that reach their engine through good_lp

use std::time::Instant;

use good_lp::{
    variable, variables, Constraint as GoodLpConstraint, Expression, ProblemVariables,
    ResolutionError, Solution as GoodLpSolutionTrait, Variable as GoodLpVariable,
};

use crate::domain::{
    program::{LinearProgram, Solution as DomainSolution},
    solver_service::{Result, SolverError},
    value_objects::ConstraintType,
};

/// Columns and objective of a program, ready to be turned into a good_lp problem
pub(crate) struct Lowered {
    pub vars: ProblemVariables,
    pub objective: Expression,
    pub columns: Vec<GoodLpVariable>,
}

pub(crate) fn lower(problem: &LinearProgram) -> Lowered {
    let mut vars = variables!();
    let mut columns = Vec::with_capacity(problem.num_columns());

    for column in &problem.columns {
        let upper = column.upper_bound.unwrap_or(f64::INFINITY);
        let definition = variable().min(column.lower_bound).max(upper);
        let var = if column.is_integer() {
            vars.add(definition.integer())
        } else {
            vars.add(definition)
        };
        columns.push(var);
    }

    let objective = expression(&problem.objective.terms, &columns);
    Lowered {
        vars,
        objective,
        columns,
    }
}

/// Rows of `problem` as good_lp constraints, in row order
pub(crate) fn constraints(problem: &LinearProgram, columns: &[GoodLpVariable]) -> Vec<GoodLpConstraint> {
    problem
        .rows
        .iter()
        .map(|row| {
            let lhs = expression(&row.terms, columns);
            match row.constraint_type {
                ConstraintType::LessThanOrEqual => lhs.leq(row.bound),
                ConstraintType::Equal => lhs.eq(row.bound),
                ConstraintType::GreaterThanOrEqual => lhs.geq(row.bound),
            }
        })
        .collect()
}

fn expression(terms: &[(usize, f64)], columns: &[GoodLpVariable]) -> Expression {
    let mut expr: Expression = 0.into();
    for &(col, coeff) in terms {
        expr += coeff * columns[col];
    }
    expr
}

/// Translate a good_lp outcome into the domain solution
pub(crate) fn interpret<S: GoodLpSolutionTrait>(
    outcome: std::result::Result<S, ResolutionError>,
    problem: &LinearProgram,
    columns: &[GoodLpVariable],
    started: Instant,
) -> Result<DomainSolution> {
    let mut statistics = problem.statistics();
    statistics.solve_time_ms = started.elapsed().as_secs_f64() * 1000.0;

    let solution = match outcome {
        Ok(sol) => {
            let values: Vec<f64> = columns.iter().map(|&var| sol.value(var)).collect();
            // good_lp does not report the objective, so evaluate it at the returned point
            let objective = problem.objective.evaluate(&values);
            DomainSolution::optimal(objective, values)
                .with_message(format!("Optimal solution found for '{}'", problem.name))
        }
        Err(ResolutionError::Infeasible) => DomainSolution::infeasible(),
        Err(ResolutionError::Unbounded) => DomainSolution::unbounded(),
        Err(e) => return Err(SolverError::ExecutionFailed(format!("{:?}", e))),
    };
    Ok(solution.with_statistics(statistics))
}
