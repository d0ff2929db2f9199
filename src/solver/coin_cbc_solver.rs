use std::time::Instant;

use good_lp::{solvers::coin_cbc::coin_cbc, SolverModel};
use tracing::debug;

use super::good_lp_model::{constraints, interpret, lower, Lowered};
use crate::domain::{
    program::{LinearProgram, Solution},
    solver_service::{Result, SolverService},
    value_objects::OptimizationType,
};

pub struct CoinCbcSolver;

impl CoinCbcSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinCbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for CoinCbcSolver {
    fn solve(&self, problem: &LinearProgram) -> Result<Solution> {
        self.validate(problem)?;

        let started = Instant::now();
        let Lowered {
            vars,
            objective,
            columns,
        } = lower(problem);
        let unsolved = match problem.objective.optimization_type {
            OptimizationType::Minimize => vars.minimise(objective),
            OptimizationType::Maximize => vars.maximise(objective),
        };
        let mut model = unsolved.using(coin_cbc);
        model.set_parameter("logLevel", if problem.solver_config.verbose { "1" } else { "0" });
        debug!(solver = self.name(), columns = columns.len(), "dispatching to CBC");

        for constraint in constraints(problem, &columns) {
            model = model.with(constraint);
        }

        interpret(model.solve(), problem, &columns, started)
    }

    fn name(&self) -> &str {
        "COIN-OR CBC"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}
