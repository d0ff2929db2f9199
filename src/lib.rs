// Domain layer: solver request/response contract
pub mod domain;

// Algebraic model: sets, parameters, variables, objective, constraints
pub mod model;

// Model lifecycle and concrete formulations
pub mod formulation;

// Solver adapters: Concrete implementations of SolverService
pub mod solver;

// Re-export commonly used types
pub use domain::{
    Column, ConstraintType, LinearProgram, ObjectiveFunction, OptimizationType, Row, Solution,
    SolutionStatus, SolverBackend, SolverConfig, SolverError, SolverService, VariableType,
};

pub use model::{LinearConstraint, LinearExpr, Model, ModelError, VarRef, VariableDomain};

pub use formulation::{
    Formulation, GeneratorCommitment, GeneratorData, GeneratorDispatch, ModelState,
    OptimizationError, OptimizationModel, UnitCommitment,
};

pub use solver::SolverFactory;

#[cfg(feature = "coin_cbc")]
pub use solver::CoinCbcSolver;
#[cfg(feature = "highs")]
pub use solver::HighsSolver;
#[cfg(feature = "microlp")]
pub use solver::MicrolpSolver;
