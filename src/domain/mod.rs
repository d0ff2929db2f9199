// Domain module: solver request/response contract

pub mod program;
pub mod solver_service;
pub mod value_objects;

pub use program::*;
pub use solver_service::*;
pub use value_objects::*;
