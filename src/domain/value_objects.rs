// Domain value objects shared by the model layer and the solver adapters

use std::fmt;
use std::str::FromStr;

use super::solver_service::SolverError;

/// Kind of decision column handed to a solver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    /// Continuous real number (x ∈ ℝ)
    Continuous,
    /// Integer number (x ∈ ℤ)
    Integer,
    /// Binary variable (x ∈ {0, 1})
    Binary,
}

impl VariableType {
    pub fn is_integer(self) -> bool {
        matches!(self, VariableType::Integer | VariableType::Binary)
    }
}

/// Relation between the left-hand side of a row and its right-hand side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintType {
    /// Less than or equal (≤)
    LessThanOrEqual,
    /// Equal (=)
    Equal,
    /// Greater than or equal (≥)
    GreaterThanOrEqual,
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintType::LessThanOrEqual => write!(f, "<="),
            ConstraintType::Equal => write!(f, "=="),
            ConstraintType::GreaterThanOrEqual => write!(f, ">="),
        }
    }
}

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationType {
    Minimize,
    Maximize,
}

impl fmt::Display for OptimizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationType::Minimize => write!(f, "minimize"),
            OptimizationType::Maximize => write!(f, "maximize"),
        }
    }
}

/// Outcome reported by a solver backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// Found optimal solution
    Optimal,
    /// Problem has no feasible solution
    Infeasible,
    /// Objective can be improved infinitely
    Unbounded,
    /// The backend stopped without a usable answer
    Error,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "Optimal"),
            SolutionStatus::Infeasible => write!(f, "Infeasible"),
            SolutionStatus::Unbounded => write!(f, "Unbounded"),
            SolutionStatus::Error => write!(f, "Error"),
        }
    }
}

/// Named solver backend a formulation can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverBackend {
    /// Best backend compiled into this build
    Auto,
    /// Pure Rust microlp, reached through good_lp
    Microlp,
    /// COIN-OR CBC, reached through good_lp
    CoinCbc,
    /// HiGHS, reached through its own bindings
    Highs,
}

impl SolverBackend {
    /// Whether the backend was compiled into this build
    pub fn is_compiled(self) -> bool {
        match self {
            SolverBackend::Auto => {
                SolverBackend::Highs.is_compiled()
                    || SolverBackend::CoinCbc.is_compiled()
                    || SolverBackend::Microlp.is_compiled()
            }
            SolverBackend::Microlp => cfg!(feature = "microlp"),
            SolverBackend::CoinCbc => cfg!(feature = "coin_cbc"),
            SolverBackend::Highs => cfg!(feature = "highs"),
        }
    }
}

impl FromStr for SolverBackend {
    type Err = SolverError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(SolverBackend::Auto),
            "microlp" => Ok(SolverBackend::Microlp),
            "cbc" | "coin_cbc" | "coin-cbc" => Ok(SolverBackend::CoinCbc),
            "highs" => Ok(SolverBackend::Highs),
            other => Err(SolverError::SolverNotAvailable(format!(
                "unknown solver '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Auto => write!(f, "Auto"),
            SolverBackend::Microlp => write!(f, "microlp"),
            SolverBackend::CoinCbc => write!(f, "COIN-OR CBC"),
            SolverBackend::Highs => write!(f, "HiGHS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_solver_names_case_insensitively() {
        assert_eq!("CBC".parse::<SolverBackend>().unwrap(), SolverBackend::CoinCbc);
        assert_eq!("coin_cbc".parse::<SolverBackend>().unwrap(), SolverBackend::CoinCbc);
        assert_eq!(" HiGHS ".parse::<SolverBackend>().unwrap(), SolverBackend::Highs);
        assert_eq!("auto".parse::<SolverBackend>().unwrap(), SolverBackend::Auto);
        assert_eq!("microlp".parse::<SolverBackend>().unwrap(), SolverBackend::Microlp);
    }

    #[test]
    fn rejects_unknown_solver_names() {
        let err = "gurobi".parse::<SolverBackend>().unwrap_err();
        assert!(matches!(err, SolverError::SolverNotAvailable(_)));
        assert!(err.to_string().contains("gurobi"));
    }
}
