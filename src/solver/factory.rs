use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolverBackend,
};
#[cfg(feature = "coin_cbc")]
use crate::solver::CoinCbcSolver;
#[cfg(feature = "highs")]
use crate::solver::HighsSolver;
#[cfg(feature = "microlp")]
use crate::solver::MicrolpSolver;

/// Preference order used to resolve [`SolverBackend::Auto`]
const AUTO_PREFERENCE: [SolverBackend; 3] = [
    SolverBackend::Highs,
    SolverBackend::CoinCbc,
    SolverBackend::Microlp,
];

/// Factory for creating solver instances from names or backends
pub struct SolverFactory;

impl SolverFactory {
    /// Locate a solver by name, failing if it is unknown or not compiled in
    pub fn from_name(name: &str) -> Result<Arc<dyn SolverService>> {
        let backend: SolverBackend = name.parse()?;
        Self::create_from_backend(backend)
    }

    /// Concrete backend that `backend` stands for in this build
    pub fn resolve(backend: SolverBackend) -> Result<SolverBackend> {
        let resolved = match backend {
            SolverBackend::Auto => AUTO_PREFERENCE
                .into_iter()
                .find(|b| b.is_compiled())
                .ok_or_else(|| {
                    SolverError::SolverNotAvailable("no solver backend compiled in".to_string())
                })?,
            other if other.is_compiled() => other,
            other => {
                return Err(SolverError::SolverNotAvailable(format!(
                    "{} support was not compiled into this build",
                    other
                )))
            }
        };
        debug!(requested = %backend, resolved = %resolved, "resolved solver backend");
        Ok(resolved)
    }

    /// Create a solver for a specific backend
    pub fn create_from_backend(backend: SolverBackend) -> Result<Arc<dyn SolverService>> {
        match Self::resolve(backend)? {
            #[cfg(feature = "highs")]
            SolverBackend::Highs => Ok(Arc::new(HighsSolver::new())),
            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => Ok(Arc::new(CoinCbcSolver::new())),
            #[cfg(feature = "microlp")]
            SolverBackend::Microlp => Ok(Arc::new(MicrolpSolver::new())),
            #[allow(unreachable_patterns)]
            other => Err(SolverError::SolverNotAvailable(other.to_string())),
        }
    }

    /// Backends usable in this build, in auto-selection order
    pub fn available_backends() -> Vec<SolverBackend> {
        AUTO_PREFERENCE
            .into_iter()
            .filter(|b| b.is_compiled())
            .collect()
    }
}
