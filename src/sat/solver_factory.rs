//! Factory for creating SAT solver instances based on configuration

use super::solver::{CadicalSolver, SatBackend};
use super::varisat_solver::VarisatSolver;
use crate::config::SolverBackend;
use log::warn;
use std::time::Duration;

/// Create a fresh solver for the given backend
pub fn create_backend(backend: SolverBackend, timeout: Option<Duration>) -> Box<dyn SatBackend> {
    match backend {
        SolverBackend::Cadical => Box::new(CadicalSolver::with_timeout(timeout)),
        SolverBackend::Varisat => {
            if timeout.is_some() {
                warn!("varisat backend does not support timeouts; solving without one");
            }
            Box::new(VarisatSolver::new())
        }
    }
}
