//! SAT solving components for Rikudo puzzles

pub mod constraints;
pub mod encoder;
pub mod solver;
pub mod solver_factory;
pub mod variables;
pub mod varisat_solver;

pub use constraints::{Clause, ConstraintGenerator};
pub use encoder::{EncodingStatistics, Formula, SatEncoder};
pub use solver::{CadicalSolver, CountOutcome, SatBackend, SolveStatus, SolverSolution};
pub use solver_factory::create_backend;
pub use variables::VariableManager;
pub use varisat_solver::VarisatSolver;
