//! Rikudo puzzles: model, solvers, minimality and generation

pub mod backtracking;
pub mod generator;
pub mod minimizer;
pub mod problem;
pub mod puzzle;
pub mod solution;
pub mod validator;

pub use backtracking::{BacktrackingSolver, SearchStatistics};
pub use generator::{GeneratedPuzzle, GeneratorStatistics, PuzzleGenerator};
pub use minimizer::{MinimalityReport, PuzzleMinimizer};
pub use problem::{RikudoProblem, SolveReport};
pub use puzzle::{DiamondRelation, Hint, PartialMap, Puzzle};
pub use solution::{HamiltonianPath, SolveOutcome, Solution, SolutionMetadata};
pub use validator::{PathValidator, ValidationResult, Violation};
