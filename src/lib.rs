//! Rikudo puzzle solver and generator
//!
//! A Rikudo puzzle asks for a Hamiltonian path through a graph given some
//! pinned positions and "diamond" pairs of vertices that must be visited
//! consecutively. This library solves puzzles through a SAT encoding or a
//! direct backtracking search, checks that every hint is needed, and
//! generates minimal puzzles with a unique solution.

pub mod config;
pub mod error;
pub mod graph;
pub mod rikudo;
pub mod sat;
pub mod utils;

pub use config::Settings;
pub use error::PuzzleError;
pub use graph::Graph;
pub use rikudo::{GeneratedPuzzle, HamiltonianPath, Puzzle, RikudoProblem, SolveOutcome};

use anyhow::Result;

/// Solve the puzzle described by `settings`
pub fn solve_puzzle(settings: Settings) -> Result<SolveOutcome> {
    let problem = RikudoProblem::new(settings)?;
    let puzzle = problem.load_puzzle()?;
    Ok(problem.solve(&puzzle)?.outcome)
}

/// Generate a minimal puzzle on the graph and endpoints in `settings`
pub fn generate_puzzle(settings: Settings) -> Result<GeneratedPuzzle> {
    RikudoProblem::new(settings)?.generate()
}
