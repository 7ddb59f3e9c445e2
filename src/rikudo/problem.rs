//! Settings-driven entry point tying graph, puzzle and solvers together

use super::{
    BacktrackingSolver, GeneratedPuzzle, MinimalityReport, PathValidator, Puzzle, PuzzleGenerator,
    PuzzleMinimizer, SolveOutcome, Solution,
};
use crate::config::{Settings, SolveMethod, Topology};
use crate::sat::{CountOutcome, EncodingStatistics, SatEncoder};
use crate::utils::BoardLayout;
use anyhow::{Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

/// Solve result together with its timing
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub outcome: SolveOutcome,
    pub solution: Option<Solution>,
    pub solve_time: Duration,
}

/// A configured Rikudo problem
pub struct RikudoProblem {
    settings: Settings,
    encoder: SatEncoder,
}

impl RikudoProblem {
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate().context("Configuration validation failed")?;
        let encoder = SatEncoder::new(&settings.solver);
        Ok(Self { settings, encoder })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn encoder(&self) -> &SatEncoder {
        &self.encoder
    }

    /// Grid dimensions, when the configured graph is a grid
    pub fn layout(&self) -> Option<BoardLayout> {
        (self.settings.graph.topology == Topology::Grid)
            .then_some((self.settings.graph.width, self.settings.graph.height))
    }

    /// The configured puzzle file, or the bare graph between the
    /// configured endpoints
    pub fn load_puzzle(&self) -> Result<Puzzle> {
        match &self.settings.puzzle.puzzle_file {
            Some(file) => Puzzle::load_from_file(file),
            None => {
                let graph = self.settings.build_graph()?;
                Puzzle::unconstrained(graph, self.settings.puzzle.start, self.settings.puzzle.end)
            }
        }
    }

    /// Solve with the configured method
    pub fn solve(&self, puzzle: &Puzzle) -> Result<SolveReport> {
        let method = self.settings.solver.method;
        let start_time = Instant::now();

        let outcome = match method {
            SolveMethod::Sat => self.encoder.solve(puzzle)?,
            SolveMethod::Backtracking => {
                let mut solver = BacktrackingSolver::new();
                let outcome = solver.solve_puzzle(puzzle)?;
                info!("Backtracking: {}", solver.statistics());
                outcome
            }
        };
        let solve_time = start_time.elapsed();

        let solution = match outcome.path() {
            Some(path) => {
                PathValidator::ensure_valid(puzzle, path)?;
                Some(Solution::new(puzzle, path.clone(), method, solve_time))
            }
            None => None,
        };

        Ok(SolveReport {
            outcome,
            solution,
            solve_time,
        })
    }

    /// Count solutions with the SAT encoding
    pub fn count_solutions(&self, puzzle: &Puzzle, limit: Option<u64>) -> Result<CountOutcome> {
        self.encoder.count_solutions(puzzle, limit)
    }

    pub fn check(&self, puzzle: &Puzzle) -> Result<MinimalityReport> {
        PuzzleMinimizer::new(&self.encoder).check(puzzle)
    }

    /// Generate a puzzle on the configured graph and endpoints. Without a
    /// configured seed a random one is drawn and logged.
    pub fn generate(&self) -> Result<GeneratedPuzzle> {
        let graph = self.settings.build_graph()?;
        let seed = self.settings.generator.seed.unwrap_or_else(rand::random);
        info!("Generating with seed {}", seed);

        let mut rng = StdRng::seed_from_u64(seed);
        PuzzleGenerator::new(&self.encoder)
            .with_max_attempts(self.settings.generator.max_attempts)
            .generate(&graph, self.settings.puzzle.start, self.settings.puzzle.end, &mut rng)
    }

    pub fn encoding_statistics(&self, puzzle: &Puzzle) -> Result<EncodingStatistics> {
        Ok(self.encoder.formula(puzzle)?.statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverBackend;
    use tempfile::tempdir;

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.generator.seed = Some(5);
        settings
    }

    #[test]
    fn test_solve_default_grid_with_both_methods() {
        for method in [SolveMethod::Sat, SolveMethod::Backtracking] {
            let mut settings = settings();
            settings.solver.method = method;
            let problem = RikudoProblem::new(settings).unwrap();
            let puzzle = problem.load_puzzle().unwrap();

            let report = problem.solve(&puzzle).unwrap();
            let solution = report.solution.unwrap();
            assert_eq!(solution.method, method);
            assert_eq!(solution.path.len(), 9);
        }
    }

    #[test]
    fn test_generate_then_check() {
        let problem = RikudoProblem::new(settings()).unwrap();
        let generated = problem.generate().unwrap();

        assert_eq!(problem.check(&generated.puzzle).unwrap(), MinimalityReport::Minimal);
        assert_eq!(
            problem.count_solutions(&generated.puzzle, None).unwrap(),
            CountOutcome::Exact(1)
        );
        assert_eq!(problem.layout(), Some((3, 3)));
    }

    #[test]
    fn test_load_puzzle_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("puzzle.json");

        let problem = RikudoProblem::new(settings()).unwrap();
        let generated = problem.generate().unwrap();
        generated.puzzle.save_to_file(&file).unwrap();

        let mut settings = settings();
        settings.puzzle.puzzle_file = Some(file);
        settings.solver.backend = SolverBackend::Varisat;
        let problem = RikudoProblem::new(settings).unwrap();
        let loaded = problem.load_puzzle().unwrap();
        assert_eq!(loaded, generated.puzzle);

        let report = problem.solve(&loaded).unwrap();
        assert_eq!(report.outcome.path(), Some(&generated.solution));
        assert!(problem.encoding_statistics(&loaded).unwrap().total_clauses > 0);
    }
}
