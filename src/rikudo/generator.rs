//! Random generation of minimal, uniquely solvable puzzles

use super::backtracking::BacktrackingSolver;
use super::minimizer::PuzzleMinimizer;
use super::validator::PathValidator;
use super::{DiamondRelation, HamiltonianPath, Hint, PartialMap, Puzzle, SolveOutcome};
use crate::graph::Graph;
use crate::sat::{CountOutcome, SatEncoder};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use rand::Rng;
use std::fmt;

/// Counters collected while generating one puzzle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorStatistics {
    /// Random draws, including ones that hit an already constrained slot
    pub attempts: usize,
    pub positions_pinned: usize,
    pub diamonds_added: usize,
    /// Hints dropped again by the final minimality pass
    pub hints_removed: usize,
    /// Whether the attempt budget ran out and every position was pinned
    pub fallback_used: bool,
}

impl fmt::Display for GeneratorStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Generation Statistics:")?;
        writeln!(f, "  Attempts: {}", self.attempts)?;
        writeln!(f, "  Positions pinned: {}", self.positions_pinned)?;
        writeln!(f, "  Diamonds added: {}", self.diamonds_added)?;
        writeln!(f, "  Hints removed: {}", self.hints_removed)?;
        writeln!(f, "  Fallback used: {}", self.fallback_used)?;
        Ok(())
    }
}

/// A generated puzzle with its unique solution
#[derive(Debug, Clone)]
pub struct GeneratedPuzzle {
    pub puzzle: Puzzle,
    pub solution: HamiltonianPath,
    pub statistics: GeneratorStatistics,
}

/// Builds puzzles by adding random hints from a seed path until the
/// solution is unique, then dropping the hints that became redundant
pub struct PuzzleGenerator<'e> {
    encoder: &'e SatEncoder,
    max_attempts: Option<usize>,
}

impl<'e> PuzzleGenerator<'e> {
    pub fn new(encoder: &'e SatEncoder) -> Self {
        Self {
            encoder,
            max_attempts: None,
        }
    }

    /// Bound on random draws before pinning every remaining position.
    /// `None` uses `8n + 64`.
    pub fn with_max_attempts(mut self, max_attempts: Option<usize>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Generate a puzzle whose solution runs from `start` to `end`
    pub fn generate<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        start: usize,
        end: usize,
        rng: &mut R,
    ) -> Result<GeneratedPuzzle> {
        let open = Puzzle::unconstrained(graph.clone(), start, end)?;
        let seed = match BacktrackingSolver::new().solve(&open, start, end)? {
            SolveOutcome::Solved(path) => path,
            _ => anyhow::bail!("No Hamiltonian path from {} to {}", start, end),
        };
        debug!("Seed path: {}", seed);

        self.generate_from_path(graph, &seed, rng)
    }

    /// Generate a puzzle whose unique solution is `path`
    pub fn generate_from_path<R: Rng + ?Sized>(
        &self,
        graph: &Graph,
        path: &HamiltonianPath,
        rng: &mut R,
    ) -> Result<GeneratedPuzzle> {
        let n = graph.vertex_count();
        let vertices = path.vertices();
        let (start, end) = match (vertices.first(), vertices.last()) {
            (Some(&start), Some(&end)) => (start, end),
            _ => anyhow::bail!("Cannot generate a puzzle from an empty path"),
        };

        let mut puzzle = Puzzle::new(
            graph.clone(),
            DiamondRelation::new(n),
            PartialMap::with_endpoints(n, start, end),
        )?;
        PathValidator::ensure_valid(&puzzle, path)?;

        let max_attempts = self.max_attempts.unwrap_or(8 * n + 64);
        let mut statistics = GeneratorStatistics::default();
        let mut count = self.encoder.uniqueness(&puzzle)?;

        while !count.is_unique() {
            if statistics.attempts >= max_attempts {
                warn!(
                    "No unique puzzle after {} attempts; pinning every position",
                    statistics.attempts
                );
                for (position, &vertex) in vertices.iter().enumerate() {
                    if !puzzle.partial_map().is_assigned(position) {
                        puzzle.pin(position, vertex)?;
                        statistics.positions_pinned += 1;
                    }
                }
                statistics.fallback_used = true;
                count = self.encoder.uniqueness(&puzzle)?;
                break;
            }
            statistics.attempts += 1;

            if !self.add_random_hint(&mut puzzle, vertices, rng, &mut statistics)? {
                continue;
            }
            count = self.encoder.uniqueness(&puzzle)?;
            debug!(
                "{} hints, solutions: {}",
                puzzle.hint_count(),
                count
            );
        }

        if count != CountOutcome::Exact(1) {
            anyhow::bail!("Could not make the puzzle unique (solutions: {})", count);
        }

        let removed = PuzzleMinimizer::new(self.encoder).makes_good(&mut puzzle)?;
        statistics.hints_removed = removed.len();

        PathValidator::ensure_valid(&puzzle, path)
            .context("Generated puzzle does not accept its own seed path")?;
        info!(
            "Generated puzzle on {} vertices with {} pins and {} diamonds",
            n,
            puzzle.partial_map().assigned_count(),
            puzzle.diamonds().pair_count()
        );

        Ok(GeneratedPuzzle {
            puzzle,
            solution: path.clone(),
            statistics,
        })
    }

    /// Draw one hint from the seed path. Returns false when the drawn slot
    /// was already constrained.
    fn add_random_hint<R: Rng + ?Sized>(
        &self,
        puzzle: &mut Puzzle,
        seed: &[usize],
        rng: &mut R,
        statistics: &mut GeneratorStatistics,
    ) -> Result<bool> {
        let n = seed.len();
        if n < 3 {
            return Ok(false);
        }

        let hint = if rng.random_bool(0.5) {
            let index = rng.random_range(1..n - 1);
            if puzzle.partial_map().is_assigned(index) {
                return Ok(false);
            }
            Hint::Position {
                index,
                vertex: seed[index],
            }
        } else {
            let i = rng.random_range(0..n - 2);
            let (u, v) = (seed[i].min(seed[i + 1]), seed[i].max(seed[i + 1]));
            if puzzle.diamonds().contains(u, v) {
                return Ok(false);
            }
            Hint::Diamond(u, v)
        };

        match hint {
            Hint::Position { index, vertex } => {
                puzzle.pin(index, vertex)?;
                statistics.positions_pinned += 1;
            }
            Hint::Diamond(u, v) => {
                puzzle.add_diamond(u, v)?;
                statistics.diamonds_added += 1;
            }
        }
        debug!("Added hint {}", hint);
        Ok(true)
    }
}
