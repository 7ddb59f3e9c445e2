//! Minimality checks: no single hint may be redundant

use super::{Hint, Puzzle};
use crate::sat::{CountOutcome, SatEncoder};
use anyhow::Result;
use log::{debug, info, warn};
use std::fmt;

/// Outcome of a minimality check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinimalityReport {
    /// Unique, and every hint is needed
    Minimal,
    /// Unique even without this hint
    Redundant(Hint),
    /// The puzzle itself does not have exactly one solution
    NotUnique(CountOutcome),
}

impl MinimalityReport {
    pub fn is_minimal(&self) -> bool {
        matches!(self, MinimalityReport::Minimal)
    }
}

impl fmt::Display for MinimalityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinimalityReport::Minimal => write!(f, "minimal"),
            MinimalityReport::Redundant(hint) => write!(f, "not minimal: {} is redundant", hint),
            MinimalityReport::NotUnique(count) => write!(f, "not unique: {} solutions", count),
        }
    }
}

/// Probes hints one at a time: remove, recount, then restore or keep removed
pub struct PuzzleMinimizer<'e> {
    encoder: &'e SatEncoder,
}

impl<'e> PuzzleMinimizer<'e> {
    pub fn new(encoder: &'e SatEncoder) -> Self {
        Self { encoder }
    }

    /// Report the first redundant hint, interior pins before diamonds
    pub fn check(&self, puzzle: &Puzzle) -> Result<MinimalityReport> {
        let count = self.encoder.uniqueness(puzzle)?;
        if !count.is_unique() {
            return Ok(MinimalityReport::NotUnique(count));
        }

        let mut scratch = puzzle.clone();
        for hint in puzzle.hints() {
            let redundant = self.still_unique_without(&mut scratch, &hint)?;
            scratch.restore_hint(&hint)?;
            if redundant {
                debug!("Hint {} is redundant", hint);
                return Ok(MinimalityReport::Redundant(hint));
            }
        }

        Ok(MinimalityReport::Minimal)
    }

    /// Whether no single hint can be dropped without losing uniqueness
    pub fn is_good(&self, puzzle: &Puzzle) -> Result<bool> {
        Ok(self.check(puzzle)?.is_minimal())
    }

    /// One pass over interior pins, then one over diamonds, permanently
    /// dropping every hint whose removal keeps the solution unique.
    /// Returns the dropped hints in removal order.
    pub fn makes_good(&self, puzzle: &mut Puzzle) -> Result<Vec<Hint>> {
        let count = self.encoder.uniqueness(puzzle)?;
        if !count.is_unique() {
            warn!("Puzzle is not uniquely solvable ({} solutions); leaving hints in place", count);
            return Ok(Vec::new());
        }

        let mut removed = Vec::new();
        for hint in puzzle.hints() {
            if self.still_unique_without(puzzle, &hint)? {
                info!("Dropped redundant hint {}", hint);
                removed.push(hint);
            } else {
                puzzle.restore_hint(&hint)?;
            }
        }

        Ok(removed)
    }

    /// Remove `hint` and recount. The hint stays removed; the caller decides
    /// whether to restore it. A timeout counts as "not unique".
    fn still_unique_without(&self, puzzle: &mut Puzzle, hint: &Hint) -> Result<bool> {
        if !puzzle.remove_hint(hint) {
            anyhow::bail!("Hint {} is not part of the puzzle", hint);
        }

        let count = self.encoder.uniqueness(puzzle)?;
        if count == CountOutcome::Timeout {
            warn!("Timed out probing hint {}; treating it as necessary", hint);
        }
        Ok(count.is_unique())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverBackend;
    use crate::graph::Graph;
    use crate::rikudo::{DiamondRelation, PartialMap};
    use std::time::Duration;

    fn encoder() -> SatEncoder {
        SatEncoder::with_backend(SolverBackend::Cadical, None)
    }

    fn scenario_puzzle() -> Puzzle {
        let graph = Graph::grid(3, 3).unwrap();
        let diamonds = DiamondRelation::from_pairs(9, &[(0, 3)]).unwrap();
        let map = PartialMap::from_sentinel(&[0, 3, -1, -1, -1, -1, -1, -1, 8]);
        Puzzle::new(graph, diamonds, map).unwrap()
    }

    #[test]
    fn test_scenario_is_not_minimal() {
        let encoder = encoder();
        let minimizer = PuzzleMinimizer::new(&encoder);
        let puzzle = scenario_puzzle();

        // The diamond already forces 3 right after 0
        assert_eq!(
            minimizer.check(&puzzle).unwrap(),
            MinimalityReport::Redundant(Hint::Position { index: 1, vertex: 3 })
        );
        assert!(!minimizer.is_good(&puzzle).unwrap());
        assert_eq!(puzzle, scenario_puzzle());
    }

    #[test]
    fn test_makes_good_on_scenario() {
        let encoder = encoder();
        let minimizer = PuzzleMinimizer::new(&encoder);
        let mut puzzle = scenario_puzzle();

        let removed = minimizer.makes_good(&mut puzzle).unwrap();
        assert_eq!(removed, vec![Hint::Position { index: 1, vertex: 3 }]);
        assert!(puzzle.diamonds().contains(0, 3));
        assert!(!puzzle.partial_map().is_assigned(1));
        assert!(minimizer.is_good(&puzzle).unwrap());

        // Already minimal: nothing changes
        let before = puzzle.clone();
        assert!(minimizer.makes_good(&mut puzzle).unwrap().is_empty());
        assert_eq!(puzzle, before);
    }

    #[test]
    fn test_not_unique() {
        let encoder = encoder();
        let minimizer = PuzzleMinimizer::new(&encoder);
        let mut puzzle = Puzzle::unconstrained(Graph::grid(3, 3).unwrap(), 0, 8).unwrap();

        assert_eq!(
            minimizer.check(&puzzle).unwrap(),
            MinimalityReport::NotUnique(CountOutcome::AtLeast(2))
        );
        assert!(minimizer.makes_good(&mut puzzle).unwrap().is_empty());
    }

    #[test]
    fn test_fully_pinned_map() {
        let encoder = encoder();
        let minimizer = PuzzleMinimizer::new(&encoder);
        let graph = Graph::grid(3, 3).unwrap();
        let map = PartialMap::from_sentinel(&[0, 3, 6, 7, 4, 1, 2, 5, 8]);
        let mut puzzle = Puzzle::new(graph, DiamondRelation::new(9), map).unwrap();

        assert_eq!(encoder.count_solutions(&puzzle, None).unwrap(), CountOutcome::Exact(1));
        assert!(!minimizer.is_good(&puzzle).unwrap());

        minimizer.makes_good(&mut puzzle).unwrap();
        assert!(minimizer.is_good(&puzzle).unwrap());
        assert_eq!(encoder.count_solutions(&puzzle, None).unwrap(), CountOutcome::Exact(1));
    }

    fn large_puzzle_with_hints() -> Puzzle {
        let mut puzzle = Puzzle::unconstrained(Graph::grid(7, 6).unwrap(), 0, 41).unwrap();
        puzzle.pin(1, 1).unwrap();
        puzzle.add_diamond(1, 2).unwrap();
        puzzle
    }

    #[test]
    fn test_timeouts_keep_hints() {
        let encoder = SatEncoder::with_backend(SolverBackend::Cadical, Some(Duration::from_nanos(1)));
        let minimizer = PuzzleMinimizer::new(&encoder);
        let original = large_puzzle_with_hints();

        assert_eq!(
            minimizer.check(&original).unwrap(),
            MinimalityReport::NotUnique(CountOutcome::Timeout)
        );
        assert!(!minimizer.is_good(&original).unwrap());

        let mut puzzle = original.clone();
        assert!(minimizer.makes_good(&mut puzzle).unwrap().is_empty());
        assert_eq!(puzzle, original);

        // A single probe that times out reports the hint as necessary
        for hint in original.hints() {
            let mut scratch = original.clone();
            assert!(!minimizer.still_unique_without(&mut scratch, &hint).unwrap());
        }
    }

    #[test]
    fn test_unknown_hint_is_an_error() {
        let encoder = encoder();
        let minimizer = PuzzleMinimizer::new(&encoder);
        let mut puzzle = scenario_puzzle();

        assert!(minimizer
            .still_unique_without(&mut puzzle, &Hint::Diamond(99, 0))
            .is_err());
        assert_eq!(puzzle, scenario_puzzle());
    }

    #[test]
    fn test_two_vertex_puzzle_is_minimal() {
        let encoder = encoder();
        let minimizer = PuzzleMinimizer::new(&encoder);
        let puzzle = Puzzle::unconstrained(Graph::complete(2).unwrap(), 0, 1).unwrap();
        assert!(minimizer.is_good(&puzzle).unwrap());
    }
}
