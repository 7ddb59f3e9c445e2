//! Direct depth-first search for Rikudo solutions, no SAT solver involved

use super::{HamiltonianPath, Puzzle, SolveOutcome};
use crate::error::PuzzleError;
use crate::sat::CountOutcome;
use anyhow::Result;
use log::debug;
use std::fmt;

/// Counters for one search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Vertices pushed onto the path
    pub nodes: u64,
    /// Exhausted branches undone
    pub backtracks: u64,
    /// Complete paths reached
    pub solutions: u64,
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} nodes, {} backtracks, {} complete paths",
            self.nodes, self.backtracks, self.solutions
        )
    }
}

/// Mutable state of a search: explored markers and the path so far.
/// Every push is matched by a pop before a sibling candidate is tried.
struct SearchContext<'p> {
    puzzle: &'p Puzzle,
    end: usize,
    explored: Vec<bool>,
    path: Vec<usize>,
    /// Position each vertex is pinned to by the partial map
    pinned_at: Vec<Option<usize>>,
}

impl<'p> SearchContext<'p> {
    fn new(puzzle: &'p Puzzle, start: usize, end: usize) -> Self {
        let n = puzzle.vertex_count();
        let mut pinned_at = vec![None; n];
        for (position, vertex) in puzzle.partial_map().assigned() {
            pinned_at[vertex] = Some(position);
        }

        let mut context = Self {
            puzzle,
            end,
            explored: vec![false; n],
            path: Vec::with_capacity(n),
            pinned_at,
        };
        context.push(start);
        context
    }

    fn push(&mut self, vertex: usize) {
        self.explored[vertex] = true;
        self.path.push(vertex);
    }

    fn pop(&mut self) {
        if let Some(vertex) = self.path.pop() {
            self.explored[vertex] = false;
        }
    }

    fn is_complete(&self) -> bool {
        self.path.len() == self.puzzle.vertex_count()
    }

    fn predecessor_of_last(&self) -> Option<usize> {
        let len = self.path.len();
        (len >= 2).then(|| self.path[len - 2])
    }

    /// Whether the start vertex may sit at position 0
    fn start_is_admissible(&self) -> bool {
        let start = self.path[0];
        let n = self.puzzle.vertex_count();
        let map = self.puzzle.partial_map();

        let pinned_ok = map.get(0).map_or(true, |v| v == start)
            && self.pinned_at[start].map_or(true, |p| p == 0);
        // Position 0 has a single path neighbor
        let diamonds_ok = if n == 1 {
            self.puzzle.diamonds().partners(start).is_empty()
        } else {
            self.puzzle.diamonds().partners(start).len() <= 1
        };
        pinned_ok && diamonds_ok
    }

    /// Next vertices to try, in priority order
    fn candidates(&self) -> Vec<usize> {
        let graph = self.puzzle.graph();
        let diamonds = self.puzzle.diamonds();
        let n = self.puzzle.vertex_count();
        let i = self.path.len();
        let Some(&cur) = self.path.last() else {
            return Vec::new();
        };
        let reachable = |v: usize| graph.has_edge(cur, v) && !self.explored[v];

        let forced: Option<Vec<usize>> = if i == n - 1 {
            Some(vec![self.end])
        } else if let Some(v) = self.puzzle.partial_map().get(i) {
            Some(vec![v])
        } else {
            let partners = diamonds.partners(cur);
            match partners.len() {
                2 if partners.contains(&self.end) => Some(Vec::new()),
                2 => Some(partners.iter().copied().filter(|&v| !self.explored[v]).collect()),
                1 => match partners.first() {
                    Some(&v1) if v1 == self.end => Some(Vec::new()),
                    Some(&v1) if !self.explored[v1] => Some(vec![v1]),
                    // Already satisfied by the predecessor
                    Some(&v1) if self.predecessor_of_last() == Some(v1) => None,
                    _ => Some(Vec::new()),
                },
                _ => None,
            }
        };

        let candidates = match forced {
            Some(vertices) => vertices,
            None => graph
                .neighbors(cur)
                .iter()
                .copied()
                .filter(|&w| w != self.end)
                .collect(),
        };

        candidates
            .into_iter()
            .filter(|&w| reachable(w) && self.admits(cur, w, i))
            .collect()
    }

    /// Whether placing `w` at position `i` after `cur` keeps every pin and
    /// diamond satisfiable
    fn admits(&self, cur: usize, w: usize, i: usize) -> bool {
        let n = self.puzzle.vertex_count();
        let diamonds = self.puzzle.diamonds();

        if self.pinned_at[w].is_some_and(|p| p != i) {
            return false;
        }
        if self.puzzle.partial_map().get(i).is_some_and(|v| v != w) {
            return false;
        }

        // cur's path neighbors are now fixed: its predecessor and w
        let predecessor = self.predecessor_of_last();
        if diamonds
            .partners(cur)
            .iter()
            .any(|&p| p != w && Some(p) != predecessor)
        {
            return false;
        }

        // w still needs a successor for every other partner
        let mut pending = 0;
        for &p in diamonds.partners(w) {
            if p == cur {
                continue;
            }
            if self.explored[p] {
                return false;
            }
            pending += 1;
        }
        pending <= if i == n - 1 { 0 } else { 1 }
    }
}

/// Hamiltonian path search honouring partial map and diamonds
#[derive(Debug, Default)]
pub struct BacktrackingSolver {
    statistics: SearchStatistics,
}

impl BacktrackingSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters of the most recent search
    pub fn statistics(&self) -> SearchStatistics {
        self.statistics
    }

    /// First path from `start` to `end` that honours the puzzle's hints
    pub fn solve(&mut self, puzzle: &Puzzle, start: usize, end: usize) -> Result<SolveOutcome> {
        let mut first = None;
        self.search(puzzle, start, end, |path| {
            first = Some(HamiltonianPath::new(path.to_vec()));
            false
        })?;

        Ok(match first {
            Some(path) => SolveOutcome::Solved(path),
            None => SolveOutcome::Unsatisfiable,
        })
    }

    /// Solve between the endpoints pinned in the partial map
    pub fn solve_puzzle(&mut self, puzzle: &Puzzle) -> Result<SolveOutcome> {
        let (start, end) = pinned_endpoints(puzzle)?;
        self.solve(puzzle, start, end)
    }

    /// Enumerate every path, stopping once `limit` paths were found
    pub fn count_paths(
        &mut self,
        puzzle: &Puzzle,
        start: usize,
        end: usize,
        limit: Option<u64>,
    ) -> Result<CountOutcome> {
        let mut count = 0u64;
        self.search(puzzle, start, end, |_| {
            count += 1;
            !limit.is_some_and(|limit| count >= limit)
        })?;

        Ok(match limit {
            Some(limit) if count >= limit => CountOutcome::AtLeast(count),
            _ => CountOutcome::Exact(count),
        })
    }

    /// One path, returned only when at least `k` distinct paths exist
    pub fn find_if_at_least(
        &mut self,
        puzzle: &Puzzle,
        start: usize,
        end: usize,
        k: u64,
    ) -> Result<Option<HamiltonianPath>> {
        let wanted = k.max(1);
        let mut first = None;
        let mut count = 0u64;
        self.search(puzzle, start, end, |path| {
            if first.is_none() {
                first = Some(HamiltonianPath::new(path.to_vec()));
            }
            count += 1;
            count < wanted
        })?;

        Ok(if count >= wanted { first } else { None })
    }

    /// Drive the explicit-stack search, handing each complete path to
    /// `on_path`; stop as soon as it returns false
    fn search<F>(&mut self, puzzle: &Puzzle, start: usize, end: usize, mut on_path: F) -> Result<()>
    where
        F: FnMut(&[usize]) -> bool,
    {
        puzzle.validate()?;
        let n = puzzle.vertex_count();
        for vertex in [start, end] {
            if vertex >= n {
                return Err(PuzzleError::VertexOutOfRange { vertex, vertex_count: n }.into());
            }
        }

        self.statistics = SearchStatistics::default();
        if (n == 1) != (start == end) {
            debug!("No path: start {} and end {} on {} vertices", start, end, n);
            return Ok(());
        }

        let mut context = SearchContext::new(puzzle, start, end);
        self.statistics.nodes = 1;
        if !context.start_is_admissible() {
            return Ok(());
        }
        if context.is_complete() {
            self.statistics.solutions = 1;
            on_path(&context.path);
            return Ok(());
        }

        let mut stack: Vec<(Vec<usize>, usize)> = vec![(context.candidates(), 0)];
        while let Some((candidates, next)) = stack.last_mut() {
            let Some(&w) = candidates.get(*next) else {
                stack.pop();
                if !stack.is_empty() {
                    context.pop();
                    self.statistics.backtracks += 1;
                }
                continue;
            };
            *next += 1;

            context.push(w);
            self.statistics.nodes += 1;

            if context.is_complete() {
                self.statistics.solutions += 1;
                let keep_going = on_path(&context.path);
                context.pop();
                if !keep_going {
                    break;
                }
            } else {
                let candidates = context.candidates();
                stack.push((candidates, 0));
            }
        }

        debug!("Backtracking search: {}", self.statistics);
        Ok(())
    }
}

fn pinned_endpoints(puzzle: &Puzzle) -> Result<(usize, usize)> {
    let n = puzzle.vertex_count();
    let map = puzzle.partial_map();
    let start = map
        .get(0)
        .ok_or(PuzzleError::MissingEndpoint { position: 0 })?;
    let end = map
        .get(n - 1)
        .ok_or(PuzzleError::MissingEndpoint { position: n - 1 })?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::rikudo::{DiamondRelation, PartialMap};

    fn scenario_puzzle() -> Puzzle {
        let graph = Graph::grid(3, 3).unwrap();
        let diamonds = DiamondRelation::from_pairs(9, &[(0, 3)]).unwrap();
        let map = PartialMap::from_sentinel(&[0, 3, -1, -1, -1, -1, -1, -1, 8]);
        Puzzle::new(graph, diamonds, map).unwrap()
    }

    #[test]
    fn test_scenario() {
        let mut solver = BacktrackingSolver::new();
        let outcome = solver.solve(&scenario_puzzle(), 0, 8).unwrap();
        assert_eq!(outcome.path().unwrap().vertices(), &[0, 3, 6, 7, 4, 1, 2, 5, 8]);
        assert!(solver.statistics().nodes >= 9);
    }

    #[test]
    fn test_first_match_follows_neighbor_order() {
        let puzzle = Puzzle::unconstrained(Graph::grid(3, 3).unwrap(), 0, 8).unwrap();
        let mut solver = BacktrackingSolver::new();
        let outcome = solver.solve_puzzle(&puzzle).unwrap();
        assert_eq!(outcome.path().unwrap().vertices(), &[0, 1, 2, 5, 4, 3, 6, 7, 8]);
    }

    #[test]
    fn test_count_paths() {
        let puzzle = Puzzle::unconstrained(Graph::grid(3, 3).unwrap(), 0, 8).unwrap();
        let mut solver = BacktrackingSolver::new();
        assert_eq!(solver.count_paths(&puzzle, 0, 8, None).unwrap(), CountOutcome::Exact(2));
        assert_eq!(solver.count_paths(&puzzle, 0, 8, Some(1)).unwrap(), CountOutcome::AtLeast(1));
        assert_eq!(solver.count_paths(&scenario_puzzle(), 0, 8, None).unwrap(), CountOutcome::Exact(1));
    }

    #[test]
    fn test_find_if_at_least() {
        let puzzle = Puzzle::unconstrained(Graph::grid(3, 3).unwrap(), 0, 8).unwrap();
        let mut solver = BacktrackingSolver::new();
        assert!(solver.find_if_at_least(&puzzle, 0, 8, 2).unwrap().is_some());
        assert!(solver.find_if_at_least(&puzzle, 0, 8, 3).unwrap().is_none());
    }

    #[test]
    fn test_diamond_on_complete_graph() {
        // 0 -> ? -> ? -> 3 with 0 and 2 consecutive leaves only 0, 2, 1, 3
        let graph = Graph::complete(4).unwrap();
        let diamonds = DiamondRelation::from_pairs(4, &[(0, 2)]).unwrap();
        let puzzle = Puzzle::new(graph, diamonds, PartialMap::with_endpoints(4, 0, 3)).unwrap();

        let mut solver = BacktrackingSolver::new();
        assert_eq!(solver.count_paths(&puzzle, 0, 3, None).unwrap(), CountOutcome::Exact(1));
        let outcome = solver.solve(&puzzle, 0, 3).unwrap();
        assert_eq!(outcome.path().unwrap().vertices(), &[0, 2, 1, 3]);
    }

    #[test]
    fn test_diamond_with_end_vertex() {
        // 2 must be next to the end vertex 3, so it fills position 2
        let graph = Graph::complete(4).unwrap();
        let diamonds = DiamondRelation::from_pairs(4, &[(2, 3)]).unwrap();
        let puzzle = Puzzle::new(graph, diamonds, PartialMap::with_endpoints(4, 0, 3)).unwrap();

        let mut solver = BacktrackingSolver::new();
        let outcome = solver.solve(&puzzle, 0, 3).unwrap();
        assert_eq!(outcome.path().unwrap().vertices(), &[0, 1, 2, 3]);
        assert_eq!(solver.count_paths(&puzzle, 0, 3, None).unwrap(), CountOutcome::Exact(1));
    }

    #[test]
    fn test_pinned_position_respected() {
        let graph = Graph::complete(5).unwrap();
        let map = PartialMap::from_sentinel(&[0, -1, -1, 1, 4]);
        let puzzle = Puzzle::new(graph, DiamondRelation::new(5), map).unwrap();

        let mut solver = BacktrackingSolver::new();
        let outcome = solver.solve_puzzle(&puzzle).unwrap();
        let path = outcome.path().unwrap();
        assert_eq!(path.at(3), Some(1));
        assert_eq!(solver.count_paths(&puzzle, 0, 4, None).unwrap(), CountOutcome::Exact(2));
    }

    #[test]
    fn test_unsatisfiable_instances() {
        let mut solver = BacktrackingSolver::new();

        let grid = Puzzle::unconstrained(Graph::grid(3, 3).unwrap(), 0, 1).unwrap();
        assert_eq!(solver.solve(&grid, 0, 1).unwrap(), SolveOutcome::Unsatisfiable);

        let complete = Graph::complete(3).unwrap();
        let puzzle = Puzzle::new(complete, DiamondRelation::new(3), PartialMap::empty(3)).unwrap();
        assert_eq!(solver.solve(&puzzle, 1, 1).unwrap(), SolveOutcome::Unsatisfiable);
    }

    #[test]
    fn test_single_vertex() {
        let puzzle = Puzzle::unconstrained(Graph::complete(1).unwrap(), 0, 0).unwrap();
        let mut solver = BacktrackingSolver::new();
        let outcome = solver.solve(&puzzle, 0, 0).unwrap();
        assert_eq!(outcome.path().unwrap().vertices(), &[0]);
    }

    #[test]
    fn test_missing_endpoints() {
        let graph = Graph::complete(3).unwrap();
        let puzzle = Puzzle::new(graph, DiamondRelation::new(3), PartialMap::empty(3)).unwrap();
        let err = BacktrackingSolver::new().solve_puzzle(&puzzle).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PuzzleError>(),
            Some(PuzzleError::MissingEndpoint { position: 0 })
        ));
    }

    #[test]
    fn test_out_of_range_endpoint() {
        let puzzle = Puzzle::unconstrained(Graph::complete(3).unwrap(), 0, 2).unwrap();
        assert!(BacktrackingSolver::new().solve(&puzzle, 0, 7).is_err());
    }
}
