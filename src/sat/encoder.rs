//! SAT encoder for Rikudo puzzles

use super::constraints::{Clause, ConstraintGenerator};
use super::solver::{CountOutcome, SatBackend, SolveStatus, SolverSolution};
use super::solver_factory::create_backend;
use super::VariableManager;
use crate::config::{SolverBackend, SolverConfig};
use crate::error::PuzzleError;
use crate::graph::Graph;
use crate::rikudo::{HamiltonianPath, Puzzle, SolveOutcome};
use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// A complete clause set ready for a backend
#[derive(Debug, Clone)]
pub struct Formula {
    pub clauses: Vec<Clause>,
    pub variable_count: usize,
    /// Set when the hints contradicted each other and the clauses were
    /// replaced by [`Formula::unsatisfiable`]
    pub trivially_unsat: bool,
    pub statistics: EncodingStatistics,
}

impl Formula {
    /// Smallest formula every backend rejects: all four sign combinations
    /// over two variables
    pub fn unsatisfiable() -> Self {
        let clauses = vec![
            Clause::binary(1, 2),
            Clause::binary(-1, -2),
            Clause::binary(-1, 2),
            Clause::binary(1, -2),
        ];
        Self {
            statistics: EncodingStatistics {
                total_variables: 2,
                total_clauses: clauses.len(),
                ..Default::default()
            },
            clauses,
            variable_count: 2,
            trivially_unsat: true,
        }
    }
}

/// Encodes puzzles and drives a fresh backend for every query
pub struct SatEncoder {
    backend: SolverBackend,
    timeout: Option<Duration>,
}

impl SatEncoder {
    pub fn new(config: &SolverConfig) -> Self {
        Self::with_backend(config.backend, config.timeout())
    }

    pub fn with_backend(backend: SolverBackend, timeout: Option<Duration>) -> Self {
        Self { backend, timeout }
    }

    pub fn backend(&self) -> SolverBackend {
        self.backend
    }

    /// Build the clause set of a puzzle
    pub fn formula(&self, puzzle: &Puzzle) -> Result<Formula> {
        puzzle.validate().context("Cannot encode an invalid puzzle")?;

        let graph = puzzle.graph();
        let generator = ConstraintGenerator::new(graph);

        let partial_map = generator.partial_map_constraints(puzzle.partial_map())?;
        let vertex = generator.vertex_occupancy_constraints();
        let position = generator.position_occupancy_constraints();
        let adjacency = generator.adjacency_constraints(false);
        let diamond = generator.diamond_constraints(puzzle.diamonds());

        let statistics = EncodingStatistics {
            vertex_count: graph.vertex_count(),
            total_variables: generator.variable_manager().variable_count(),
            partial_map_clauses: partial_map.len(),
            vertex_clauses: vertex.len(),
            position_clauses: position.len(),
            adjacency_clauses: adjacency.len(),
            diamond_clauses: diamond.len(),
            total_clauses: partial_map.len()
                + vertex.len()
                + position.len()
                + adjacency.len()
                + diamond.len(),
        };

        let fixed: HashSet<i32> = partial_map.iter().map(|clause| clause.literals[0]).collect();
        let clauses: Vec<Clause> = partial_map
            .into_iter()
            .chain(vertex)
            .chain(position)
            .chain(adjacency)
            .chain(diamond)
            .collect();

        if let Some(clause) = clauses.iter().find(|clause| falsified_by(clause, &fixed)) {
            info!(
                "Pinned positions contradict clause {:?}; using the canonical unsatisfiable formula",
                clause.literals
            );
            return Ok(Formula::unsatisfiable());
        }

        debug!(
            "Encoded puzzle: {} variables, {} clauses",
            statistics.total_variables, statistics.total_clauses
        );

        Ok(Formula {
            clauses,
            variable_count: statistics.total_variables,
            trivially_unsat: false,
            statistics,
        })
    }

    /// Find one solution path
    pub fn solve(&self, puzzle: &Puzzle) -> Result<SolveOutcome> {
        let formula = self.formula(puzzle)?;
        let mut solver = self.load(&formula)?;

        match solver.solve()? {
            SolveStatus::Satisfiable => {
                let path = decode_path(puzzle.vertex_count(), &solver.model()?)?;
                if !puzzle.graph().is_hamiltonian_path(path.vertices()) {
                    return Err(PuzzleError::NotAHamiltonianPath(path.to_string()).into());
                }
                Ok(SolveOutcome::Solved(path))
            }
            SolveStatus::Unsatisfiable => Ok(SolveOutcome::Unsatisfiable),
            SolveStatus::Timeout => Ok(SolveOutcome::Timeout),
        }
    }

    /// Count solution paths, stopping early once `limit` is reached
    pub fn count_solutions(&self, puzzle: &Puzzle, limit: Option<u64>) -> Result<CountOutcome> {
        let formula = self.formula(puzzle)?;
        let mut solver = self.load(&formula)?;

        let outcome = match solver.solve()? {
            SolveStatus::Satisfiable => solver.count_solutions(limit)?,
            SolveStatus::Unsatisfiable => CountOutcome::Exact(0),
            SolveStatus::Timeout => CountOutcome::Timeout,
        };
        debug!("Solution count: {}", outcome);
        Ok(outcome)
    }

    /// Count with limit 2, enough to decide uniqueness
    pub fn uniqueness(&self, puzzle: &Puzzle) -> Result<CountOutcome> {
        self.count_solutions(puzzle, Some(2))
    }

    /// Find a Hamiltonian cycle: the path encoding with the last position
    /// adjacent to the first and no hints
    pub fn hamiltonian_cycle(&self, graph: &Graph) -> Result<SolveOutcome> {
        let n = graph.vertex_count();
        let generator = ConstraintGenerator::new(graph);

        let mut clauses = generator.vertex_occupancy_constraints();
        clauses.extend(generator.position_occupancy_constraints());
        clauses.extend(generator.adjacency_constraints(true));

        let mut solver = create_backend(self.backend, self.timeout);
        solver.add_clauses(&clauses)?;

        match solver.solve()? {
            SolveStatus::Satisfiable => {
                let path = decode_path(n, &solver.model()?)?;
                let closes = n < 2 || graph.has_edge(path.vertices()[n - 1], path.vertices()[0]);
                if !graph.is_hamiltonian_path(path.vertices()) || !closes {
                    return Err(PuzzleError::NotAHamiltonianPath(path.to_string()).into());
                }
                Ok(SolveOutcome::Solved(path))
            }
            SolveStatus::Unsatisfiable => Ok(SolveOutcome::Unsatisfiable),
            SolveStatus::Timeout => Ok(SolveOutcome::Timeout),
        }
    }

    fn load(&self, formula: &Formula) -> Result<Box<dyn SatBackend>> {
        let mut solver = create_backend(self.backend, self.timeout);
        solver
            .add_clauses(&formula.clauses)
            .context("Failed to add clauses to SAT solver")?;
        Ok(solver)
    }
}

/// True when every literal negates a variable forced true by a unit clause
fn falsified_by(clause: &Clause, fixed: &HashSet<i32>) -> bool {
    clause.literals.iter().all(|&lit| lit < 0 && fixed.contains(&-lit))
}

/// Turn a model into the path it encodes
fn decode_path(n: usize, solution: &SolverSolution) -> Result<HamiltonianPath> {
    let variables = VariableManager::new(n);
    let mut slots: Vec<Option<usize>> = vec![None; n];

    for var in solution.true_variables() {
        if let Some((position, vertex)) = variables.decode(var) {
            if let Some(previous) = slots[position].replace(vertex) {
                anyhow::bail!(
                    "Model places vertices {} and {} at position {}",
                    previous,
                    vertex,
                    position
                );
            }
        }
    }

    let vertices = slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| slot.with_context(|| format!("Model leaves position {} empty", i)))
        .collect::<Result<Vec<_>>>()?;
    Ok(HamiltonianPath::new(vertices))
}

/// Statistics about the SAT encoding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodingStatistics {
    pub vertex_count: usize,
    pub total_variables: usize,
    pub partial_map_clauses: usize,
    pub vertex_clauses: usize,
    pub position_clauses: usize,
    pub adjacency_clauses: usize,
    pub diamond_clauses: usize,
    pub total_clauses: usize,
}

impl fmt::Display for EncodingStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SAT Encoding Statistics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(f, "  Partial map clauses: {}", self.partial_map_clauses)?;
        writeln!(f, "  Vertex occupancy clauses: {}", self.vertex_clauses)?;
        writeln!(f, "  Position occupancy clauses: {}", self.position_clauses)?;
        writeln!(f, "  Adjacency clauses: {}", self.adjacency_clauses)?;
        writeln!(f, "  Diamond clauses: {}", self.diamond_clauses)?;
        writeln!(f, "  Total clauses: {}", self.total_clauses)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rikudo::{DiamondRelation, PartialMap};
    use crate::sat::CadicalSolver;

    fn encoder(backend: SolverBackend) -> SatEncoder {
        SatEncoder::with_backend(backend, Some(Duration::from_secs(30)))
    }

    fn scenario_puzzle() -> Puzzle {
        let graph = Graph::grid(3, 3).unwrap();
        let diamonds = DiamondRelation::from_pairs(9, &[(0, 3)]).unwrap();
        let map = PartialMap::from_sentinel(&[0, 3, -1, -1, -1, -1, -1, -1, 8]);
        Puzzle::new(graph, diamonds, map).unwrap()
    }

    #[test]
    fn test_formula_statistics() {
        let puzzle = scenario_puzzle();
        let formula = encoder(SolverBackend::Cadical).formula(&puzzle).unwrap();

        assert!(!formula.trivially_unsat);
        assert_eq!(formula.variable_count, 81);
        let stats = &formula.statistics;
        assert_eq!(stats.partial_map_clauses, 3);
        assert_eq!(stats.vertex_clauses, 9 * (1 + 36));
        assert_eq!(stats.position_clauses, 9 * (1 + 36));
        // 81 ordered pairs minus 24 edge directions, per step
        assert_eq!(stats.adjacency_clauses, 8 * (81 - 24));
        assert_eq!(stats.diamond_clauses, 2);
        assert_eq!(stats.total_clauses, formula.clauses.len());
    }

    #[test]
    fn test_scenario_solves_with_both_backends() {
        let puzzle = scenario_puzzle();
        for backend in [SolverBackend::Cadical, SolverBackend::Varisat] {
            let outcome = encoder(backend).solve(&puzzle).unwrap();
            let path = outcome.path().unwrap();
            assert_eq!(path.vertices(), &[0, 3, 6, 7, 4, 1, 2, 5, 8]);
        }
    }

    #[test]
    fn test_scenario_count() {
        let puzzle = scenario_puzzle();
        let encoder = encoder(SolverBackend::Cadical);
        assert_eq!(encoder.count_solutions(&puzzle, None).unwrap(), CountOutcome::Exact(1));

        let open = Puzzle::unconstrained(Graph::grid(3, 3).unwrap(), 0, 8).unwrap();
        assert_eq!(encoder.count_solutions(&open, None).unwrap(), CountOutcome::Exact(2));
        assert_eq!(encoder.uniqueness(&open).unwrap(), CountOutcome::AtLeast(2));
    }

    #[test]
    fn test_contradictory_pins_give_canonical_unsat() {
        // 0 and 8 are not adjacent on the grid but are pinned consecutively
        let graph = Graph::grid(3, 3).unwrap();
        let map = PartialMap::from_sentinel(&[0, 8, -1, -1, -1, -1, -1, -1, 2]);
        let puzzle = Puzzle::new(graph, DiamondRelation::new(9), map).unwrap();

        let encoder = encoder(SolverBackend::Cadical);
        let formula = encoder.formula(&puzzle).unwrap();
        assert!(formula.trivially_unsat);
        assert_eq!(formula.variable_count, 2);
        assert_eq!(formula.clauses.len(), 4);

        assert_eq!(encoder.solve(&puzzle).unwrap(), SolveOutcome::Unsatisfiable);
        assert_eq!(encoder.count_solutions(&puzzle, None).unwrap(), CountOutcome::Exact(0));
    }

    #[test]
    fn test_single_vertex() {
        let graph = Graph::complete(1).unwrap();
        let puzzle = Puzzle::unconstrained(graph, 0, 0).unwrap();
        let outcome = encoder(SolverBackend::Varisat).solve(&puzzle).unwrap();
        assert_eq!(outcome.path().unwrap().vertices(), &[0]);
    }

    #[test]
    fn test_hamiltonian_cycle() {
        let encoder = encoder(SolverBackend::Cadical);

        let cycle = encoder.hamiltonian_cycle(&Graph::cycle(5).unwrap()).unwrap();
        let path = cycle.path().unwrap();
        assert_eq!(path.len(), 5);

        // A 3x3 grid is bipartite with an odd vertex count
        let grid = encoder.hamiltonian_cycle(&Graph::grid(3, 3).unwrap()).unwrap();
        assert_eq!(grid, SolveOutcome::Unsatisfiable);
    }

    #[test]
    fn test_timeout_is_reported() {
        let encoder = SatEncoder::with_backend(SolverBackend::Cadical, Some(Duration::from_nanos(1)));
        let puzzle = Puzzle::unconstrained(Graph::grid(7, 6).unwrap(), 0, 41).unwrap();

        assert_eq!(encoder.solve(&puzzle).unwrap(), SolveOutcome::Timeout);
        assert_eq!(encoder.count_solutions(&puzzle, None).unwrap(), CountOutcome::Timeout);
        assert_eq!(encoder.uniqueness(&puzzle).unwrap(), CountOutcome::Timeout);
    }

    #[test]
    fn test_timeout_during_count() {
        let puzzle = Puzzle::unconstrained(Graph::grid(7, 6).unwrap(), 0, 41).unwrap();
        let formula = encoder(SolverBackend::Cadical).formula(&puzzle).unwrap();

        let mut solver = CadicalSolver::new();
        solver.add_clauses(&formula.clauses).unwrap();
        assert_eq!(solver.solve().unwrap(), SolveStatus::Satisfiable);

        // The first model is in hand; the re-solve after blocking it runs out of time
        solver.set_timeout(Duration::from_nanos(1));
        assert_eq!(solver.count_solutions(None).unwrap(), CountOutcome::Timeout);
        assert_eq!(solver.status(), Some(SolveStatus::Timeout));
    }

    #[test]
    fn test_decode_rejects_incomplete_model() {
        let mut assignment = std::collections::HashMap::new();
        assignment.insert(1, true);
        let solution = SolverSolution {
            assignment,
            solve_time: Duration::ZERO,
        };
        assert!(decode_path(2, &solution).is_err());
    }
}
