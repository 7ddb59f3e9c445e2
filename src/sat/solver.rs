//! SAT backend contract and the CaDiCaL implementation

use super::constraints::Clause;
use anyhow::Result;
use cadical::Solver;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Outcome of a single `solve` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Satisfiable,
    Unsatisfiable,
    Timeout,
}

/// Outcome of a model count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountOutcome {
    /// Enumeration finished
    Exact(u64),
    /// Enumeration stopped at the requested limit
    AtLeast(u64),
    Timeout,
}

impl CountOutcome {
    /// Exactly one model
    pub fn is_unique(&self) -> bool {
        matches!(self, CountOutcome::Exact(1))
    }

    /// Known number of models, `None` on timeout
    pub fn lower_bound(&self) -> Option<u64> {
        match *self {
            CountOutcome::Exact(n) | CountOutcome::AtLeast(n) => Some(n),
            CountOutcome::Timeout => None,
        }
    }
}

impl fmt::Display for CountOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountOutcome::Exact(n) => write!(f, "{}", n),
            CountOutcome::AtLeast(n) => write!(f, "at least {}", n),
            CountOutcome::Timeout => write!(f, "unknown (timeout)"),
        }
    }
}

/// A satisfying assignment
#[derive(Debug, Clone)]
pub struct SolverSolution {
    pub assignment: HashMap<i32, bool>,
    pub solve_time: Duration,
}

impl SolverSolution {
    /// Clause excluding exactly this assignment
    pub fn blocking_clause(&self) -> Clause {
        let mut literals: Vec<i32> = self
            .assignment
            .iter()
            .map(|(&var, &value)| if value { -var } else { var })
            .collect();
        literals.sort_by_key(|l| l.abs());
        Clause::new(literals)
    }

    /// Variables set to true, in increasing order
    pub fn true_variables(&self) -> Vec<i32> {
        let mut vars: Vec<i32> = self
            .assignment
            .iter()
            .filter(|(_, &value)| value)
            .map(|(&var, _)| var)
            .collect();
        vars.sort_unstable();
        vars
    }
}

/// Capabilities the encoder needs from a SAT engine
pub trait SatBackend {
    /// Add a disjunction of non-zero signed literals
    fn add_clause(&mut self, clause: &Clause) -> Result<()>;

    fn add_clauses(&mut self, clauses: &[Clause]) -> Result<()> {
        for clause in clauses {
            self.add_clause(clause)?;
        }
        Ok(())
    }

    fn solve(&mut self) -> Result<SolveStatus>;

    /// Status of the most recent `solve`
    fn status(&self) -> Option<SolveStatus>;

    /// Model of the most recent `solve`; only valid after `Satisfiable`
    fn model(&self) -> Result<SolverSolution>;

    fn variable_count(&self) -> usize;

    fn clause_count(&self) -> usize;

    fn name(&self) -> &'static str;

    /// Count models by repeatedly blocking the current one. Only valid after
    /// `Satisfiable`; the current model counts as the first. Leaves the
    /// blocking clauses in the solver.
    fn count_solutions(&mut self, limit: Option<u64>) -> Result<CountOutcome> {
        if self.status() != Some(SolveStatus::Satisfiable) {
            anyhow::bail!("count_solutions requires a satisfiable solve first");
        }

        let mut count = 0u64;
        loop {
            count += 1;
            if limit.is_some_and(|limit| count >= limit) {
                return Ok(CountOutcome::AtLeast(count));
            }

            let blocking = self.model()?.blocking_clause();
            if blocking.is_empty() {
                return Ok(CountOutcome::Exact(count));
            }
            self.add_clause(&blocking)?;

            match self.solve()? {
                SolveStatus::Satisfiable => continue,
                SolveStatus::Unsatisfiable => return Ok(CountOutcome::Exact(count)),
                SolveStatus::Timeout => return Ok(CountOutcome::Timeout),
            }
        }
    }
}

/// SAT solver wrapper for CaDiCaL
pub struct CadicalSolver {
    solver: Solver,
    variable_count: usize,
    clause_count: usize,
    timeout: Option<Duration>,
    status: Option<SolveStatus>,
    last_solve_time: Duration,
}

impl CadicalSolver {
    /// Create a new SAT solver instance
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variable_count: 0,
            clause_count: 0,
            timeout: None,
            status: None,
            last_solve_time: Duration::ZERO,
        }
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let mut solver = Self::new();
        solver.timeout = timeout;
        solver
    }

    /// Set solving timeout
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }
}

impl Default for CadicalSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SatBackend for CadicalSolver {
    fn add_clause(&mut self, clause: &Clause) -> Result<()> {
        if clause.is_empty() {
            anyhow::bail!("Cannot add empty clause (unsatisfiable)");
        }
        if clause.literals.contains(&0) {
            anyhow::bail!("Literal 0 is not allowed");
        }

        for &literal in &clause.literals {
            let var = literal.unsigned_abs() as usize;
            if var > self.variable_count {
                self.variable_count = var;
            }
        }

        self.solver.add_clause(clause.literals.iter().copied());
        self.clause_count += 1;
        Ok(())
    }

    fn solve(&mut self) -> Result<SolveStatus> {
        if let Some(timeout) = self.timeout {
            // Re-armed on every call so each solve gets the full budget
            self.solver
                .set_callbacks(Some(cadical::Timeout::new(timeout.as_secs_f32())));
        }

        let start_time = Instant::now();
        let result = self.solver.solve();
        self.last_solve_time = start_time.elapsed();

        let status = match result {
            Some(true) => SolveStatus::Satisfiable,
            Some(false) => SolveStatus::Unsatisfiable,
            None => SolveStatus::Timeout,
        };
        self.status = Some(status);
        Ok(status)
    }

    fn status(&self) -> Option<SolveStatus> {
        self.status
    }

    fn model(&self) -> Result<SolverSolution> {
        if self.status != Some(SolveStatus::Satisfiable) {
            anyhow::bail!("No model available: last solve was {:?}", self.status);
        }

        let mut assignment = HashMap::new();
        for var in 1..=self.variable_count as i32 {
            if let Some(value) = self.solver.value(var) {
                assignment.insert(var, value);
            }
        }

        Ok(SolverSolution {
            assignment,
            solve_time: self.last_solve_time,
        })
    }

    fn variable_count(&self) -> usize {
        self.variable_count
    }

    fn clause_count(&self) -> usize {
        self.clause_count
    }

    fn name(&self) -> &'static str {
        "cadical"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_creation() {
        let solver = CadicalSolver::new();
        assert_eq!(solver.variable_count(), 0);
        assert_eq!(solver.clause_count(), 0);
        assert_eq!(solver.status(), None);
    }

    #[test]
    fn test_simple_satisfiable() {
        let mut solver = CadicalSolver::new();

        // x1 ∨ x2, ¬x1 ∨ x2
        solver.add_clause(&Clause::new(vec![1, 2])).unwrap();
        solver.add_clause(&Clause::new(vec![-1, 2])).unwrap();

        assert_eq!(solver.solve().unwrap(), SolveStatus::Satisfiable);
        let assignment = solver.model().unwrap().assignment;
        assert_eq!(assignment.get(&2), Some(&true));
    }

    #[test]
    fn test_unsatisfiable() {
        let mut solver = CadicalSolver::new();
        solver.add_clause(&Clause::unit(1)).unwrap();
        solver.add_clause(&Clause::unit(-1)).unwrap();

        assert_eq!(solver.solve().unwrap(), SolveStatus::Unsatisfiable);
        assert!(solver.model().is_err());
        assert!(solver.count_solutions(None).is_err());
    }

    #[test]
    fn test_count_solutions() {
        let mut solver = CadicalSolver::new();
        // x1 ∨ x2 over two variables: three models
        solver.add_clause(&Clause::new(vec![1, 2])).unwrap();

        assert_eq!(solver.solve().unwrap(), SolveStatus::Satisfiable);
        assert_eq!(solver.count_solutions(None).unwrap(), CountOutcome::Exact(3));
    }

    #[test]
    fn test_count_solutions_with_limit() {
        let mut solver = CadicalSolver::new();
        solver.add_clause(&Clause::new(vec![1, 2, 3])).unwrap();

        assert_eq!(solver.solve().unwrap(), SolveStatus::Satisfiable);
        assert_eq!(solver.count_solutions(Some(2)).unwrap(), CountOutcome::AtLeast(2));
    }

    #[test]
    fn test_invalid_clauses() {
        let mut solver = CadicalSolver::new();
        assert!(solver.add_clause(&Clause::new(vec![])).is_err());
        assert!(solver.add_clause(&Clause::new(vec![1, 0])).is_err());
    }

    #[test]
    fn test_variable_count_tracking() {
        let mut solver = CadicalSolver::with_timeout(Some(Duration::from_secs(10)));

        solver.add_clause(&Clause::new(vec![1, -5, 3])).unwrap();
        assert_eq!(solver.variable_count(), 5);

        solver.add_clause(&Clause::new(vec![2, -7])).unwrap();
        assert_eq!(solver.variable_count(), 7);
        assert_eq!(solver.solve().unwrap(), SolveStatus::Satisfiable);
    }

    #[test]
    fn test_count_outcome_helpers() {
        assert!(CountOutcome::Exact(1).is_unique());
        assert!(!CountOutcome::AtLeast(1).is_unique());
        assert_eq!(CountOutcome::AtLeast(2).lower_bound(), Some(2));
        assert_eq!(CountOutcome::Timeout.lower_bound(), None);
    }
}
