//! Pure-Rust SAT backend built on varisat

use super::constraints::Clause;
use super::solver::{SatBackend, SolveStatus, SolverSolution};
use anyhow::Result;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use varisat::{ExtendFormula, Lit, Solver};

/// varisat has no interrupt hook, so this backend never reports a timeout
pub struct VarisatSolver {
    solver: Solver<'static>,
    variable_count: usize,
    clause_count: usize,
    status: Option<SolveStatus>,
    model: Option<HashMap<i32, bool>>,
    last_solve_time: Duration,
}

impl VarisatSolver {
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variable_count: 0,
            clause_count: 0,
            status: None,
            model: None,
            last_solve_time: Duration::ZERO,
        }
    }
}

impl Default for VarisatSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SatBackend for VarisatSolver {
    fn add_clause(&mut self, clause: &Clause) -> Result<()> {
        if clause.is_empty() {
            anyhow::bail!("Cannot add empty clause (unsatisfiable)");
        }
        if clause.literals.contains(&0) {
            anyhow::bail!("Literal 0 is not allowed");
        }

        let lits: Vec<Lit> = clause
            .literals
            .iter()
            .map(|&literal| {
                self.variable_count = self.variable_count.max(literal.unsigned_abs() as usize);
                Lit::from_dimacs(literal as isize)
            })
            .collect();

        self.solver.add_clause(&lits);
        self.clause_count += 1;
        Ok(())
    }

    fn solve(&mut self) -> Result<SolveStatus> {
        let start_time = Instant::now();
        let result = self.solver.solve();
        self.last_solve_time = start_time.elapsed();

        let status = match result {
            Ok(true) => {
                self.model = self.solver.model().map(|lits| {
                    lits.into_iter()
                        .map(|lit| (lit.var().to_dimacs() as i32, lit.is_positive()))
                        .collect()
                });
                SolveStatus::Satisfiable
            }
            Ok(false) => {
                self.model = None;
                SolveStatus::Unsatisfiable
            }
            Err(e) => anyhow::bail!("varisat failed: {}", e),
        };

        self.status = Some(status);
        Ok(status)
    }

    fn status(&self) -> Option<SolveStatus> {
        self.status
    }

    fn model(&self) -> Result<SolverSolution> {
        match (&self.status, &self.model) {
            (Some(SolveStatus::Satisfiable), Some(model)) => Ok(SolverSolution {
                assignment: model.clone(),
                solve_time: self.last_solve_time,
            }),
            _ => anyhow::bail!("No model available: last solve was {:?}", self.status),
        }
    }

    fn variable_count(&self) -> usize {
        self.variable_count
    }

    fn clause_count(&self) -> usize {
        self.clause_count
    }

    fn name(&self) -> &'static str {
        "varisat"
    }
}
