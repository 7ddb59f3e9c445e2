//! Clause generation for the Rikudo SAT encoding

use super::VariableManager;
use crate::graph::Graph;
use crate::rikudo::{DiamondRelation, PartialMap};
use anyhow::Result;
use itertools::Itertools;

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub literals: Vec<i32>, // Positive for variable, negative for negation
}

impl Clause {
    /// Create a new clause from literals
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }

    /// Create a unit clause (single literal)
    pub fn unit(literal: i32) -> Self {
        Self { literals: vec![literal] }
    }

    /// Create a binary clause (two literals)
    pub fn binary(lit1: i32, lit2: i32) -> Self {
        Self { literals: vec![lit1, lit2] }
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Check if clause is unit
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }
}

/// Generates the clause groups of the position/vertex encoding
pub struct ConstraintGenerator<'a> {
    graph: &'a Graph,
    variables: VariableManager,
}

impl<'a> ConstraintGenerator<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        Self {
            graph,
            variables: VariableManager::new(graph.vertex_count()),
        }
    }

    /// Pinned positions become unit clauses
    pub fn partial_map_constraints(&self, partial_map: &PartialMap) -> Result<Vec<Clause>> {
        partial_map
            .assigned()
            .map(|(i, v)| Ok(Clause::unit(self.variables.position_variable(i, v)?)))
            .collect()
    }

    /// Each vertex occupies exactly one position
    pub fn vertex_occupancy_constraints(&self) -> Vec<Clause> {
        let n = self.graph.vertex_count();
        let mut clauses = Vec::new();

        for v in 0..n {
            let vars = self.variables.vertex_variables(v);
            clauses.extend(Self::pairwise_exclusion(&vars));
            clauses.push(Clause::new(vars));
        }

        clauses
    }

    /// Each position holds exactly one vertex
    pub fn position_occupancy_constraints(&self) -> Vec<Clause> {
        let n = self.graph.vertex_count();
        let mut clauses = Vec::new();

        for i in 0..n {
            let vars = self.variables.position_variables(i);
            clauses.extend(Self::pairwise_exclusion(&vars));
            clauses.push(Clause::new(vars));
        }

        clauses
    }

    /// Consecutive positions hold graph-adjacent vertices. With `closed`
    /// the last position also wraps around to the first.
    pub fn adjacency_constraints(&self, closed: bool) -> Vec<Clause> {
        let n = self.graph.vertex_count();
        let steps = if closed && n > 1 { n } else { n.saturating_sub(1) };
        let mut clauses = Vec::new();

        for i in 0..steps {
            let next = (i + 1) % n;
            for u in 0..n {
                for v in 0..n {
                    if !self.graph.has_edge(u, v) {
                        clauses.push(Clause::binary(-self.variables.var(i, u), -self.variables.var(next, v)));
                    }
                }
            }
        }

        clauses
    }

    /// For every diamond `(u, v)`, forbid any placement of `u` whose path
    /// neighbors both differ from `v`
    pub fn diamond_constraints(&self, diamonds: &DiamondRelation) -> Vec<Clause> {
        let n = self.graph.vertex_count();
        let mut clauses = Vec::new();
        if n < 2 {
            return clauses;
        }

        let x = |i: usize, v: usize| self.variables.var(i, v);

        for (u, v) in diamonds.pairs() {
            let others: Vec<usize> = self
                .graph
                .neighbors(u)
                .iter()
                .copied()
                .filter(|&w| w != v)
                .collect();

            // u first: its only neighbor is the successor
            for &v2 in &others {
                clauses.push(Clause::binary(-x(0, u), -x(1, v2)));
            }

            // u last: its only neighbor is the predecessor
            for &v1 in &others {
                clauses.push(Clause::binary(-x(n - 2, v1), -x(n - 1, u)));
            }

            for &v1 in &others {
                for &v2 in others.iter().filter(|&&w| w != v1) {
                    for i in 1..n - 1 {
                        clauses.push(Clause::new(vec![-x(i - 1, v1), -x(i, u), -x(i + 1, v2)]));
                    }
                }
            }
        }

        clauses
    }

    /// At most one of `vars` is true
    fn pairwise_exclusion(vars: &[i32]) -> impl Iterator<Item = Clause> + '_ {
        vars.iter()
            .tuple_combinations()
            .map(|(&a, &b)| Clause::binary(-a, -b))
    }

    pub fn variable_manager(&self) -> &VariableManager {
        &self.variables
    }
}
