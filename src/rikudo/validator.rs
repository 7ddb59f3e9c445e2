//! Independent check of a candidate path against a puzzle

use super::{HamiltonianPath, Puzzle};
use crate::error::PuzzleError;
use anyhow::Result;
use std::fmt;

/// One way a path fails a puzzle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    WrongLength { expected: usize, actual: usize },
    VertexOutOfRange { position: usize, vertex: usize },
    RepeatedVertex { vertex: usize, first: usize, second: usize },
    NotAdjacent { position: usize, from: usize, to: usize },
    PinMismatch { position: usize, expected: usize, actual: usize },
    DiamondBroken { u: usize, v: usize },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::WrongLength { expected, actual } => {
                write!(f, "path has {} vertices, expected {}", actual, expected)
            }
            Violation::VertexOutOfRange { position, vertex } => {
                write!(f, "position {} holds unknown vertex {}", position, vertex)
            }
            Violation::RepeatedVertex { vertex, first, second } => {
                write!(f, "vertex {} visited at positions {} and {}", vertex, first, second)
            }
            Violation::NotAdjacent { position, from, to } => {
                write!(f, "step {} -> {} at position {} is not an edge", from, to, position)
            }
            Violation::PinMismatch {
                position,
                expected,
                actual,
            } => write!(
                f,
                "position {} is pinned to {} but holds {}",
                position, expected, actual
            ),
            Violation::DiamondBroken { u, v } => {
                write!(f, "diamond ({}, {}) is not consecutive on the path", u, v)
            }
        }
    }
}

/// Result of path validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation Result:")?;
        writeln!(f, "  Valid: {}", if self.is_valid { "✓" } else { "✗" })?;
        if !self.violations.is_empty() {
            writeln!(f, "  Violations ({}):", self.violations.len())?;
            for violation in self.violations.iter().take(10) {
                writeln!(f, "    {}", violation)?;
            }
            if self.violations.len() > 10 {
                writeln!(f, "    ... and {} more", self.violations.len() - 10)?;
            }
        }
        Ok(())
    }
}

/// Checks adjacency, permutation, partial map and diamonds
pub struct PathValidator;

impl PathValidator {
    /// Collect every violation of `path` against `puzzle`
    pub fn validate(puzzle: &Puzzle, path: &HamiltonianPath) -> ValidationResult {
        let n = puzzle.vertex_count();
        let vertices = path.vertices();
        let mut violations = Vec::new();

        if vertices.len() != n {
            violations.push(Violation::WrongLength {
                expected: n,
                actual: vertices.len(),
            });
        }

        let mut seen_at: Vec<Option<usize>> = vec![None; n];
        for (position, &vertex) in vertices.iter().enumerate() {
            if vertex >= n {
                violations.push(Violation::VertexOutOfRange { position, vertex });
                continue;
            }
            match seen_at[vertex] {
                Some(first) => violations.push(Violation::RepeatedVertex {
                    vertex,
                    first,
                    second: position,
                }),
                None => seen_at[vertex] = Some(position),
            }
        }

        let graph = puzzle.graph();
        for (position, pair) in vertices.windows(2).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            if from < n && to < n && !graph.has_edge(from, to) {
                violations.push(Violation::NotAdjacent {
                    position: position + 1,
                    from,
                    to,
                });
            }
        }

        for (position, expected) in puzzle.partial_map().assigned() {
            if let Some(actual) = path.at(position) {
                if actual != expected {
                    violations.push(Violation::PinMismatch {
                        position,
                        expected,
                        actual,
                    });
                }
            }
        }

        for (u, v) in puzzle.diamonds().pairs() {
            let consecutive = match (seen_at[u], seen_at[v]) {
                (Some(a), Some(b)) => a.abs_diff(b) == 1,
                _ => false,
            };
            if !consecutive {
                violations.push(Violation::DiamondBroken { u, v });
            }
        }

        ValidationResult {
            is_valid: violations.is_empty(),
            violations,
        }
    }

    /// Fail with [`PuzzleError::NotAHamiltonianPath`] unless `path` solves `puzzle`
    pub fn ensure_valid(puzzle: &Puzzle, path: &HamiltonianPath) -> Result<()> {
        let result = Self::validate(puzzle, path);
        if let Some(first) = result.violations.first() {
            return Err(PuzzleError::NotAHamiltonianPath(format!("{}: {}", path, first)).into());
        }
        Ok(())
    }
}
