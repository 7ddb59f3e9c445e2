//! Solved paths and solver outcomes

use super::Puzzle;
use crate::config::SolveMethod;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Ordered sequence of vertices, one per path position
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HamiltonianPath(Vec<usize>);

impl HamiltonianPath {
    pub fn new(vertices: Vec<usize>) -> Self {
        Self(vertices)
    }

    pub fn vertices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Vertex at a path position
    pub fn at(&self, position: usize) -> Option<usize> {
        self.0.get(position).copied()
    }

    /// Position of a vertex on the path
    pub fn position_of(&self, vertex: usize) -> Option<usize> {
        self.0.iter().position(|&v| v == vertex)
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }
}

impl From<Vec<usize>> for HamiltonianPath {
    fn from(vertices: Vec<usize>) -> Self {
        Self(vertices)
    }
}

impl fmt::Display for HamiltonianPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "[{}]", parts.join(" -> "))
    }
}

/// Result of a solve attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Solved(HamiltonianPath),
    Unsatisfiable,
    Timeout,
}

impl SolveOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SolveOutcome::Solved(_))
    }

    pub fn path(&self) -> Option<&HamiltonianPath> {
        match self {
            SolveOutcome::Solved(path) => Some(path),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<HamiltonianPath> {
        match self {
            SolveOutcome::Solved(path) => Some(path),
            _ => None,
        }
    }
}

impl fmt::Display for SolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveOutcome::Solved(path) => write!(f, "solved {}", path),
            SolveOutcome::Unsatisfiable => write!(f, "unsatisfiable"),
            SolveOutcome::Timeout => write!(f, "timeout"),
        }
    }
}

/// A solved puzzle together with how it was solved
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    pub path: HamiltonianPath,
    pub method: SolveMethod,
    #[serde(skip)]
    pub solve_time: Duration,
    pub metadata: SolutionMetadata,
}

/// Facts about the puzzle a solution belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionMetadata {
    pub id: String,
    pub vertex_count: usize,
    pub pinned_positions: usize,
    pub diamonds: usize,
    /// Share of positions given away by the partial map (0.0 to 1.0)
    pub pinned_ratio: f64,
}

impl Solution {
    pub fn new(puzzle: &Puzzle, path: HamiltonianPath, method: SolveMethod, solve_time: Duration) -> Self {
        let metadata = SolutionMetadata::analyze(puzzle, &path);
        Self {
            path,
            method,
            solve_time,
            metadata,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}

impl SolutionMetadata {
    pub fn analyze(puzzle: &Puzzle, path: &HamiltonianPath) -> Self {
        let vertex_count = puzzle.vertex_count();
        let pinned_positions = puzzle.partial_map().assigned_count();
        Self {
            id: Self::generate_id(path),
            vertex_count,
            pinned_positions,
            diamonds: puzzle.diamonds().pair_count(),
            pinned_ratio: pinned_positions as f64 / vertex_count as f64,
        }
    }

    fn generate_id(path: &HamiltonianPath) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        format!("path_{:x}", hasher.finish())
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution {} ({:?})", self.metadata.id, self.method)?;
        writeln!(f, "  Vertices: {}", self.metadata.vertex_count)?;
        writeln!(
            f,
            "  Hints: {} pinned ({:.1}%), {} diamonds",
            self.metadata.pinned_positions,
            self.metadata.pinned_ratio * 100.0,
            self.metadata.diamonds
        )?;
        writeln!(f, "  Solve time: {:.3}s", self.solve_time.as_secs_f64())?;
        writeln!(f, "  Path: {}", self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    #[test]
    fn test_path_accessors() {
        let path = HamiltonianPath::from(vec![2, 0, 1]);
        assert_eq!(path.at(0), Some(2));
        assert_eq!(path.position_of(1), Some(2));
        assert_eq!(path.to_string(), "[2 -> 0 -> 1]");
    }

    #[test]
    fn test_outcome_helpers() {
        let solved = SolveOutcome::Solved(vec![0, 1].into());
        assert!(solved.is_solved());
        assert_eq!(solved.path().map(HamiltonianPath::len), Some(2));
        assert!(SolveOutcome::Timeout.into_path().is_none());
    }

    #[test]
    fn test_solution_json() {
        let puzzle = Puzzle::unconstrained(Graph::cycle(4).unwrap(), 0, 3).unwrap();
        let path = HamiltonianPath::from(vec![0, 1, 2, 3]);
        let solution = Solution::new(&puzzle, path.clone(), SolveMethod::Sat, Duration::from_millis(5));

        assert_eq!(solution.metadata.pinned_positions, 2);
        assert!(solution.metadata.id.starts_with("path_"));

        let back = Solution::from_json(&solution.to_json().unwrap()).unwrap();
        assert_eq!(back.path, path);
        assert_eq!(back.method, SolveMethod::Sat);
    }
}
