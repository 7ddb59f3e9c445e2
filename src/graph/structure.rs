//! Undirected graph over vertex ids `0..n`

use crate::error::PuzzleError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Adjacency-list graph. Symmetric, no self-loops, immutable once built.
///
/// Neighbor lists keep the order they were built in; the backtracking
/// search explores neighbors in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<usize>>", into = "Vec<Vec<usize>>")]
pub struct Graph {
    adjacency: Vec<Vec<usize>>,
}

impl Graph {
    /// Build a graph from adjacency lists, rejecting anything that is not a
    /// simple undirected graph
    pub fn from_adjacency(adjacency: Vec<Vec<usize>>) -> Result<Self> {
        let n = adjacency.len();
        if n == 0 {
            return Err(PuzzleError::EmptyGraph.into());
        }

        let mut adjacency = adjacency;
        for (u, neighbors) in adjacency.iter_mut().enumerate() {
            // Duplicate entries are harmless but would skew degrees
            let mut seen = vec![false; n];
            let mut deduped = Vec::with_capacity(neighbors.len());
            for &v in neighbors.iter() {
                if v >= n {
                    return Err(PuzzleError::VertexOutOfRange { vertex: v, vertex_count: n }.into());
                }
                if v == u {
                    return Err(PuzzleError::SelfLoop(u).into());
                }
                if !seen[v] {
                    seen[v] = true;
                    deduped.push(v);
                }
            }
            *neighbors = deduped;
        }

        for (u, neighbors) in adjacency.iter().enumerate() {
            for &v in neighbors {
                if !adjacency[v].contains(&u) {
                    return Err(PuzzleError::AsymmetricEdge { from: u, to: v }.into());
                }
            }
        }

        Ok(Self { adjacency })
    }

    /// Build a graph with `n` vertices from an undirected edge list
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self> {
        if n == 0 {
            return Err(PuzzleError::EmptyGraph.into());
        }

        let mut adjacency = vec![Vec::new(); n];
        for &(u, v) in edges {
            for w in [u, v] {
                if w >= n {
                    return Err(PuzzleError::VertexOutOfRange { vertex: w, vertex_count: n }.into());
                }
            }
            if u == v {
                return Err(PuzzleError::SelfLoop(u).into());
            }
            if !adjacency[u].contains(&v) {
                adjacency[u].push(v);
                adjacency[v].push(u);
            }
        }

        Ok(Self { adjacency })
    }

    /// Complete graph K_n
    pub fn complete(n: usize) -> Result<Self> {
        let adjacency = (0..n)
            .map(|k| (0..n).filter(|&i| i != k).collect())
            .collect();
        Self::from_adjacency(adjacency)
    }

    /// Cycle C_n: vertex k is adjacent to k-1 and k+1 (mod n)
    pub fn cycle(n: usize) -> Result<Self> {
        let edges: Vec<(usize, usize)> = match n {
            0 | 1 => Vec::new(),
            2 => vec![(0, 1)],
            _ => (0..n).map(|k| (k, (k + 1) % n)).collect(),
        };
        Self::from_edges(n, &edges)
    }

    /// Rectangular 4-neighbor lattice; vertex `row * width + col`
    pub fn grid(width: usize, height: usize) -> Result<Self> {
        let mut adjacency = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                let k = row * width + col;
                let mut neighbors = Vec::with_capacity(4);
                if row > 0 {
                    neighbors.push(k - width);
                }
                if col > 0 {
                    neighbors.push(k - 1);
                }
                if col + 1 < width {
                    neighbors.push(k + 1);
                }
                if row + 1 < height {
                    neighbors.push(k + width);
                }
                adjacency.push(neighbors);
            }
        }
        Self::from_adjacency(adjacency)
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adjacency[v]
    }

    pub fn degree(&self, v: usize) -> usize {
        self.adjacency[v].len()
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        u < self.adjacency.len() && self.adjacency[u].contains(&v)
    }

    pub fn contains_vertex(&self, v: usize) -> bool {
        v < self.adjacency.len()
    }

    /// Whether `path` visits every vertex exactly once along graph edges
    pub fn is_hamiltonian_path(&self, path: &[usize]) -> bool {
        let n = self.vertex_count();
        if path.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        for &v in path {
            if v >= n || seen[v] {
                return false;
            }
            seen[v] = true;
        }
        path.windows(2).all(|pair| self.has_edge(pair[0], pair[1]))
    }

    /// Raw adjacency lists
    pub fn adjacency(&self) -> &[Vec<usize>] {
        &self.adjacency
    }
}

impl TryFrom<Vec<Vec<usize>>> for Graph {
    type Error = anyhow::Error;

    fn try_from(adjacency: Vec<Vec<usize>>) -> Result<Self> {
        Self::from_adjacency(adjacency)
    }
}

impl From<Graph> for Vec<Vec<usize>> {
    fn from(graph: Graph) -> Self {
        graph.adjacency
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (v, neighbors) in self.adjacency.iter().enumerate() {
            write!(f, "{}:", v)?;
            for n in neighbors {
                write!(f, " {}", n)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
