//! Typed validation errors for graphs and puzzles

use thiserror::Error;

/// Reasons a graph, puzzle or path is rejected before any solving happens
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("graph must contain at least one vertex")]
    EmptyGraph,

    #[error("vertex {vertex} out of range (graph has {vertex_count} vertices)")]
    VertexOutOfRange { vertex: usize, vertex_count: usize },

    #[error("vertex {0} is listed as its own neighbor")]
    SelfLoop(usize),

    #[error("edge {from} -> {to} has no matching edge {to} -> {from}")]
    AsymmetricEdge { from: usize, to: usize },

    #[error("partial map has {actual} positions, expected {expected}")]
    MapLengthMismatch { expected: usize, actual: usize },

    #[error("vertex {vertex} is pinned to both position {first} and position {second}")]
    DuplicateMapVertex { vertex: usize, first: usize, second: usize },

    #[error("vertex {vertex} takes part in {count} diamonds, at most 2 are possible")]
    TooManyDiamonds { vertex: usize, count: usize },

    #[error("invalid diamond ({0}, {1})")]
    InvalidDiamond(usize, usize),

    #[error("endpoint position {position} is not pinned")]
    MissingEndpoint { position: usize },

    #[error("not a Hamiltonian path: {0}")]
    NotAHamiltonianPath(String),
}
