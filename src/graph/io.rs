//! File I/O for graphs
//!
//! Text format: one line per vertex, `v: n1 n2 ...`. Blank lines and lines
//! starting with `#` are ignored. Vertices must be listed in order `0..n`.

use super::Graph;
use anyhow::{Context, Result};
use std::path::Path;

/// Load a graph from an adjacency-list text file
pub fn load_graph_from_file<P: AsRef<Path>>(path: P) -> Result<Graph> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read graph file: {}", path.as_ref().display()))?;

    parse_graph_from_string(&content)
        .with_context(|| format!("Failed to parse graph from file: {}", path.as_ref().display()))
}

/// Parse a graph from its adjacency-list text representation
pub fn parse_graph_from_string(content: &str) -> Result<Graph> {
    let mut adjacency = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (vertex, rest) = line
            .split_once(':')
            .with_context(|| format!("Line {}: expected `vertex: neighbors...`", line_idx + 1))?;

        let vertex: usize = vertex
            .trim()
            .parse()
            .with_context(|| format!("Line {}: invalid vertex id '{}'", line_idx + 1, vertex.trim()))?;

        if vertex != adjacency.len() {
            anyhow::bail!(
                "Line {}: vertex {} listed out of order, expected {}",
                line_idx + 1,
                vertex,
                adjacency.len()
            );
        }

        let neighbors = rest
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<usize>()
                    .with_context(|| format!("Line {}: invalid neighbor '{}'", line_idx + 1, token))
            })
            .collect::<Result<Vec<_>>>()?;

        adjacency.push(neighbors);
    }

    if adjacency.is_empty() {
        anyhow::bail!("Graph file is empty or contains no vertices");
    }

    Graph::from_adjacency(adjacency)
}

/// Save a graph to an adjacency-list text file
pub fn save_graph_to_file<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, graph.to_string())
        .with_context(|| format!("Failed to write graph to file: {}", path.as_ref().display()))?;

    Ok(())
}
