//! Variable numbering for the position/vertex encoding

use anyhow::Result;

/// Maps `x[i, v]` ("position i holds vertex v") to the SAT id
/// `i + n * v + 1`. Ids start at 1; 0 is not a valid literal.
#[derive(Debug, Clone, Copy)]
pub struct VariableManager {
    vertex_count: usize,
}

impl VariableManager {
    pub fn new(vertex_count: usize) -> Self {
        Self { vertex_count }
    }

    /// SAT id of `x[position, vertex]`
    pub fn position_variable(&self, position: usize, vertex: usize) -> Result<i32> {
        let n = self.vertex_count;
        if position >= n {
            anyhow::bail!("Position {} out of bounds (vertices: {})", position, n);
        }
        if vertex >= n {
            anyhow::bail!("Vertex {} out of bounds (vertices: {})", vertex, n);
        }
        Ok(self.var(position, vertex))
    }

    /// Unchecked id, for loops already bounded by `0..n`
    #[inline]
    pub(crate) fn var(&self, position: usize, vertex: usize) -> i32 {
        (position + self.vertex_count * vertex + 1) as i32
    }

    /// Inverse of [`VariableManager::position_variable`]: `(position, vertex)`
    pub fn decode(&self, id: i32) -> Option<(usize, usize)> {
        if id <= 0 || id as usize > self.variable_count() {
            return None;
        }
        let k = id as usize - 1;
        Some((k % self.vertex_count, k / self.vertex_count))
    }

    /// All position variables of one vertex
    pub fn vertex_variables(&self, vertex: usize) -> Vec<i32> {
        (0..self.vertex_count).map(|i| self.var(i, vertex)).collect()
    }

    /// All vertex variables of one position
    pub fn position_variables(&self, position: usize) -> Vec<i32> {
        (0..self.vertex_count).map(|v| self.var(position, v)).collect()
    }

    /// Total number of variables, `n * n`
    pub fn variable_count(&self) -> usize {
        self.vertex_count * self.vertex_count
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}
