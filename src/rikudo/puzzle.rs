//! Puzzle definition: graph, partial map and diamond relation

use crate::error::PuzzleError;
use crate::graph::Graph;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Known correspondence between path positions and vertices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartialMap {
    slots: Vec<Option<usize>>,
}

impl PartialMap {
    /// Map of length `n` with nothing assigned
    pub fn empty(n: usize) -> Self {
        Self { slots: vec![None; n] }
    }

    /// Map of length `n` with only the two endpoints pinned
    pub fn with_endpoints(n: usize, start: usize, end: usize) -> Self {
        let mut map = Self::empty(n);
        if n > 0 {
            map.slots[0] = Some(start);
            map.slots[n - 1] = Some(end);
        }
        map
    }

    pub fn from_slots(slots: Vec<Option<usize>>) -> Self {
        Self { slots }
    }

    /// Build from the `-1 = unknown` notation
    pub fn from_sentinel(values: &[i64]) -> Self {
        Self {
            slots: values
                .iter()
                .map(|&v| if v < 0 { None } else { Some(v as usize) })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<usize> {
        self.slots.get(position).copied().flatten()
    }

    pub fn is_assigned(&self, position: usize) -> bool {
        self.get(position).is_some()
    }

    /// Pin `vertex` at `position`, returning the previous entry
    pub fn set(&mut self, position: usize, vertex: usize) -> Result<Option<usize>> {
        let len = self.slots.len();
        match self.slots.get_mut(position) {
            Some(slot) => Ok(slot.replace(vertex)),
            None => anyhow::bail!("position {} out of range for a map of length {}", position, len),
        }
    }

    /// Forget the entry at `position`, returning it
    pub fn clear(&mut self, position: usize) -> Option<usize> {
        self.slots.get_mut(position).and_then(Option::take)
    }

    /// Assigned `(position, vertex)` pairs in position order
    pub fn assigned(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|v| (i, v)))
    }

    pub fn assigned_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Position a vertex is pinned to, if any
    pub fn position_of(&self, vertex: usize) -> Option<usize> {
        self.slots.iter().position(|&slot| slot == Some(vertex))
    }

    /// Whether every position is assigned
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn slots(&self) -> &[Option<usize>] {
        &self.slots
    }
}

/// Symmetric "must be consecutive" relation between vertices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiamondRelation {
    partners: Vec<BTreeSet<usize>>,
}

impl DiamondRelation {
    /// Empty relation over `n` vertices
    pub fn new(n: usize) -> Self {
        Self { partners: vec![BTreeSet::new(); n] }
    }

    /// Build from a list of unordered pairs
    pub fn from_pairs(n: usize, pairs: &[(usize, usize)]) -> Result<Self> {
        let mut relation = Self::new(n);
        for &(u, v) in pairs {
            relation.insert(u, v)?;
        }
        Ok(relation)
    }

    /// Add the pair in both directions. Returns false if already present.
    pub fn insert(&mut self, u: usize, v: usize) -> Result<bool> {
        let n = self.partners.len();
        if u >= n || v >= n || u == v {
            return Err(PuzzleError::InvalidDiamond(u, v).into());
        }
        let added = self.partners[u].insert(v);
        self.partners[v].insert(u);
        Ok(added)
    }

    /// Remove the pair in both directions. Returns false if it was absent.
    pub fn remove(&mut self, u: usize, v: usize) -> bool {
        if !self.contains(u, v) {
            return false;
        }
        self.partners[u].remove(&v);
        self.partners[v].remove(&u);
        true
    }

    pub fn contains(&self, u: usize, v: usize) -> bool {
        self.partners.get(u).is_some_and(|set| set.contains(&v))
    }

    /// Vertices forced to be path-adjacent to `v`; empty for unknown vertices
    pub fn partners(&self, v: usize) -> &BTreeSet<usize> {
        static NONE: BTreeSet<usize> = BTreeSet::new();
        self.partners.get(v).unwrap_or(&NONE)
    }

    /// Every pair once, as `(u, v)` with `u < v`, in lexicographic order
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        self.partners
            .iter()
            .enumerate()
            .flat_map(|(u, set)| set.iter().filter(move |&&v| v > u).map(move |&v| (u, v)))
            .collect()
    }

    pub fn pair_count(&self) -> usize {
        self.partners.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.partners.iter().all(BTreeSet::is_empty)
    }

    pub fn vertex_count(&self) -> usize {
        self.partners.len()
    }
}

/// A single removable piece of puzzle information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hint {
    /// Position `index` holds `vertex`
    Position { index: usize, vertex: usize },
    /// Vertices are consecutive on the path, order unspecified
    Diamond(usize, usize),
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hint::Position { index, vertex } => write!(f, "position {} = vertex {}", index, vertex),
            Hint::Diamond(u, v) => write!(f, "diamond ({}, {})", u, v),
        }
    }
}

/// A Rikudo puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    graph: Graph,
    diamonds: DiamondRelation,
    partial_map: PartialMap,
}

impl Puzzle {
    /// Create a puzzle, rejecting invalid hint sets
    pub fn new(graph: Graph, diamonds: DiamondRelation, partial_map: PartialMap) -> Result<Self> {
        let puzzle = Self {
            graph,
            diamonds,
            partial_map,
        };
        puzzle.validate()?;
        Ok(puzzle)
    }

    /// Puzzle with only the endpoints pinned and no diamonds
    pub fn unconstrained(graph: Graph, start: usize, end: usize) -> Result<Self> {
        let n = graph.vertex_count();
        let partial_map = PartialMap::with_endpoints(n, start, end);
        Self::new(graph, DiamondRelation::new(n), partial_map)
    }

    /// Check the structural invariants: map length, vertex ranges, no vertex
    /// pinned twice, symmetric diamonds, at most two diamonds per vertex
    pub fn validate(&self) -> Result<()> {
        let n = self.graph.vertex_count();

        if self.partial_map.len() != n {
            return Err(PuzzleError::MapLengthMismatch {
                expected: n,
                actual: self.partial_map.len(),
            }
            .into());
        }

        let mut pinned_at: Vec<Option<usize>> = vec![None; n];
        for (position, vertex) in self.partial_map.assigned() {
            if vertex >= n {
                return Err(PuzzleError::VertexOutOfRange { vertex, vertex_count: n }.into());
            }
            if let Some(first) = pinned_at[vertex] {
                return Err(PuzzleError::DuplicateMapVertex {
                    vertex,
                    first,
                    second: position,
                }
                .into());
            }
            pinned_at[vertex] = Some(position);
        }

        if self.diamonds.vertex_count() != n {
            anyhow::bail!(
                "diamond relation covers {} vertices, graph has {}",
                self.diamonds.vertex_count(),
                n
            );
        }

        for u in 0..n {
            let partners = self.diamonds.partners(u);
            for &v in partners {
                if v >= n || v == u || !self.diamonds.contains(v, u) {
                    return Err(PuzzleError::InvalidDiamond(u, v).into());
                }
            }
            if partners.len() > 2 {
                return Err(PuzzleError::TooManyDiamonds {
                    vertex: u,
                    count: partners.len(),
                }
                .into());
            }
        }

        Ok(())
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn diamonds(&self) -> &DiamondRelation {
        &self.diamonds
    }

    pub fn partial_map(&self) -> &PartialMap {
        &self.partial_map
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.vertex_count()
    }

    /// Pinned start and end vertices
    pub fn endpoints(&self) -> Option<(usize, usize)> {
        let n = self.vertex_count();
        Some((self.partial_map.get(0)?, self.partial_map.get(n - 1)?))
    }

    /// Every hint that may be dropped: interior partial-map entries first,
    /// then diamond pairs. Endpoints are never listed.
    pub fn hints(&self) -> Vec<Hint> {
        let n = self.vertex_count();
        let positions = self
            .partial_map
            .assigned()
            .filter(|&(i, _)| i > 0 && i + 1 < n)
            .map(|(index, vertex)| Hint::Position { index, vertex });
        let diamonds = self.diamonds.pairs().into_iter().map(|(u, v)| Hint::Diamond(u, v));
        positions.chain(diamonds).collect()
    }

    /// Number of hints, endpoints included
    pub fn hint_count(&self) -> usize {
        self.partial_map.assigned_count() + self.diamonds.pair_count()
    }

    /// Pin a position. Fails if that would break the puzzle invariants.
    pub fn pin(&mut self, position: usize, vertex: usize) -> Result<()> {
        if position >= self.vertex_count() {
            anyhow::bail!("position {} out of range for {} vertices", position, self.vertex_count());
        }
        let previous = self.partial_map.set(position, vertex)?;
        if let Err(e) = self.validate() {
            match previous {
                Some(p) => {
                    self.partial_map.set(position, p)?;
                }
                None => {
                    self.partial_map.clear(position);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    /// Forget a position, returning the vertex that was pinned there
    pub fn unpin(&mut self, position: usize) -> Option<usize> {
        self.partial_map.clear(position)
    }

    /// Add a diamond. Fails if that would break the puzzle invariants.
    pub fn add_diamond(&mut self, u: usize, v: usize) -> Result<bool> {
        let n = self.vertex_count();
        if u >= n || v >= n || u == v {
            return Err(PuzzleError::InvalidDiamond(u, v).into());
        }
        let added = self.diamonds.insert(u, v)?;
        if let Err(e) = self.validate() {
            if added {
                self.diamonds.remove(u, v);
            }
            return Err(e);
        }
        Ok(added)
    }

    pub fn remove_diamond(&mut self, u: usize, v: usize) -> bool {
        self.diamonds.remove(u, v)
    }

    /// Drop a hint. Returns false if it was not present.
    pub fn remove_hint(&mut self, hint: &Hint) -> bool {
        match *hint {
            Hint::Position { index, vertex } => {
                if self.partial_map.get(index) == Some(vertex) {
                    self.partial_map.clear(index);
                    true
                } else {
                    false
                }
            }
            Hint::Diamond(u, v) => self.diamonds.remove(u, v),
        }
    }

    /// Put back a hint previously taken out with [`Puzzle::remove_hint`]
    pub fn restore_hint(&mut self, hint: &Hint) -> Result<()> {
        match *hint {
            Hint::Position { index, vertex } => {
                self.partial_map.set(index, vertex)?;
            }
            Hint::Diamond(u, v) => {
                self.diamonds.insert(u, v)?;
            }
        }
        Ok(())
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate a JSON puzzle
    pub fn from_json(json: &str) -> Result<Self> {
        let puzzle: Puzzle = serde_json::from_str(json).context("Failed to parse puzzle JSON")?;
        puzzle.validate()?;
        Ok(puzzle)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = self.to_json()?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write puzzle file: {}", path.as_ref().display()))?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read puzzle file: {}", path.as_ref().display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid puzzle in {}", path.as_ref().display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn scenario_puzzle() -> Puzzle {
        let graph = Graph::grid(3, 3).unwrap();
        let diamonds = DiamondRelation::from_pairs(9, &[(0, 3)]).unwrap();
        let map = PartialMap::from_sentinel(&[0, 3, -1, -1, -1, -1, -1, -1, 8]);
        Puzzle::new(graph, diamonds, map).unwrap()
    }

    #[test]
    fn test_partial_map_sentinel() {
        let map = PartialMap::from_sentinel(&[0, -1, 2]);
        assert_eq!(map.get(0), Some(0));
        assert_eq!(map.get(1), None);
        assert_eq!(map.assigned_count(), 2);
        assert_eq!(map.position_of(2), Some(2));
        assert!(!map.is_complete());
    }

    #[test]
    fn test_diamond_relation_is_symmetric() {
        let mut diamonds = DiamondRelation::new(4);
        assert!(diamonds.insert(2, 1).unwrap());
        assert!(!diamonds.insert(1, 2).unwrap());
        assert!(diamonds.contains(1, 2));
        assert!(diamonds.contains(2, 1));
        assert_eq!(diamonds.pairs(), vec![(1, 2)]);

        assert!(diamonds.remove(1, 2));
        assert!(!diamonds.contains(2, 1));
        assert!(diamonds.is_empty());
    }

    #[test]
    fn test_hints_skip_endpoints() {
        let puzzle = scenario_puzzle();
        assert_eq!(
            puzzle.hints(),
            vec![Hint::Position { index: 1, vertex: 3 }, Hint::Diamond(0, 3)]
        );
        assert_eq!(puzzle.hint_count(), 4);
        assert_eq!(puzzle.endpoints(), Some((0, 8)));
    }

    #[test]
    fn test_remove_and_restore_hint() {
        let mut puzzle = scenario_puzzle();
        let original = puzzle.clone();

        for hint in original.hints() {
            assert!(puzzle.remove_hint(&hint));
            assert_ne!(puzzle, original);
            puzzle.restore_hint(&hint).unwrap();
            assert_eq!(puzzle, original);
        }
    }

    #[test]
    fn test_too_many_diamonds_rejected() {
        let graph = Graph::complete(5).unwrap();
        let diamonds = DiamondRelation::from_pairs(5, &[(0, 1), (0, 2), (0, 3)]).unwrap();
        let err = Puzzle::new(graph, diamonds, PartialMap::with_endpoints(5, 1, 4)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PuzzleError>(),
            Some(&PuzzleError::TooManyDiamonds { vertex: 0, count: 3 })
        );
    }

    #[test]
    fn test_duplicate_map_vertex_rejected() {
        let graph = Graph::complete(4).unwrap();
        let map = PartialMap::from_sentinel(&[0, 2, 2, 3]);
        let err = Puzzle::new(graph, DiamondRelation::new(4), map).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PuzzleError>(),
            Some(&PuzzleError::DuplicateMapVertex { vertex: 2, first: 1, second: 2 })
        );
    }

    #[test]
    fn test_out_of_range_hints_are_rejected() {
        let mut puzzle = scenario_puzzle();
        let original = puzzle.clone();

        assert!(!puzzle.remove_hint(&Hint::Diamond(99, 0)));
        assert!(!puzzle.remove_hint(&Hint::Position { index: 42, vertex: 0 }));
        assert!(!puzzle.remove_diamond(0, 99));
        assert_eq!(puzzle.unpin(42), None);
        assert_eq!(puzzle, original);

        let err = puzzle.restore_hint(&Hint::Diamond(99, 0)).unwrap_err();
        assert_eq!(err.downcast_ref::<PuzzleError>(), Some(&PuzzleError::InvalidDiamond(99, 0)));
        assert!(puzzle.restore_hint(&Hint::Position { index: 42, vertex: 0 }).is_err());
        assert!(puzzle.pin(42, 0).is_err());
        assert_eq!(puzzle, original);

        assert!(puzzle.diamonds().partners(99).is_empty());
        let mut diamonds = DiamondRelation::new(3);
        assert!(diamonds.insert(1, 1).is_err());
        assert!(diamonds.insert(0, 3).is_err());
        assert!(!diamonds.remove(5, 0));
    }

    #[test]
    fn test_pin_rolls_back_on_error() {
        let mut puzzle = scenario_puzzle();
        assert!(puzzle.pin(2, 8).is_err());
        assert_eq!(puzzle.partial_map().get(2), None);
        assert!(puzzle.pin(2, 6).is_ok());
        assert_eq!(puzzle.partial_map().get(2), Some(6));
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("puzzle.json");
        let puzzle = scenario_puzzle();

        puzzle.save_to_file(&path).unwrap();
        let loaded = Puzzle::load_from_file(&path).unwrap();
        assert_eq!(puzzle, loaded);
    }
}
