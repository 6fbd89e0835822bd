//! Core data structures for declared names and the references between them

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// The set of non-ignored declaration names found in one source text.
///
/// Keeps discovery order so every downstream view is deterministic, but
/// membership is the only thing that carries meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredSet {
    names: Vec<String>,
    index: HashSet<String>,
}

impl DeclaredSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name. Returns false if it was already declared.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.index.contains(&name) {
            return false;
        }
        self.index.insert(name.clone());
        self.names.push(name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Names in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DeclaredSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = DeclaredSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

/// A directed reference from one declared name to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceEdge {
    pub from: String,
    pub to: String,
}

impl ReferenceEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Deduplicated edges in recording order.
///
/// A pair is stored once no matter how many times the body mentions the
/// target. Self-loops are ordinary edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSet {
    edges: Vec<ReferenceEdge>,
    seen: HashSet<ReferenceEdge>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edge. Returns false if the pair was already present.
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) -> bool {
        let edge = ReferenceEdge::new(from, to);
        if self.seen.contains(&edge) {
            return false;
        }
        self.seen.insert(edge.clone());
        self.edges.push(edge);
        true
    }

    pub fn contains(&self, from: &str, to: &str) -> bool {
        self.seen.contains(&ReferenceEdge::new(from, to))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceEdge> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Every name that appears as the `to` endpoint of some edge.
    pub fn targets(&self) -> HashSet<&str> {
        self.edges.iter().map(|e| e.to.as_str()).collect()
    }

    /// Outgoing targets grouped by source, each list in recording order.
    pub fn by_source(&self) -> HashMap<&str, Vec<&str>> {
        let mut grouped: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in &self.edges {
            grouped
                .entry(edge.from.as_str())
                .or_default()
                .push(edge.to.as_str());
        }
        grouped
    }
}

impl FromIterator<ReferenceEdge> for EdgeSet {
    fn from_iter<I: IntoIterator<Item = ReferenceEdge>>(iter: I) -> Self {
        let mut set = EdgeSet::new();
        for edge in iter {
            set.insert(edge.from, edge.to);
        }
        set
    }
}
