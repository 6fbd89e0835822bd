//! Graph view over declared names, backed by petgraph::DiGraph

use crate::model::{DeclaredSet, EdgeSet, ReferenceEdge};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::{debug, warn};

/// The full declared-name set plus every edge between members of it.
///
/// Construction enforces that both endpoints of every edge are nodes.
/// Edges that would break this are discarded, never stored.
pub struct GraphView {
    inner: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
    dropped_edges: usize,
}

impl std::fmt::Debug for GraphView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphView")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .field("dropped_edges", &self.dropped_edges)
            .finish()
    }
}

impl GraphView {
    /// Build the view from scanner and extractor output.
    ///
    /// Nodes keep discovery order. Edges are inserted grouped by source in
    /// node order, and within a source in recording order.
    pub fn new(declared: &DeclaredSet, edges: &EdgeSet) -> Self {
        let mut inner = DiGraph::with_capacity(declared.len(), edges.len());
        let mut index = HashMap::with_capacity(declared.len());

        for name in declared.iter() {
            let idx = inner.add_node(name.to_string());
            index.insert(name.to_string(), idx);
        }

        let mut dropped_edges = 0;
        for edge in edges.iter() {
            if !(index.contains_key(&edge.from) && index.contains_key(&edge.to)) {
                warn!("Discarding edge {} -> {}: endpoint not declared", edge.from, edge.to);
                dropped_edges += 1;
            }
        }

        let grouped = edges.by_source();
        for name in declared.iter() {
            let Some(targets) = grouped.get(name) else {
                continue;
            };
            let source = index[name];
            for target in targets {
                let Some(&target) = index.get(*target) else {
                    continue;
                };
                if inner.find_edge(source, target).is_none() {
                    inner.add_edge(source, target, ());
                }
            }
        }

        debug!(
            "Assembled graph view: {} nodes, {} edges, {} dropped",
            inner.node_count(),
            inner.edge_count(),
            dropped_edges
        );

        GraphView {
            inner,
            index,
            dropped_edges,
        }
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Edges rejected during construction.
    pub fn dropped_edges(&self) -> usize {
        self.dropped_edges
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Node names in discovery order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner
            .node_indices()
            .map(move |idx| self.inner[idx].as_str())
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = ReferenceEdge> + '_ {
        self.inner.edge_references().map(move |e| {
            ReferenceEdge::new(
                self.inner[e.source()].as_str(),
                self.inner[e.target()].as_str(),
            )
        })
    }

    /// Outgoing targets of `name` in insertion order.
    pub fn targets_of(&self, name: &str) -> Vec<&str> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        // petgraph yields a node's outgoing edges newest-first.
        let mut targets: Vec<&str> = self
            .inner
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| self.inner[e.target()].as_str())
            .collect();
        targets.reverse();
        targets
    }

    /// Names that are never the target of an edge.
    ///
    /// A self-loop counts as an incoming edge, so a name that only
    /// references itself is not a root.
    pub fn roots(&self) -> Vec<&str> {
        self.inner
            .node_indices()
            .filter(|&idx| {
                self.inner
                    .neighbors_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| self.inner[idx].as_str())
            .collect()
    }

    /// Node position in discovery order.
    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).map(|idx| idx.index())
    }

    /// Outgoing adjacency for every node, indexed by node position.
    pub(crate) fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.inner.node_count()];
        for edge in self.inner.edge_references() {
            adjacency[edge.source().index()].push(edge.target().index());
        }
        adjacency
    }
}
