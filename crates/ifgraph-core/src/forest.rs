//! Shared-node forest: an arena of nodes whose children are handles
//!
//! One `ForestNode` exists per declared name. A child entry is the handle of
//! the target's node, never a copy, so several parents share one child and
//! reference cycles become handle cycles inside the arena.

use std::collections::HashMap;

use crate::graph::GraphView;

/// Index of a node inside a [`ForestArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(usize);

impl NodeHandle {
    pub fn index(self) -> usize {
        self.0
    }

    pub(crate) fn from_index(index: usize) -> Self {
        NodeHandle(index)
    }
}

/// One record per declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForestNode {
    pub id: String,
    pub children: Vec<NodeHandle>,
}

/// Index-addressed node store.
#[derive(Debug, Clone, Default)]
pub struct ForestArena {
    nodes: Vec<ForestNode>,
}

impl ForestArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a childless node and return its handle.
    pub fn alloc(&mut self, id: impl Into<String>) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len());
        self.nodes.push(ForestNode {
            id: id.into(),
            children: Vec::new(),
        });
        handle
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&ForestNode> {
        self.nodes.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut ForestNode> {
        self.nodes.get_mut(handle.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn handles(&self) -> impl Iterator<Item = NodeHandle> {
        (0..self.nodes.len()).map(NodeHandle)
    }

    /// Whether `handle` can reach itself through its children.
    pub fn is_cyclic_at(&self, handle: NodeHandle) -> bool {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<NodeHandle> = match self.get(handle) {
            Some(node) => node.children.clone(),
            None => return false,
        };
        while let Some(current) = stack.pop() {
            if current == handle {
                return true;
            }
            let Some(node) = self.get(current) else {
                continue;
            };
            if std::mem::replace(&mut visited[current.0], true) {
                continue;
            }
            stack.extend(node.children.iter().copied());
        }
        false
    }
}

/// The arena plus the subset of handles surfaced as roots.
///
/// `roots` may be empty while the arena still holds a fully connected,
/// cyclic graph.
#[derive(Debug, Clone, Default)]
pub struct ForestView {
    arena: ForestArena,
    roots: Vec<NodeHandle>,
}

/// Identity-aware structural signature of a forest.
///
/// Nodes are numbered by first visit in depth-first pre-order from the
/// roots; each entry is `(id, child ordinals)`. Two forests with equal
/// shapes share nodes and cycles in exactly the same places.
pub type CanonicalShape = (Vec<usize>, Vec<(String, Vec<usize>)>);

impl ForestView {
    pub fn new(arena: ForestArena, roots: Vec<NodeHandle>) -> Self {
        Self { arena, roots }
    }

    /// Assemble the shared-node view from a graph view.
    ///
    /// Handle `i` is the `i`-th declared name. Children follow edge
    /// recording order.
    pub fn from_graph(graph: &GraphView) -> Self {
        let mut arena = ForestArena::new();
        for name in graph.names() {
            arena.alloc(name);
        }
        for (source, targets) in graph.adjacency().into_iter().enumerate() {
            if let Some(node) = arena.get_mut(NodeHandle(source)) {
                node.children = targets.into_iter().map(NodeHandle).collect();
            }
        }

        let roots = graph
            .roots()
            .into_iter()
            .filter_map(|name| graph.position(name))
            .map(NodeHandle)
            .collect();

        ForestView { arena, roots }
    }

    pub fn arena(&self) -> &ForestArena {
        &self.arena
    }

    pub fn roots(&self) -> &[NodeHandle] {
        &self.roots
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&ForestNode> {
        self.arena.get(handle)
    }

    pub fn root_ids(&self) -> Vec<&str> {
        self.roots
            .iter()
            .filter_map(|&h| self.arena.get(h))
            .map(|n| n.id.as_str())
            .collect()
    }

    /// First node with the given id, searching the whole arena.
    pub fn find(&self, id: &str) -> Option<NodeHandle> {
        self.arena
            .handles()
            .find(|&h| self.arena.get(h).is_some_and(|n| n.id == id))
    }

    /// Structural signature of everything reachable from the roots.
    pub fn canonical_shape(&self) -> CanonicalShape {
        let mut ordinals: HashMap<NodeHandle, usize> = HashMap::new();
        let mut order: Vec<NodeHandle> = Vec::new();
        let mut stack: Vec<NodeHandle> = self.roots.iter().rev().copied().collect();

        while let Some(handle) = stack.pop() {
            if ordinals.contains_key(&handle) {
                continue;
            }
            ordinals.insert(handle, order.len());
            order.push(handle);
            if let Some(node) = self.arena.get(handle) {
                stack.extend(node.children.iter().rev().copied());
            }
        }

        let roots = self.roots.iter().map(|h| ordinals[h]).collect();
        let nodes = order
            .iter()
            .filter_map(|&h| self.arena.get(h))
            .map(|node| {
                let children = node.children.iter().map(|c| ordinals[c]).collect();
                (node.id.clone(), children)
            })
            .collect();
        (roots, nodes)
    }
}
