//! Flat node/link view for force-directed rendering

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::GraphView;

/// One id-only node record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
}

/// One `{source, target}` link record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source: String,
    pub target: String,
}

/// Names only, no shared identity, so it serializes as plain JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
}

impl GraphData {
    /// Emit one node per declared name and one link per edge.
    ///
    /// Links whose target is not among the emitted nodes are skipped.
    pub fn from_graph(graph: &GraphView) -> Self {
        let nodes: Vec<NodeRecord> = graph
            .names()
            .map(|id| NodeRecord { id: id.to_string() })
            .collect();
        let emitted: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

        let links = graph
            .edges()
            .filter(|edge| emitted.contains(edge.to.as_str()))
            .map(|edge| LinkRecord {
                source: edge.from,
                target: edge.to,
            })
            .collect();

        GraphData { nodes, links }
    }

    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn has_link(&self, source: &str, target: &str) -> bool {
        self.links
            .iter()
            .any(|l| l.source == source && l.target == target)
    }
}
