//! Reference extractor: directed edges between declared interfaces

use ifgraph_core::{DeclaredSet, EdgeSet};
use tree_sitter::{Node, Tree};

use crate::config::AnalyzerConfig;
use crate::languages::{DeclarationLanguage, walk_preorder};

/// Counters from one extraction pass, logged at debug level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    /// Type references encountered, before any filtering.
    pub references: usize,
    /// References to names outside the declared set.
    pub undeclared: usize,
    /// References with no enclosing interface, or one that is ignored.
    pub unowned: usize,
    /// Supertype references skipped because heritage is not followed.
    pub heritage: usize,
    /// References that collapsed onto an edge already recorded.
    pub duplicates: usize,
}

/// Record an edge `E -> R` for every reference to a declared name `R`
/// made inside the body of a declared interface `E`.
pub fn extract_references(
    tree: &Tree,
    source: &[u8],
    language: &dyn DeclarationLanguage,
    declared: &DeclaredSet,
    config: &AnalyzerConfig,
) -> (EdgeSet, ExtractionStats) {
    let mut edges = EdgeSet::new();
    let mut stats = ExtractionStats::default();

    walk_preorder(tree.root_node(), |node| {
        let Some(target) = language.referenced_name(node, source) else {
            return;
        };
        stats.references += 1;

        if !config.follow_heritage && language.is_heritage_head(node) {
            stats.heritage += 1;
            return;
        }
        if !declared.contains(target) {
            stats.undeclared += 1;
            return;
        }
        let owner = match enclosing_declaration(node, source, language) {
            Some(owner) if declared.contains(owner) => owner,
            _ => {
                stats.unowned += 1;
                return;
            }
        };
        if !edges.insert(owner, target) {
            stats.duplicates += 1;
        }
    });

    tracing::debug!("Extracted {} edges: {:?}", edges.len(), stats);
    (edges, stats)
}

/// Innermost interface declaration containing `node`.
fn enclosing_declaration<'s>(
    node: Node<'_>,
    source: &'s [u8],
    language: &dyn DeclarationLanguage,
) -> Option<&'s str> {
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if let Some(name) = language.declared_name(ancestor, source) {
            return Some(name);
        }
        current = ancestor.parent();
    }
    None
}
