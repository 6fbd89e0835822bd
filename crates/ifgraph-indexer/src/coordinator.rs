//! Runs one request through scan → extract → assemble → encode
//!
//! A `Coordinator` holds only configuration; every call builds its own
//! parser, sets and views, so concurrent requests share nothing mutable.

use std::path::Path;

use ifgraph_core::{DeclaredSet, EdgeSet, ForestView, GraphData, GraphView, WirePayload};

use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::extractor::extract_references;
use crate::languages;
use crate::parser::{Dialect, decode_utf8, parse_source};
use crate::scanner::scan_declarations;

/// Output of the scanner and extractor for one source.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    pub declared: DeclaredSet,
    pub edges: EdgeSet,
}

/// Both assembled views of one analysis.
#[derive(Debug)]
pub struct DependencyViews {
    pub graph: GraphView,
    pub forest: ForestView,
    pub graph_data: GraphData,
}

impl DependencyViews {
    pub fn from_analysis(analysis: &Analysis) -> Self {
        let graph = GraphView::new(&analysis.declared, &analysis.edges);
        let forest = ForestView::from_graph(&graph);
        let graph_data = GraphData::from_graph(&graph);
        Self {
            graph,
            forest,
            graph_data,
        }
    }

    pub fn into_payload(self) -> Result<WirePayload> {
        Ok(WirePayload::encode(&self.forest, self.graph_data)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Coordinator {
    config: AnalyzerConfig,
}

impl Coordinator {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Scan declarations and extract references.
    pub fn analyze(&self, source: &str, dialect: Dialect) -> Result<Analysis> {
        let language = languages::for_dialect(dialect);
        let tree = parse_source(source, language.as_ref(), self.config.strict_syntax)?;

        let bytes = source.as_bytes();
        let declared = scan_declarations(&tree, bytes, language.as_ref(), &self.config);
        let (edges, stats) =
            extract_references(&tree, bytes, language.as_ref(), &declared, &self.config);

        tracing::info!(
            "Analyzed {} source: {} declarations, {} edges ({} undeclared references)",
            dialect.as_str(),
            declared.len(),
            edges.len(),
            stats.undeclared
        );
        Ok(Analysis { declared, edges })
    }

    pub fn build_views(&self, source: &str, dialect: Dialect) -> Result<DependencyViews> {
        let analysis = self.analyze(source, dialect)?;
        let views = DependencyViews::from_analysis(&analysis);
        tracing::info!(
            "Assembled views: {} nodes, {} links, {} roots",
            views.graph.node_count(),
            views.graph_data.links.len(),
            views.forest.roots().len()
        );
        Ok(views)
    }

    pub fn build_payload(&self, source: &str, dialect: Dialect) -> Result<WirePayload> {
        self.build_views(source, dialect)?.into_payload()
    }

    /// Like [`build_payload`](Self::build_payload) for raw bytes; input
    /// that is not UTF-8 is `SourceUnreadable`.
    pub fn build_payload_from_bytes(&self, bytes: &[u8], dialect: Dialect) -> Result<WirePayload> {
        let source = decode_utf8(bytes)?;
        self.build_payload(source, dialect)
    }

    /// Read a file from disk and build its payload, choosing the dialect
    /// from its extension.
    pub fn build_payload_from_file(&self, path: &Path) -> Result<WirePayload> {
        let bytes = std::fs::read(path)?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
        self.build_payload_from_bytes(&bytes, Dialect::from_path(path))
    }
}
