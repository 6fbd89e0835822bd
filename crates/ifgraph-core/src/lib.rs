//! Declared-name model, graph assembly, shared-node forest and the
//! cycle-safe wire codec

pub mod codec;
pub mod error;
pub mod flat;
pub mod forest;
pub mod graph;
pub mod model;


pub use codec::{EncodedNode, WirePayload, decode_forest, encode_forest};
pub use error::CodecError;
pub use flat::{GraphData, LinkRecord, NodeRecord};
pub use forest::{CanonicalShape, ForestArena, ForestNode, ForestView, NodeHandle};
pub use graph::GraphView;
pub use model::{DeclaredSet, EdgeSet, ReferenceEdge};

/// Assemble both views and pack them into one payload.
pub fn assemble_payload(
    declared: &DeclaredSet,
    edges: &EdgeSet,
) -> Result<WirePayload, CodecError> {
    let graph = GraphView::new(declared, edges);
    let forest = ForestView::from_graph(&graph);
    WirePayload::encode(&forest, GraphData::from_graph(&graph))
}
