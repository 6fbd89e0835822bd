//! Cycle-safe codec for the shared-node forest
//!
//! A node is written in full the first time the encoder reaches it and as a
//! `{"$ref": n}` back-reference every time after that, whether it is reached
//! again through another parent or through a cycle. The decoder reverses this
//! with an id table, so two decoded nodes are the same arena slot exactly
//! when the encoder saw the same handle.
//!
//! Wire shape of one entry:
//!
//! ```text
//! {"$id": 0, "id": "Node", "children": [{"$ref": 0}]}
//! ```
//!
//! A chain of references nests one record per link. Encoding, decoding and
//! dropping use explicit work stacks, and JSON reading and writing go through
//! `serde_stacker`, so nesting depth is bounded by the heap.

use std::collections::HashMap;
use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use tracing::debug;

use crate::error::CodecError;
use crate::flat::GraphData;
use crate::forest::{ForestArena, ForestNode, ForestView, NodeHandle};

/// One element of an encoded child list.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EncodedNode {
    /// First visit: the full record, tagged with a payload-unique id.
    Record {
        #[serde(rename = "$id")]
        ref_id: u32,
        id: String,
        children: Vec<EncodedNode>,
    },
    /// Any later visit of the same instance.
    BackRef {
        #[serde(rename = "$ref")]
        ref_id: u32,
    },
}

impl Drop for EncodedNode {
    fn drop(&mut self) {
        let EncodedNode::Record { children, .. } = self else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(mut node) = pending.pop() {
            if let EncodedNode::Record { children, .. } = &mut node {
                pending.append(children);
            }
        }
    }
}

impl<'de> Deserialize<'de> for EncodedNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(EncodedNodeVisitor)
    }
}

struct EncodedNodeVisitor;

impl<'de> Visitor<'de> for EncodedNodeVisitor {
    type Value = EncodedNode;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a node record or a back-reference")
    }

    fn visit_map<A>(self, mut map: A) -> Result<EncodedNode, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut record_id: Option<u32> = None;
        let mut back_ref: Option<u32> = None;
        let mut id: Option<String> = None;
        let mut children: Option<Vec<EncodedNode>> = None;

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "$id" => record_id = Some(map.next_value()?),
                "$ref" => back_ref = Some(map.next_value()?),
                "id" => id = Some(map.next_value()?),
                "children" => children = Some(map.next_value()?),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        match (record_id, back_ref) {
            (Some(ref_id), None) => Ok(EncodedNode::Record {
                ref_id,
                id: id.ok_or_else(|| <A::Error as de::Error>::missing_field("id"))?,
                children: children.ok_or_else(|| <A::Error as de::Error>::missing_field("children"))?,
            }),
            (None, Some(ref_id)) => Ok(EncodedNode::BackRef { ref_id }),
            (Some(_), Some(_)) => Err(de::Error::custom("node has both `$id` and `$ref`")),
            (None, None) => Err(de::Error::custom("node has neither `$id` nor `$ref`")),
        }
    }
}

/// Encode the nodes reachable from the forest roots.
pub fn encode_forest(forest: &ForestView) -> Result<Vec<EncodedNode>, CodecError> {
    let mut encoder = Encoder::new(forest.arena());
    let mut encoded = Vec::with_capacity(forest.roots().len());
    for &root in forest.roots() {
        encoder.encode_into(root, &mut encoded)?;
    }
    debug!("Encoded {} distinct nodes from {} roots", encoder.next_id, encoded.len());
    Ok(encoded)
}

/// Rebuild a forest from encoded roots.
///
/// Back-references may point forward to records that appear later in the
/// sequence; they are patched once every record has been allocated.
pub fn decode_forest(encoded: &[EncodedNode]) -> Result<ForestView, CodecError> {
    let mut decoder = Decoder::default();
    let mut roots = Vec::with_capacity(encoded.len());
    for entry in encoded {
        decoder.decode_into(entry, &mut roots)?;
    }
    decoder.finish(roots)
}

/// A record whose children are still being encoded.
struct EncodeFrame<'a> {
    ref_id: u32,
    node: &'a ForestNode,
    next: usize,
    children: Vec<EncodedNode>,
}

enum EncodeStep<'a> {
    Done(EncodedNode),
    Open(EncodeFrame<'a>),
}

struct Encoder<'a> {
    arena: &'a ForestArena,
    visited: HashMap<NodeHandle, u32>,
    next_id: u32,
}

impl<'a> Encoder<'a> {
    fn new(arena: &'a ForestArena) -> Self {
        Encoder {
            arena,
            visited: HashMap::new(),
            next_id: 0,
        }
    }

    fn step(&mut self, handle: NodeHandle) -> Result<EncodeStep<'a>, CodecError> {
        // Checked before descending: this is what terminates cycles.
        if let Some(&ref_id) = self.visited.get(&handle) {
            return Ok(EncodeStep::Done(EncodedNode::BackRef { ref_id }));
        }

        let arena = self.arena;
        let node = arena
            .get(handle)
            .ok_or(CodecError::UnknownHandle(handle.index()))?;

        let ref_id = self.next_id;
        self.next_id += 1;
        self.visited.insert(handle, ref_id);

        Ok(EncodeStep::Open(EncodeFrame {
            ref_id,
            node,
            next: 0,
            children: Vec::with_capacity(node.children.len()),
        }))
    }

    /// Encode everything reachable from `root` and push it onto `out`.
    fn encode_into(&mut self, root: NodeHandle, out: &mut Vec<EncodedNode>) -> Result<(), CodecError> {
        let mut stack = match self.step(root)? {
            EncodeStep::Done(encoded) => {
                out.push(encoded);
                return Ok(());
            }
            EncodeStep::Open(frame) => vec![frame],
        };

        while let Some(frame) = stack.last_mut() {
            if let Some(&child) = frame.node.children.get(frame.next) {
                frame.next += 1;
                match self.step(child)? {
                    EncodeStep::Done(encoded) => frame.children.push(encoded),
                    EncodeStep::Open(child_frame) => stack.push(child_frame),
                }
            } else if let Some(done) = stack.pop() {
                let encoded = EncodedNode::Record {
                    ref_id: done.ref_id,
                    id: done.node.id.clone(),
                    children: done.children,
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(encoded),
                    None => out.push(encoded),
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Parent {
    Root,
    Node(NodeHandle),
}

/// A child slot waiting for a record that had not been read yet.
struct Pending {
    parent: Parent,
    position: usize,
    ref_id: u32,
}

/// A decoded record whose children are still being read.
struct DecodeFrame<'e> {
    handle: NodeHandle,
    entries: &'e [EncodedNode],
    children: Vec<NodeHandle>,
}

enum DecodeStep<'e> {
    Done(NodeHandle),
    Open(DecodeFrame<'e>),
}

#[derive(Default)]
struct Decoder {
    arena: ForestArena,
    table: HashMap<u32, NodeHandle>,
    pending: Vec<Pending>,
}

impl Decoder {
    /// Start decoding `entry` into slot `position` of `parent`.
    ///
    /// Unresolved back-references yield a placeholder handle that `finish`
    /// overwrites.
    fn step<'e>(
        &mut self,
        entry: &'e EncodedNode,
        parent: Parent,
        position: usize,
    ) -> Result<DecodeStep<'e>, CodecError> {
        match entry {
            EncodedNode::Record {
                ref_id,
                id,
                children,
            } => {
                if self.table.contains_key(ref_id) {
                    return Err(CodecError::DuplicateId(*ref_id));
                }
                let handle = self.arena.alloc(id.as_str());
                self.table.insert(*ref_id, handle);
                Ok(DecodeStep::Open(DecodeFrame {
                    handle,
                    entries: children,
                    children: Vec::with_capacity(children.len()),
                }))
            }
            EncodedNode::BackRef { ref_id } => match self.table.get(ref_id) {
                Some(&handle) => Ok(DecodeStep::Done(handle)),
                None => {
                    self.pending.push(Pending {
                        parent,
                        position,
                        ref_id: *ref_id,
                    });
                    Ok(DecodeStep::Done(match parent {
                        Parent::Node(handle) => handle,
                        // Patched in `finish` or decoding fails.
                        Parent::Root => NodeHandle::from_index(usize::MAX),
                    }))
                }
            },
        }
    }

    /// Decode one root entry and push its handle onto `roots`.
    fn decode_into(&mut self, entry: &EncodedNode, roots: &mut Vec<NodeHandle>) -> Result<(), CodecError> {
        let mut stack = match self.step(entry, Parent::Root, roots.len())? {
            DecodeStep::Done(handle) => {
                roots.push(handle);
                return Ok(());
            }
            DecodeStep::Open(frame) => vec![frame],
        };

        while let Some(frame) = stack.last_mut() {
            let slot = frame.children.len();
            let entries = frame.entries;
            if let Some(child) = entries.get(slot) {
                let parent = Parent::Node(frame.handle);
                match self.step(child, parent, slot)? {
                    DecodeStep::Done(handle) => frame.children.push(handle),
                    DecodeStep::Open(child_frame) => stack.push(child_frame),
                }
            } else if let Some(done) = stack.pop() {
                if let Some(node) = self.arena.get_mut(done.handle) {
                    node.children = done.children;
                }
                match stack.last_mut() {
                    Some(parent) => parent.children.push(done.handle),
                    None => roots.push(done.handle),
                }
            }
        }
        Ok(())
    }

    fn finish(mut self, mut roots: Vec<NodeHandle>) -> Result<ForestView, CodecError> {
        for pending in std::mem::take(&mut self.pending) {
            let target = *self
                .table
                .get(&pending.ref_id)
                .ok_or(CodecError::DanglingReference(pending.ref_id))?;
            match pending.parent {
                Parent::Root => roots[pending.position] = target,
                Parent::Node(parent) => {
                    if let Some(node) = self.arena.get_mut(parent) {
                        node.children[pending.position] = target;
                    }
                }
            }
        }
        Ok(ForestView::new(self.arena, roots))
    }
}

/// The envelope produced once per request: forest view plus flat view.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePayload {
    pub tree_data: Vec<EncodedNode>,
    pub graph_data: GraphData,
}

impl WirePayload {
    pub fn encode(forest: &ForestView, graph_data: GraphData) -> Result<Self, CodecError> {
        Ok(WirePayload {
            tree_data: encode_forest(forest)?,
            graph_data,
        })
    }

    pub fn decode_forest(&self) -> Result<ForestView, CodecError> {
        decode_forest(&self.tree_data)
    }

    pub fn to_json(&self) -> Result<String, CodecError> {
        self.write_json(CompactFormatter)
    }

    pub fn to_json_pretty(&self) -> Result<String, CodecError> {
        self.write_json(PrettyFormatter::new())
    }

    /// Parse a payload of any nesting depth.
    pub fn from_json(input: &str) -> Result<Self, CodecError> {
        let mut deserializer = serde_json::Deserializer::from_str(input);
        deserializer.disable_recursion_limit();
        let payload = WirePayload::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
        deserializer.end()?;
        Ok(payload)
    }

    fn write_json<F: Formatter>(&self, formatter: F) -> Result<String, CodecError> {
        let mut out = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(serde_stacker::Serializer::new(&mut serializer))?;
        String::from_utf8(out).map_err(|e| CodecError::Json(serde::ser::Error::custom(e)))
    }
}
