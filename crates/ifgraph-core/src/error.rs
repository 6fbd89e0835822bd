//! Error types for the core crate

use thiserror::Error;

/// Failures while encoding or decoding a shared-node payload.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A child handle points outside the arena being encoded.
    #[error("node handle {0} is not in the arena")]
    UnknownHandle(usize),

    /// Two full records in one payload claim the same id.
    #[error("duplicate record id {0}")]
    DuplicateId(u32),

    /// A back-reference names an id no full record defines.
    #[error("back-reference to undefined record id {0}")]
    DanglingReference(u32),

    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
}
