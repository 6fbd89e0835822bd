//! Error taxonomy for one analysis request

use ifgraph_core::CodecError;
use thiserror::Error;

use crate::config::ConfigError;

/// Why a request produced no payload.
///
/// Empty results are not errors: zero declarations, zero edges and an
/// empty root set are all successful outcomes.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The input could not be turned into a syntax tree at all.
    #[error("source unreadable: {0}")]
    SourceUnreadable(String),

    /// Reading or writing the staged input failed.
    #[error("staging I/O error: {0}")]
    StagingIo(#[from] std::io::Error),

    #[error("failed to encode payload: {0}")]
    Codec(#[from] CodecError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Coarse classification used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SourceUnreadable,
    StagingIo,
    Internal,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::SourceUnreadable(_) => ErrorKind::SourceUnreadable,
            AnalysisError::StagingIo(_) => ErrorKind::StagingIo,
            AnalysisError::Codec(_) | AnalysisError::Config(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;
