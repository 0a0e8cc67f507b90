//! Error types for tidesync wire handling.

use thiserror::Error;

/// Errors that can occur while encoding or decoding wire data.
#[derive(Debug, Error)]
pub enum SyncError {
    /// JSON encoding or decoding failed
    #[error("json codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// MessagePack serialization failed
    #[error("serialization failed: {0}")]
    Serialization(#[source] rmp_serde::encode::Error),

    /// MessagePack deserialization failed
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] rmp_serde::decode::Error),
}
