//! Frame - the wire wrapper for all service traffic.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::SyncError;

/// Encoding used for frames on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// UTF-8 JSON text.
    #[default]
    Json,
    /// MessagePack with named fields.
    #[serde(alias = "messagepack")]
    Msgpack,
}

/// The frame routes a message to a named service.
///
/// Requests, replies and notifications all travel inside a frame; the
/// `message` body is interpreted by the service it is addressed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Name of the service this message belongs to.
    pub service: String,
    /// Service-specific message body.
    pub message: Value,
}

impl Frame {
    /// Create a frame for the given service.
    pub fn new(service: impl Into<String>, message: Value) -> Self {
        Self {
            service: service.into(),
            message,
        }
    }

    /// Encode the frame with the given codec.
    pub fn encode(&self, codec: Codec) -> Result<Vec<u8>, SyncError> {
        match codec {
            Codec::Json => Ok(serde_json::to_vec(self)?),
            Codec::Msgpack => rmp_serde::to_vec_named(self).map_err(SyncError::Serialization),
        }
    }

    /// Decode a frame with the given codec.
    pub fn decode(codec: Codec, bytes: &[u8]) -> Result<Self, SyncError> {
        match codec {
            Codec::Json => Ok(serde_json::from_slice(bytes)?),
            Codec::Msgpack => rmp_serde::from_slice(bytes).map_err(SyncError::Deserialization),
        }
    }
}
