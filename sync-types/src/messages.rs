//! Service messages for tidesync.
//!
//! These are the bodies carried in [`Frame::message`](crate::Frame).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CallId, SyncError};

/// The `type` discriminator of a message body, if present.
///
/// Replies, notifications and deltas all carry one.
pub fn message_type(message: &Value) -> Option<&str> {
    message.get("type").and_then(Value::as_str)
}

/// A remote procedure call addressed to a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcRequest {
    /// Name of the remote command.
    pub command: String,
    /// Named parameters (a JSON object).
    pub params: Value,
    /// Correlation id echoed by the reply.
    pub call_id: CallId,
}

impl RpcRequest {
    /// Encode as a message body.
    pub fn to_value(&self) -> Result<Value, SyncError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// The server's answer to an [`RpcRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RpcReply {
    /// The command succeeded.
    Response {
        /// Id of the request being answered
        #[serde(rename = "callId")]
        call_id: CallId,
        /// Command result (null for commands without one)
        #[serde(default)]
        data: Value,
    },
    /// The command failed.
    Error {
        /// Id of the request being answered
        #[serde(rename = "callId")]
        call_id: CallId,
        /// Human-readable failure description
        message: String,
    },
}

impl RpcReply {
    /// Interpret a message body as a reply.
    ///
    /// Returns `Ok(None)` when the body is not a reply at all (a
    /// notification), and an error when it claims to be a reply but is
    /// malformed.
    pub fn from_message(message: &Value) -> Result<Option<Self>, SyncError> {
        match message_type(message) {
            Some("response") | Some("error") => Ok(Some(Self::deserialize(message)?)),
            _ => Ok(None),
        }
    }

    /// Id of the request this reply answers.
    pub fn call_id(&self) -> CallId {
        match self {
            RpcReply::Response { call_id, .. } | RpcReply::Error { call_id, .. } => *call_id,
        }
    }

    /// Convert into the call outcome: the data, or the remote message.
    pub fn into_result(self) -> Result<Value, String> {
        match self {
            RpcReply::Response { data, .. } => Ok(data),
            RpcReply::Error { message, .. } => Err(message),
        }
    }
}

/// A change to a mirrored model, pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Delta {
    /// A new item matches the subscription.
    Insert {
        /// Model class name
        model: String,
        /// The new item
        data: Value,
    },
    /// A known item changed.
    Update {
        /// Model class name
        model: String,
        /// Item after the change
        #[serde(rename = "newData")]
        new_data: Value,
        /// Item before the change
        #[serde(rename = "oldData")]
        old_data: Value,
    },
    /// A known item no longer matches (or was deleted).
    Delete {
        /// Model class name
        model: String,
        /// The item as last known
        data: Value,
    },
}

impl Delta {
    /// Name of the model this delta applies to.
    pub fn model(&self) -> &str {
        match self {
            Delta::Insert { model, .. }
            | Delta::Update { model, .. }
            | Delta::Delete { model, .. } => model,
        }
    }
}

/// A chat message between registered participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantMessage {
    /// Registered name of the sender
    pub sender: String,
    /// Registered name of the recipient
    pub dest: String,
    /// Message text
    pub body: String,
}

/// A message published on a pub/sub channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Channel the message was published on
    pub channel: String,
    /// Published payload
    pub message: Value,
}
