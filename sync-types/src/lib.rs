//! # sync-types
//!
//! Wire format types for tidesync.
//!
//! This crate provides the types shared by the collection core and the
//! client layer:
//! - [`Frame`], [`Codec`] - the `{service, message}` wrapper and its encodings
//! - [`CallId`], [`RpcRequest`], [`RpcReply`] - remote procedure calls
//! - [`Delta`] - insert/update/delete notifications for mirrored collections
//! - [`ParticipantMessage`], [`ChannelMessage`] - service notification payloads
//! - [`SyncError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod frame;
mod ids;
mod messages;

pub use error::SyncError;
pub use frame::{Codec, Frame};
pub use ids::CallId;
pub use messages::{
    message_type, ChannelMessage, Delta, ParticipantMessage, RpcReply, RpcRequest,
};
