//! # sync-core
//!
//! Cursor-based synchronized collections for tidesync (no I/O, instant tests).
//!
//! A [`Collection`] exposes a backing store through one protocol: `insert`
//! plus single-use [`Cursor`]s that read, update and remove items in place.
//! Two variants are provided:
//!
//! - [`SequenceCollection`] over a caller-owned [`SharedVec`]
//! - [`SingleSlotCollection`] over three caller-supplied accessor closures
//!
//! Cursors run a small state machine ([`CursorState`]) so that mutating
//! before positioning, reading past the end or removing twice fail with a
//! distinct [`CursorError`] instead of corrupting the store.
//!
//! ## Design Philosophy
//!
//! Everything in this crate is synchronous and side-effect free apart from
//! the stores the caller hands in. Network traffic that feeds collections
//! (RPC replies, pushed deltas) lives in `sync-client`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod cursor;
pub mod diagnostics;
pub mod error;
pub mod sequence;
pub mod signal;
pub mod slot;
pub mod store;
pub mod transform;

pub use collection::Collection;
pub use cursor::{Cursor, CursorState};
pub use diagnostics::{DiagnosticSink, ProtocolViolation, TracingSink};
pub use error::{CursorError, ErrorKind};
pub use sequence::{SequenceCollection, SequenceCursor};
pub use signal::{Signal, SubscriberId};
pub use slot::{SingleSlotCollection, SlotCursor};
pub use store::SharedVec;
pub use transform::Transform;
