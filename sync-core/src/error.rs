//! Error types for cursor operations.

use std::fmt;
use thiserror::Error;

/// Stable classification of collection failures.
///
/// Presentation layers match on the kind and render the error's `Display`
/// text, so neither needs to know which collection variant failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// `next()` was called with no further item available.
    ExhaustedIteration,
    /// `update`/`remove` before any successful `next()`, or after exhaustion.
    NotPositioned,
    /// `update`/`remove` after the current item was removed through the cursor.
    ItemDeleted,
    /// The store shrank underneath a live cursor.
    Detached,
    /// A collection received a request its variant does not support.
    ProtocolViolation,
}

impl ErrorKind {
    /// Short machine-friendly name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ExhaustedIteration => "exhausted_iteration",
            ErrorKind::NotPositioned => "not_positioned",
            ErrorKind::ItemDeleted => "item_deleted",
            ErrorKind::Detached => "detached",
            ErrorKind::ProtocolViolation => "protocol_violation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`Cursor`](crate::Cursor) operations.
///
/// A failed `update` or `remove` never touches the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// Advanced past the last item.
    #[error("Busted iterator")]
    Exhausted,

    /// No current item to operate on.
    #[error("cursor not pointing to an item (call next())")]
    NotPositioned,

    /// The current item was already removed through this cursor.
    #[error("cursor pointing to a deleted item (call next())")]
    ItemDeleted,

    /// The recorded position no longer exists in the store.
    #[error("cursor position {index} is outside the store (len {len})")]
    Detached {
        /// Position the cursor was on.
        index: usize,
        /// Store length at the time of the call.
        len: usize,
    },
}

impl CursorError {
    /// Stable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CursorError::Exhausted => ErrorKind::ExhaustedIteration,
            CursorError::NotPositioned => ErrorKind::NotPositioned,
            CursorError::ItemDeleted => ErrorKind::ItemDeleted,
            CursorError::Detached { .. } => ErrorKind::Detached,
        }
    }
}
