//! Cursor protocol for tidesync collections.
//!
//! A cursor is a single-use traversal handle over one collection. It moves
//! through four states:
//!
//! ```text
//! NotStarted --next()--> Positioned --next()--> Positioned ... --next()--> Exhausted
//!                            |                      ^
//!                         remove()                  |
//!                            v                      |
//!                         Deleted -------next()-----+
//! ```
//!
//! `update` and `remove` are only legal in `Positioned`. Everything else
//! fails with a [`CursorError`] and leaves the store untouched.

use crate::error::CursorError;

/// Observable state of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Created, `next()` not called yet.
    NotStarted,
    /// Sitting on a valid item.
    Positioned,
    /// Advanced past the last item. Terminal.
    Exhausted,
    /// The current item was removed through this cursor.
    Deleted,
}

impl CursorState {
    /// Check that `update`/`remove` may run in this state.
    pub fn require_positioned(self) -> Result<(), CursorError> {
        match self {
            CursorState::Positioned => Ok(()),
            CursorState::NotStarted | CursorState::Exhausted => Err(CursorError::NotPositioned),
            CursorState::Deleted => Err(CursorError::ItemDeleted),
        }
    }
}

/// Traversal and in-place mutation of one collection pass.
///
/// `T` is the stored item type; `R` is the raw type accepted by `update`
/// (equal to `T` unless the collection has a transform).
pub trait Cursor<T, R = T> {
    /// True iff another `next()` would produce an item. Never changes state.
    fn has_next(&self) -> bool;

    /// Advance onto the next item and return it.
    ///
    /// Fails with [`CursorError::Exhausted`] when no item is left; the cursor
    /// is then `Exhausted` for good.
    fn next(&mut self) -> Result<T, CursorError>;

    /// Replace the current item with `transform(raw)`.
    fn update(&mut self, raw: R) -> Result<(), CursorError>;

    /// Remove the current item from the store.
    fn remove(&mut self) -> Result<(), CursorError>;

    /// Current state.
    fn state(&self) -> CursorState;

    /// Advance until `matches` accepts an item, leaving the cursor on it.
    ///
    /// Returns `Ok(false)` (with the cursor at the end of the collection)
    /// when nothing matches.
    fn seek(&mut self, matches: &mut dyn FnMut(&T) -> bool) -> Result<bool, CursorError> {
        while self.has_next() {
            let item = self.next()?;
            if matches(&item) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Index bookkeeping for cursors over index-addressable stores.
///
/// `index` means different things per state: the next index to read in
/// `NotStarted`, the current index in `Positioned`, and the index the
/// following item shifted into in `Deleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Traversal {
    state: CursorState,
    index: usize,
}

impl Traversal {
    pub(crate) fn new() -> Self {
        Self {
            state: CursorState::NotStarted,
            index: 0,
        }
    }

    pub(crate) fn state(&self) -> CursorState {
        self.state
    }

    /// Index `next()` would read, or `None` once exhausted.
    pub(crate) fn next_index(&self) -> Option<usize> {
        match self.state {
            CursorState::NotStarted | CursorState::Deleted => Some(self.index),
            CursorState::Positioned => Some(self.index + 1),
            CursorState::Exhausted => None,
        }
    }

    /// Step forward over a store currently holding `len` items.
    pub(crate) fn advance(&mut self, len: usize) -> Result<usize, CursorError> {
        let next = self.next_index().ok_or(CursorError::Exhausted)?;
        if next < len {
            self.state = CursorState::Positioned;
            self.index = next;
            Ok(next)
        } else {
            self.state = CursorState::Exhausted;
            Err(CursorError::Exhausted)
        }
    }

    /// Index of the current item, if mutation is allowed.
    pub(crate) fn current(&self) -> Result<usize, CursorError> {
        self.state.require_positioned()?;
        Ok(self.index)
    }

    /// Record removal of the current item; later items shift down by one.
    pub(crate) fn removed(&mut self) {
        self.state = CursorState::Deleted;
    }
}
