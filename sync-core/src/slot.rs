//! Collection over exactly zero or one externally-owned value.
//!
//! The value lives wherever the caller keeps it; the collection only knows
//! how to `read`, `write` and `delete` it through the closures supplied at
//! construction.

use std::fmt;
use std::sync::Arc;

use crate::collection::Collection;
use crate::cursor::{Cursor, CursorState};
use crate::diagnostics::{DiagnosticSink, ProtocolViolation, TracingSink};
use crate::error::CursorError;
use crate::transform::{self, Transform};

type ReadFn<T> = Box<dyn Fn() -> Option<T> + Send + Sync>;
type WriteFn<T> = Box<dyn Fn(T) + Send + Sync>;
type DeleteFn = Box<dyn Fn() + Send + Sync>;

struct Accessors<T> {
    read: ReadFn<T>,
    write: WriteFn<T>,
    delete: DeleteFn,
}

/// Collection backed by a single slot.
///
/// `insert` is not supported: the slot's value is managed externally, so
/// an insert is reported to the [`DiagnosticSink`] and otherwise ignored.
pub struct SingleSlotCollection<T, R = T> {
    accessors: Arc<Accessors<T>>,
    transform: Transform<R, T>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl<T: 'static> SingleSlotCollection<T> {
    /// Create a collection from the slot's accessors.
    ///
    /// Violations are logged through [`TracingSink`] unless another sink is
    /// set with [`with_diagnostics`](Self::with_diagnostics).
    pub fn new(
        read: impl Fn() -> Option<T> + Send + Sync + 'static,
        write: impl Fn(T) + Send + Sync + 'static,
        delete: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            accessors: Arc::new(Accessors {
                read: Box::new(read),
                write: Box::new(write),
                delete: Box::new(delete),
            }),
            transform: transform::identity(),
            diagnostics: Arc::new(TracingSink),
        }
    }
}

impl<T, R> SingleSlotCollection<T, R> {
    /// Pass every written value through `f` before handing it to `write`.
    pub fn with_transform<R2>(
        self,
        f: impl Fn(R2) -> T + Send + Sync + 'static,
    ) -> SingleSlotCollection<T, R2> {
        SingleSlotCollection {
            accessors: self.accessors,
            transform: transform::from_fn(f),
            diagnostics: self.diagnostics,
        }
    }

    /// Report protocol violations to `sink`.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }
}

impl<T, R> Collection<T, R> for SingleSlotCollection<T, R>
where
    T: 'static,
    R: 'static,
{
    fn insert(&self, _raw: R) {
        self.diagnostics
            .report(ProtocolViolation::InsertIntoSingleSlot);
    }

    fn cursor(&self) -> Box<dyn Cursor<T, R> + Send> {
        Box::new(SlotCursor {
            accessors: Arc::clone(&self.accessors),
            transform: Arc::clone(&self.transform),
            state: CursorState::NotStarted,
        })
    }
}

impl<T, R> fmt::Debug for SingleSlotCollection<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleSlotCollection").finish_non_exhaustive()
    }
}

/// Cursor over a [`SingleSlotCollection`].
///
/// Yields the slot's value at most once. The value is read when `next()`
/// runs, not when the cursor is created.
pub struct SlotCursor<T, R = T> {
    accessors: Arc<Accessors<T>>,
    transform: Transform<R, T>,
    state: CursorState,
}

impl<T, R> Cursor<T, R> for SlotCursor<T, R> {
    fn has_next(&self) -> bool {
        match self.state {
            CursorState::NotStarted => (self.accessors.read)().is_some(),
            _ => false,
        }
    }

    fn next(&mut self) -> Result<T, CursorError> {
        if self.state != CursorState::NotStarted {
            self.state = CursorState::Exhausted;
            return Err(CursorError::Exhausted);
        }
        match (self.accessors.read)() {
            Some(item) => {
                self.state = CursorState::Positioned;
                Ok(item)
            }
            None => {
                self.state = CursorState::Exhausted;
                Err(CursorError::Exhausted)
            }
        }
    }

    fn update(&mut self, raw: R) -> Result<(), CursorError> {
        self.state.require_positioned()?;
        (self.accessors.write)((self.transform)(raw));
        Ok(())
    }

    fn remove(&mut self) -> Result<(), CursorError> {
        self.state.require_positioned()?;
        (self.accessors.delete)();
        self.state = CursorState::Deleted;
        Ok(())
    }

    fn state(&self) -> CursorState {
        self.state
    }
}

impl<T, R> fmt::Debug for SlotCursor<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotCursor")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
