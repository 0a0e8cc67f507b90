//! Ordered collection over a shared, growable store.

use std::fmt;

use crate::collection::Collection;
use crate::cursor::{Cursor, CursorState, Traversal};
use crate::error::CursorError;
use crate::store::SharedVec;
use crate::transform::{self, Transform};

/// Collection of any number of items, iterated in insertion order.
///
/// Duplicates are allowed. The store is shared with the caller: every
/// `insert` and cursor mutation is immediately visible through the
/// caller's own [`SharedVec`] handle.
pub struct SequenceCollection<T, R = T> {
    store: SharedVec<T>,
    transform: Transform<R, T>,
}

impl<T: 'static> SequenceCollection<T> {
    /// Create a collection storing items as given.
    pub fn new(store: SharedVec<T>) -> Self {
        Self {
            store,
            transform: transform::identity(),
        }
    }
}

impl<T, R> SequenceCollection<T, R> {
    /// Pass every inserted or updated value through `f` before storing it.
    pub fn with_transform<R2>(
        self,
        f: impl Fn(R2) -> T + Send + Sync + 'static,
    ) -> SequenceCollection<T, R2> {
        SequenceCollection {
            store: self.store,
            transform: transform::from_fn(f),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &SharedVec<T> {
        &self.store
    }
}

impl<T, R> Collection<T, R> for SequenceCollection<T, R>
where
    T: Clone + Send + 'static,
    R: 'static,
{
    fn insert(&self, raw: R) {
        let item = (self.transform)(raw);
        self.store.lock().push(item);
    }

    fn cursor(&self) -> Box<dyn Cursor<T, R> + Send> {
        Box::new(SequenceCursor {
            store: self.store.clone(),
            transform: self.transform.clone(),
            traversal: Traversal::new(),
        })
    }
}

impl<T: fmt::Debug, R> fmt::Debug for SequenceCollection<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceCollection")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Cursor over a [`SequenceCollection`].
///
/// Each step looks at the store as it is at that moment. Removing through
/// the cursor shifts later items down one index, and the cursor follows
/// them, so the next `next()` yields the item that followed the removed one.
pub struct SequenceCursor<T, R = T> {
    store: SharedVec<T>,
    transform: Transform<R, T>,
    traversal: Traversal,
}

impl<T: Clone, R> Cursor<T, R> for SequenceCursor<T, R> {
    fn has_next(&self) -> bool {
        match self.traversal.next_index() {
            Some(index) => index < self.store.len(),
            None => false,
        }
    }

    fn next(&mut self) -> Result<T, CursorError> {
        let items = self.store.lock();
        let index = self.traversal.advance(items.len())?;
        Ok(items[index].clone())
    }

    fn update(&mut self, raw: R) -> Result<(), CursorError> {
        let index = self.traversal.current()?;
        let item = (self.transform)(raw);
        let mut items = self.store.lock();
        match items.get_mut(index) {
            Some(slot) => {
                *slot = item;
                Ok(())
            }
            None => Err(CursorError::Detached {
                index,
                len: items.len(),
            }),
        }
    }

    fn remove(&mut self) -> Result<(), CursorError> {
        let index = self.traversal.current()?;
        let mut items = self.store.lock();
        if index >= items.len() {
            return Err(CursorError::Detached {
                index,
                len: items.len(),
            });
        }
        items.remove(index);
        self.traversal.removed();
        Ok(())
    }

    fn state(&self) -> CursorState {
        self.traversal.state()
    }
}

impl<T, R> fmt::Debug for SequenceCursor<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceCursor")
            .field("traversal", &self.traversal)
            .finish_non_exhaustive()
    }
}
