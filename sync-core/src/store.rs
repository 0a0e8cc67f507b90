//! Shared ordered store backing a [`SequenceCollection`](crate::SequenceCollection).
//!
//! The caller creates the store and hands a clone of the handle to the
//! collection. Both sides see the same items; the collection never copies
//! them, and the store lives as long as any handle does.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to a growable, index-addressable list of items.
pub struct SharedVec<T> {
    inner: Arc<Mutex<Vec<T>>>,
}

impl<T> SharedVec<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Create a store holding the given items.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(items)),
        }
    }

    /// Number of items currently stored.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Run `f` with read access to the items.
    pub fn with<U>(&self, f: impl FnOnce(&[T]) -> U) -> U {
        f(&self.lock())
    }

    /// Run `f` with write access to the items.
    ///
    /// Mutating the store while a cursor over it is mid-traversal leaves that
    /// cursor's iteration order undefined.
    pub fn with_mut<U>(&self, f: impl FnOnce(&mut Vec<T>) -> U) -> U {
        f(&mut self.lock())
    }

    /// Replace every item at once, returning the previous contents.
    pub fn replace(&self, items: Vec<T>) -> Vec<T> {
        std::mem::replace(&mut *self.lock(), items)
    }

    /// Check if two handles point at the same store.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // A panic inside `with_mut` must not make the store unusable.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> SharedVec<T> {
    /// Clone of the item at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        self.lock().get(index).cloned()
    }

    /// Clone of all items, in order.
    pub fn snapshot(&self) -> Vec<T> {
        self.lock().clone()
    }
}

impl<T> Clone for SharedVec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SharedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for SharedVec<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedVec").field(&*self.lock()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_items() {
        let a = SharedVec::from(vec!["red", "blue"]);
        let b = a.clone();

        b.with_mut(|items| items.push("orange"));

        assert_eq!(a.snapshot(), vec!["red", "blue", "orange"]);
        assert!(a.ptr_eq(&b));
    }

    #[test]
    fn independent_stores_are_not_ptr_eq() {
        let a: SharedVec<u8> = SharedVec::new();
        let b: SharedVec<u8> = SharedVec::new();
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn get_out_of_range_is_none() {
        let store = SharedVec::from(vec![1, 2]);
        assert_eq!(store.get(1), Some(2));
        assert_eq!(store.get(2), None);
    }

    #[test]
    fn replace_returns_previous_contents() {
        let store = SharedVec::from(vec![1, 2, 3]);
        let old = store.replace(vec![9]);
        assert_eq!(old, vec![1, 2, 3]);
        assert_eq!(store.snapshot(), vec![9]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn with_reads_without_cloning() {
        let store = SharedVec::from(vec![String::from("a"), String::from("bb")]);
        let total: usize = store.with(|items| items.iter().map(String::len).sum());
        assert_eq!(total, 3);
    }

    #[test]
    fn store_survives_panicking_writer() {
        let store = SharedVec::from(vec![1]);
        let writer = store.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            writer.with_mut(|items| {
                items.push(2);
                panic!("writer failed");
            })
        }));
        assert!(result.is_err());
        assert_eq!(store.snapshot(), vec![1, 2]);
    }

    #[test]
    fn debug_shows_items() {
        let store = SharedVec::from(vec![1, 2]);
        assert_eq!(format!("{:?}", store), "SharedVec([1, 2])");
    }
}
