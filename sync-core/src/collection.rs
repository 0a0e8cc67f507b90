//! The capability shared by every collection variant.

use crate::cursor::Cursor;

/// Uniform façade over a backing store.
///
/// Generic code (such as a notification bridge) holds a
/// `Box<dyn Collection<T, R>>` and never needs to know whether the store is
/// a sequence or a single externally-owned slot.
pub trait Collection<T, R = T>: Send + Sync {
    /// Add an item built from `raw`.
    ///
    /// Variants that cannot hold more items report a protocol violation
    /// instead of failing.
    fn insert(&self, raw: R);

    /// Start a new traversal.
    fn cursor(&self) -> Box<dyn Cursor<T, R> + Send>;
}
