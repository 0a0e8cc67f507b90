//! Item transform hook.
//!
//! A transform maps the raw value handed to `insert`/`update` into the value
//! actually stored. It runs on every write path and never on reads; it must
//! not touch the collection it is attached to.

use std::sync::Arc;

/// Shared pure function from raw items `R` to stored items `T`.
pub type Transform<R, T> = Arc<dyn Fn(R) -> T + Send + Sync>;

/// The transform used when none is configured.
pub fn identity<T: 'static>() -> Transform<T, T> {
    Arc::new(|item| item)
}

/// Wrap a closure as a [`Transform`].
pub fn from_fn<R, T>(f: impl Fn(R) -> T + Send + Sync + 'static) -> Transform<R, T> {
    Arc::new(f)
}
