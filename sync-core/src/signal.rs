//! Synchronous observer list.
//!
//! Services expose inbound events (chat messages, channel publications) as a
//! [`Signal`]. Subscribers run in subscription order, once per dispatched
//! event, on the dispatching thread.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Handle returned by [`Signal::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

struct Subscribers<E> {
    next_id: u64,
    entries: Vec<(SubscriberId, Callback<E>)>,
}

/// An ordered list of callbacks invoked for each event of type `E`.
pub struct Signal<E> {
    subscribers: Mutex<Subscribers<E>>,
}

impl<E> Signal<E> {
    /// Create a signal with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Subscribers {
                next_id: 0,
                entries: Vec::new(),
            }),
        }
    }

    /// Add a callback; it runs after every callback subscribed before it.
    pub fn subscribe(&self, callback: impl Fn(&E) + Send + Sync + 'static) -> SubscriberId {
        let mut subs = self.lock();
        let id = SubscriberId(subs.next_id);
        subs.next_id += 1;
        subs.entries.push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subs = self.lock();
        let before = subs.entries.len();
        subs.entries.retain(|(entry_id, _)| *entry_id != id);
        subs.entries.len() != before
    }

    /// Invoke every current subscriber once with `event`.
    ///
    /// The subscriber list is captured before the first call, so callbacks
    /// may subscribe or unsubscribe without affecting this dispatch.
    /// Returns the number of callbacks invoked.
    pub fn dispatch(&self, event: &E) -> usize {
        let callbacks: Vec<Callback<E>> = self
            .lock()
            .entries
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for cb in &callbacks {
            cb(event);
        }
        callbacks.len()
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Check if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers<E>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.len())
            .finish()
    }
}
