//! # Single-Flight Memo Cache
//!
//! Per-key state machine shared by the module cache and the validator
//! resolver:
//!
//! ```text
//!   absent ──get_or_load──▶ pending(shared future) ──Ok──▶ ready(value)
//!      ▲                            │
//!      └────────────Err─────────────┘
//! ```
//!
//! Concurrent callers for one key await the same shared future, so a load
//! runs at most once at a time. Failures are handed to every waiter and the
//! entry returns to absent; the next call starts a fresh load.
//!
//! ## Invariants
//!
//! - The lock is never held across an `.await` or a caller-supplied load
//!   function, so a load may call back into the cache.
//! - Every pending entry carries a ticket. A load only settles the entry it
//!   was started for, so a load completing after [`MemoCache::clear`] cannot
//!   repopulate the cache.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

/// A load in flight, awaitable by any number of callers.
pub type SharedLoad<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

enum Slot<V, E> {
    Pending { ticket: u64, load: SharedLoad<V, E> },
    Ready(V),
}

enum Found<V, E> {
    Ready(V),
    Pending(u64, SharedLoad<V, E>),
}

fn find<K: Hash + Eq, V: Clone, E>(
    slots: &HashMap<K, Slot<V, E>>,
    key: &K,
) -> Option<Found<V, E>> {
    match slots.get(key)? {
        Slot::Ready(value) => Some(Found::Ready(value.clone())),
        Slot::Pending { ticket, load } => Some(Found::Pending(*ticket, load.clone())),
    }
}

struct State<K, V, E> {
    slots: HashMap<K, Slot<V, E>>,
    next_ticket: u64,
}

/// Thread-safe, cloneable memo cache with shared in-flight loads.
pub struct MemoCache<K, V, E> {
    state: Arc<Mutex<State<K, V, E>>>,
}

impl<K, V, E> Clone for MemoCache<K, V, E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<K, V, E> Default for MemoCache<K, V, E> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                slots: HashMap::new(),
                next_ticket: 0,
            })),
        }
    }
}

impl<K, V, E> MemoCache<K, V, E>
where
    K: Hash + Eq + Clone,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, join the load in flight, or start
    /// a new load with `load`.
    ///
    /// `load` is only called when no entry exists, and runs without the
    /// cache lock held. If another caller registers a load for `key` in the
    /// meantime, that load is joined and the future built here is dropped
    /// unpolled.
    pub async fn get_or_load<F>(&self, key: K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> BoxFuture<'static, Result<V, E>>,
    {
        let existing = find(&self.state.lock().slots, &key);
        let (ticket, pending) = match existing {
            Some(Found::Ready(value)) => return Ok(value),
            Some(Found::Pending(ticket, pending)) => (ticket, pending),
            None => {
                let fresh = load().shared();
                let mut state = self.state.lock();
                match find(&state.slots, &key) {
                    Some(Found::Ready(value)) => return Ok(value),
                    Some(Found::Pending(ticket, pending)) => (ticket, pending),
                    None => {
                        let ticket = state.next_ticket;
                        state.next_ticket += 1;
                        state.slots.insert(
                            key.clone(),
                            Slot::Pending {
                                ticket,
                                load: fresh.clone(),
                            },
                        );
                        (ticket, fresh)
                    }
                }
            }
        };

        let outcome = pending.await;
        self.settle(&key, ticket, &outcome);
        outcome
    }

    /// Transition a pending entry once its load completes. Every waiter calls
    /// this; only the first call for the current ticket has an effect.
    fn settle(&self, key: &K, ticket: u64, outcome: &Result<V, E>) {
        let mut state = self.state.lock();
        let current = matches!(
            state.slots.get(key),
            Some(Slot::Pending { ticket: t, .. }) if *t == ticket
        );
        if !current {
            return;
        }
        match outcome {
            Ok(value) => {
                state.slots.insert(key.clone(), Slot::Ready(value.clone()));
            }
            Err(_) => {
                state.slots.remove(key);
            }
        }
    }

    /// The ready value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        match self.state.lock().slots.get(key) {
            Some(Slot::Ready(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns true if `key` holds a ready value.
    pub fn is_ready(&self, key: &K) -> bool {
        matches!(self.state.lock().slots.get(key), Some(Slot::Ready(_)))
    }

    /// Returns true if a load for `key` is in flight.
    pub fn is_pending(&self, key: &K) -> bool {
        matches!(self.state.lock().slots.get(key), Some(Slot::Pending { .. }))
    }

    /// Number of entries, ready or pending.
    pub fn len(&self) -> usize {
        self.state.lock().slots.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.state.lock().slots.is_empty()
    }

    /// Discard every entry regardless of state.
    pub fn clear(&self) {
        self.state.lock().slots.clear();
    }
}
