//! # Per-handler concurrency guard.
//!
//! Guarantees that a handler without the concurrent marker never has two
//! invocations executing at once, whichever threads post the events and
//! whichever discipline delivers them.
//!
//! ## Rules
//! - Locks are created lazily, on the first dispatch to an exclusive handler,
//!   and keyed by [`HandlerId`]. Concurrent handlers never get one.
//! - The lock is held from just before the handler body starts until it
//!   returns (or unwinds).
//! - The lock is re-entrant for the thread holding it, so a handler that
//!   synchronously posts an event routed back to itself does not deadlock.
//! - `unregister` sweeps entries no invocation holds. An invocation still
//!   running keeps its entry alive; the last one to release it after the
//!   handler was unregistered removes it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};

use crate::subscribers::{HandlerId, Subscription};

type HandlerLock = Arc<ReentrantMutex<()>>;

/// Lock table keyed by handler identity.
#[derive(Default)]
pub(crate) struct HandlerLocks {
    locks: Mutex<HashMap<HandlerId, HandlerLock>>,
}

impl HandlerLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Runs `body` under the handler's lock (or directly for concurrent handlers).
    ///
    /// `registered` is consulted on release; an entry whose handler is gone and
    /// that nobody else holds is removed.
    pub(crate) fn run<R>(
        &self,
        subscription: &Subscription,
        registered: impl Fn(&HandlerId) -> bool,
        body: impl FnOnce() -> R,
    ) -> R {
        if subscription.concurrency_allowed() {
            return body();
        }
        let release = Release {
            locks: self,
            id: subscription.id(),
            lock: Some(self.lock_for(subscription.id())),
            registered,
        };
        let _held = release.lock.as_ref().map(|lock| lock.lock());
        body()
    }

    fn lock_for(&self, id: HandlerId) -> HandlerLock {
        Arc::clone(
            self.locks
                .lock()
                .entry(id)
                .or_insert_with(|| Arc::new(ReentrantMutex::new(()))),
        )
    }

    /// Drops entries for handlers that are no longer registered and not in use.
    pub(crate) fn sweep(&self, registered: impl Fn(&HandlerId) -> bool) {
        self.locks
            .lock()
            .retain(|id, lock| registered(id) || Arc::strong_count(lock) > 1);
    }

    fn reclaim(&self, id: &HandlerId) {
        let mut locks = self.locks.lock();
        if locks.get(id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(id);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.locks.lock().len()
    }
}

/// Drops the caller's share of a handler lock, reclaiming orphaned entries.
///
/// Runs on unwind too.
struct Release<'a, F: Fn(&HandlerId) -> bool> {
    locks: &'a HandlerLocks,
    id: HandlerId,
    lock: Option<HandlerLock>,
    registered: F,
}

impl<F: Fn(&HandlerId) -> bool> Drop for Release<'_, F> {
    fn drop(&mut self) {
        drop(self.lock.take());
        if !(self.registered)(&self.id) {
            self.locks.reclaim(&self.id);
        }
    }
}
