use crate::rate_limiter::ExponentialBackoff;
use std::collections::{HashSet, VecDeque};
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::trace;

struct State<K> {
    queue: VecDeque<K>,
    /// Keys waiting to be processed (queued, or re-added while in flight).
    dirty: HashSet<K>,
    /// Keys handed out by `get` and not yet `done`.
    processing: HashSet<K>,
}

struct Inner<K> {
    name: &'static str,
    state: Mutex<State<K>>,
    notify: Notify,
    shutdown: CancellationToken,
    limiter: ExponentialBackoff<K>,
}

/// Deduplicating, rate-limited work queue.
///
/// A key is handed to at most one consumer at a time. Adding a key that is
/// already queued is a no-op; adding one that is being processed defers it
/// until `done`, so it is processed again afterwards.
pub struct WorkQueue<K> {
    inner: Arc<Inner<K>>,
}

impl<K> Clone for WorkQueue<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K> WorkQueue<K>
where
    K: Eq + Hash + Clone + Send + Sync + std::fmt::Display + 'static,
{
    pub fn new(name: &'static str, limiter: ExponentialBackoff<K>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                state: Mutex::new(State {
                    queue: VecDeque::new(),
                    dirty: HashSet::new(),
                    processing: HashSet::new(),
                }),
                notify: Notify::new(),
                shutdown: CancellationToken::new(),
                limiter,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State<K>> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, key: K) {
        if self.is_shutting_down() {
            return;
        }

        let mut state = self.state();
        if !state.dirty.insert(key.clone()) {
            return;
        }
        if state.processing.contains(&key) {
            trace!(queue = self.inner.name, key = %key, "Key in flight, deferred");
            return;
        }
        state.queue.push_back(key);
        drop(state);

        self.inner.notify.notify_one();
    }

    /// Waits for the next key. Returns `None` once the queue is shut down.
    pub async fn get(&self) -> Option<K> {
        loop {
            let notified = self.inner.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_shutting_down() {
                return None;
            }

            {
                let mut state = self.state();
                if let Some(key) = state.queue.pop_front() {
                    state.dirty.remove(&key);
                    state.processing.insert(key.clone());
                    if !state.queue.is_empty() {
                        self.inner.notify.notify_one();
                    }
                    return Some(key);
                }
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = self.inner.shutdown.cancelled() => return None,
            }
        }
    }

    /// Marks `key` as processed, re-queuing it if it was added meanwhile.
    pub fn done(&self, key: &K) {
        let mut state = self.state();
        state.processing.remove(key);
        if state.dirty.contains(key) && !self.is_shutting_down() {
            state.queue.push_back(key.clone());
            drop(state);
            self.inner.notify.notify_one();
        }
    }

    /// Re-adds `key` after its backoff delay.
    pub fn add_rate_limited(&self, key: K) {
        let delay = self.inner.limiter.when(&key);
        trace!(queue = self.inner.name, key = %key, delay_ms = delay.as_millis() as u64, "Requeue with backoff");
        self.add_after(key, delay);
    }

    /// Adds `key` once `delay` has elapsed, unless the queue shuts down first.
    pub fn add_after(&self, key: K, delay: Duration) {
        if delay.is_zero() {
            self.add(key);
            return;
        }
        if self.is_shutting_down() {
            return;
        }

        let queue = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(delay) => queue.add(key),
                _ = queue.inner.shutdown.cancelled() => {}
            }
        });
    }

    /// Clears the backoff history of `key`.
    pub fn forget(&self, key: &K) {
        self.inner.limiter.forget(key);
    }

    pub fn num_requeues(&self, key: &K) -> u32 {
        self.inner.limiter.num_requeues(key)
    }

    /// Stops handing out keys. Idempotent.
    pub fn shut_down(&self) {
        self.inner.shutdown.cancel();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Keys waiting to be handed out.
    pub fn len(&self) -> usize {
        self.state().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }
}
