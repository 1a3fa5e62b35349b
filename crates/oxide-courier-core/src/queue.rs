//! Per-destination send queues.
//!
//! Every destination gets its own FIFO queue. A queue is drained by a single
//! task that runs entries strictly one after another, so two sends to the
//! same chat never overlap and always reach the transport in the order they
//! were queued. Queues of different chats drain concurrently; entries only
//! arrive here after the courier's admission step, which is shared by all
//! chats (see [`crate::client::Courier`]).

use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures_util::FutureExt;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::chat::DestinationKey;
use crate::error::{CourierError, Result};

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A queued operation together with the channel its outcome is reported on.
struct QueueEntry {
    run: Box<dyn FnOnce() -> Job + Send>,
}

#[derive(Default)]
struct QueueState {
    queues: HashMap<DestinationKey, VecDeque<QueueEntry>>,
    draining: HashSet<DestinationKey>,
}

/// Outcome of an operation that is already running in the background.
///
/// The operation proceeds whether or not this future is polled; awaiting it
/// only observes the result.
#[must_use = "the operation runs anyway; await the Deferred to observe its outcome"]
pub struct Deferred<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Deferred<T> {
    pub(crate) fn pair() -> (oneshot::Sender<Result<T>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }
}

impl<T> Future for Deferred<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|outcome| outcome.unwrap_or_else(|_| Err(CourierError::Cancelled)))
    }
}

/// Keyed FIFO queues with at most one active drain per key.
///
/// Cloning is cheap and clones share the same queues.
#[derive(Clone, Default)]
pub struct SendQueue {
    state: Arc<Mutex<QueueState>>,
}

impl SendQueue {
    /// Create an empty set of queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `operation` to the queue of `key`.
    ///
    /// The entry is stored before this returns; draining is scheduled on the
    /// runtime rather than started inline, so entries queued in one burst are
    /// drained together.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn enqueue<T, F, Fut>(&self, key: DestinationKey, operation: F) -> Deferred<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (settle, deferred) = Deferred::pair();
        let entry = QueueEntry {
            run: Box::new(move || {
                Box::pin(async move {
                    // The caller may have dropped its Deferred.
                    let _ = settle.send(operation().await);
                })
            }),
        };

        {
            let mut state = self.lock();
            let queue = state.queues.entry(key.clone()).or_default();
            queue.push_back(entry);
            debug!(chat_id = %key, queued = queue.len(), "Queueing request in send-queue");
        }

        let this = self.clone();
        tokio::spawn(async move { this.trigger(&key) });

        deferred
    }

    /// Start draining the queue of `key` unless it is empty or already
    /// being drained.
    ///
    /// The whole queue is claimed at once: entries queued afterwards go into
    /// a fresh queue that is picked up when the current drain finishes.
    pub fn trigger(&self, key: &DestinationKey) {
        let entries = {
            let mut state = self.lock();
            if state.draining.contains(key) {
                return;
            }
            let Some(entries) = state.queues.remove(key) else {
                return;
            };
            state.draining.insert(key.clone());
            entries
        };

        debug!(
            chat_id = %key,
            requests = entries.len(),
            "Processing requests in send-queue"
        );

        let this = self.clone();
        let key = key.clone();
        tokio::spawn(async move { this.drain(key, entries).await });
    }

    async fn drain(self, key: DestinationKey, entries: VecDeque<QueueEntry>) {
        for entry in entries {
            if AssertUnwindSafe((entry.run)())
                .catch_unwind()
                .await
                .is_err()
            {
                warn!(chat_id = %key, "Queued request panicked, continuing with the next one");
            }
        }

        debug!(chat_id = %key, "Processing send-queue complete");
        self.lock().draining.remove(&key);
        // More requests may have been queued while we were busy.
        self.trigger(&key);
    }

    /// Number of entries waiting for `key` that no drain has claimed yet.
    #[must_use]
    pub fn pending(&self, key: &DestinationKey) -> usize {
        self.lock().queues.get(key).map_or(0, VecDeque::len)
    }

    /// Whether a drain is currently running for `key`.
    #[must_use]
    pub fn is_draining(&self, key: &DestinationKey) -> bool {
        self.lock().draining.contains(key)
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
