//! Callback Dispatch
//!
//! Delivers completions from the raster worker to the thread that owns the UI.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::queue::Task;

/// Route a completion to the interactive thread
pub trait CallbackDispatcher: Send + Sync {
    fn dispatch(&self, task: Task);
}

/// Runs callbacks immediately on the worker thread.
///
/// Empty-state notifications then run while model locks are held, so an
/// observer must not call back into the model.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatcher;

impl CallbackDispatcher for InlineDispatcher {
    fn dispatch(&self, task: Task) {
        task();
    }
}

#[derive(Default)]
struct MainQueueInner {
    tasks: Mutex<VecDeque<Task>>,
    ready: Condvar,
}

/// Callbacks parked until the interactive thread drains them.
///
/// Clones share the same queue.
#[derive(Clone, Default)]
pub struct MainQueue {
    inner: Arc<MainQueueInner>,
}

impl std::fmt::Debug for MainQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainQueue").field("pending", &self.len()).finish()
    }
}

impl MainQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.tasks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every callback queued so far; returns how many ran.
    ///
    /// Callbacks queued while these run wait for the next call.
    pub fn run_pending(&self) -> usize {
        let batch = std::mem::take(&mut *self.inner.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        let count = batch.len();
        for task in batch {
            task();
        }
        if count > 0 {
            tracing::trace!(count, "Ran main-thread callbacks");
        }
        count
    }

    /// Wait up to `timeout` for at least one callback, then run the batch
    pub fn run_pending_timeout(&self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        {
            let mut tasks = self.inner.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            while tasks.is_empty() {
                let now = Instant::now();
                if now >= deadline {
                    return 0;
                }
                tasks = self
                    .inner
                    .ready
                    .wait_timeout(tasks, deadline - now)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
        }
        self.run_pending()
    }
}

impl CallbackDispatcher for MainQueue {
    fn dispatch(&self, task: Task) {
        let mut tasks = self.inner.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.push_back(task);
        self.inner.ready.notify_all();
    }
}
