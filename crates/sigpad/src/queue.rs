//! Serial Queue
//!
//! Single background worker running tasks strictly in submission order.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError, mpsc};
use std::thread::{self, JoinHandle, ThreadId};

/// Task function type
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Pending work shared with the worker
struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
    condvar: Condvar,
    shutdown: AtomicBool,
}

impl TaskQueue {
    fn new() -> Self {
        Self {
            tasks: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            shutdown: AtomicBool::new(false),
        }
    }

    fn push(&self, task: Task) -> bool {
        if self.shutdown.load(Ordering::SeqCst) {
            return false;
        }
        let mut queue = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        queue.push_back(task);
        self.condvar.notify_one();
        true
    }

    /// Next task, or `None` once shut down and drained
    fn wait_for_task(&self) -> Option<Task> {
        let mut queue = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);

        loop {
            if let Some(task) = queue.pop_front() {
                return Some(task);
            }

            if self.shutdown.load(Ordering::SeqCst) {
                return None;
            }

            queue = self.condvar.wait(queue).unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn shutdown(&self) {
        // Taken under the lock so a sleeping worker cannot miss the wakeup
        let _queue = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        self.shutdown.store(true, Ordering::SeqCst);
        self.condvar.notify_all();
    }

    fn len(&self) -> usize {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Background queue with exactly one worker thread
pub struct SerialQueue {
    queue: Arc<TaskQueue>,
    worker: Option<JoinHandle<()>>,
    worker_id: ThreadId,
    name: String,
    completed: Arc<AtomicUsize>,
}

impl std::fmt::Debug for SerialQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialQueue")
            .field("name", &self.name)
            .field("running", &self.worker.is_some())
            .field("pending", &self.queue.len())
            .field("completed", &self.completed.load(Ordering::Relaxed))
            .finish()
    }
}

impl SerialQueue {
    /// Spawn the worker thread
    pub fn new(name: &str) -> std::io::Result<Self> {
        let queue = Arc::new(TaskQueue::new());
        let completed = Arc::new(AtomicUsize::new(0));

        let worker_queue = Arc::clone(&queue);
        let worker_completed = Arc::clone(&completed);
        let worker_name = name.to_string();
        let worker = thread::Builder::new().name(name.to_string()).spawn(move || {
            while let Some(task) = worker_queue.wait_for_task() {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "unknown panic".to_string());
                    tracing::error!(worker = %worker_name, "Task panicked: {}", message);
                }
                worker_completed.fetch_add(1, Ordering::SeqCst);
            }
            tracing::debug!(worker = %worker_name, "Worker stopped");
        })?;

        tracing::debug!(worker = name, "Worker started");

        Ok(Self {
            queue,
            worker_id: worker.thread().id(),
            worker: Some(worker),
            name: name.to_string(),
            completed,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue a task behind everything submitted before it
    pub fn submit<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if !self.queue.push(Box::new(f)) {
            tracing::warn!(worker = %self.name, "Task submitted after shutdown was dropped");
        }
    }

    /// Tasks finished so far, including ones that panicked
    pub fn completed_tasks(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// True when called from the worker thread itself
    pub fn is_worker_thread(&self) -> bool {
        thread::current().id() == self.worker_id
    }

    /// Block until every task submitted before this call has run.
    ///
    /// Returns immediately when called from the worker.
    pub fn flush(&self) {
        if self.is_worker_thread() {
            return;
        }
        let (tx, rx) = mpsc::channel();
        self.submit(move || {
            let _ = tx.send(());
        });
        // A closed channel means the barrier was dropped at shutdown
        let _ = rx.recv();
    }

    /// Stop accepting work, drain what is queued and join the worker
    pub fn shutdown(&mut self) {
        self.queue.shutdown();

        if let Some(worker) = self.worker.take() {
            if self.is_worker_thread() {
                // Dropped from inside a task; the worker exits once drained
                return;
            }
            if worker.join().is_err() {
                tracing::error!(worker = %self.name, "Worker thread panicked");
            }
        }
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}
