//! Single-flight FIFO task queue.
//!
//! [`TaskQueue`] runs submitted tasks strictly one at a time, in submission
//! order. The first submission onto an idle queue spawns a drain loop on the
//! Tokio runtime; later submissions only append. A task that fails or panics
//! is logged and the loop moves on to the next one.
//!
//! # Example
//!
//! ```no_run
//! use anidrop::queue::TaskQueue;
//!
//! # async fn example() {
//! let queue = TaskQueue::new();
//! queue.submit("episode 1", || async { Ok(()) });
//! queue.submit("episode 2", || async { Ok(()) });
//! queue.wait_idle().await;
//! # }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, error, info};

/// Boxed body of a queued task.
pub type TaskFn = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<()>> + Send>;

/// Submission-order identity of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of a task as seen from outside the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTask {
    pub id: TaskId,
    pub label: String,
}

/// A unit of work owned by the queue until it starts.
pub struct Task {
    id: TaskId,
    label: String,
    run: TaskFn,
}

impl Task {
    fn snapshot(&self) -> QueuedTask {
        QueuedTask {
            id: self.id,
            label: self.label.clone(),
        }
    }
}

#[derive(Default)]
struct State {
    pending: VecDeque<Task>,
    running: Option<QueuedTask>,
    draining: bool,
    next_id: u64,
}

struct Inner {
    state: Mutex<State>,
    idle: Notify,
}

/// Cloneable handle to a single-flight task queue.
#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<Inner>,
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    next_id: 1,
                    ..State::default()
                }),
                idle: Notify::new(),
            }),
        }
    }

    /// Append a task and start draining if the queue was idle.
    ///
    /// Never blocks the caller. Must be called from within a Tokio runtime.
    pub fn submit<F, Fut>(&self, label: impl Into<String>, task: F) -> TaskId
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let label = label.into();
        let run: TaskFn = Box::new(move || task().boxed());

        let (id, start, position) = {
            let mut state = self.inner.state.lock();
            let id = TaskId(state.next_id);
            state.next_id += 1;
            state.pending.push_back(Task {
                id,
                label: label.clone(),
                run,
            });

            let start = !state.draining;
            state.draining = true;
            (id, start, state.pending.len())
        };

        info!(task = %id, label = %label, position, "Task queued");

        if start {
            tokio::spawn(drain(self.inner.clone()));
        }

        id
    }

    /// Tasks waiting to run, in execution order.
    pub fn pending(&self) -> Vec<QueuedTask> {
        let state = self.inner.state.lock();
        state.pending.iter().map(Task::snapshot).collect()
    }

    /// The task currently executing, if any.
    pub fn running(&self) -> Option<QueuedTask> {
        self.inner.state.lock().running.clone()
    }

    /// Whether nothing is pending and nothing is running.
    pub fn is_idle(&self) -> bool {
        let state = self.inner.state.lock();
        !state.draining && state.pending.is_empty()
    }

    /// Operator-facing listing of the pending tasks.
    pub fn describe(&self) -> String {
        let pending = self.pending();
        if pending.is_empty() {
            return "Queue is empty".to_string();
        }

        let mut out = String::from("Current Queue:");
        for (i, task) in pending.iter().enumerate() {
            out.push_str(&format!("\n{}. {}", i + 1, task.label));
        }
        out
    }

    /// Resolve once the queue has drained completely.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_idle() {
                return;
            }

            notified.await;
        }
    }
}

async fn drain(inner: Arc<Inner>) {
    debug!("Queue drain started");

    loop {
        let task = {
            let mut state = inner.state.lock();
            match state.pending.pop_front() {
                Some(task) => {
                    state.running = Some(task.snapshot());
                    task
                }
                None => {
                    state.running = None;
                    state.draining = false;
                    break;
                }
            }
        };

        run_task(task).await;
    }

    debug!("Queue drained");
    inner.idle.notify_waiters();
}

async fn run_task(task: Task) {
    let Task { id, label, run } = task;
    info!(task = %id, label = %label, "Task started");

    let future = match std::panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(future) => future,
        Err(panic) => {
            error!(task = %id, label = %label, "Task panicked: {}", panic_message(&panic));
            return;
        }
    };

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(())) => info!(task = %id, label = %label, "Task finished"),
        Ok(Err(e)) => error!(task = %id, label = %label, "Task failed: {:#}", e),
        Err(panic) => {
            error!(task = %id, label = %label, "Task panicked: {}", panic_message(&panic))
        }
    }
}

fn panic_message(panic: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
