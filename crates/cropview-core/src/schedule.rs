//! Buffered callbacks for the interaction timeline.
//!
//! Work that must touch session state (a finished background decode, a
//! finished crop) is posted to a [`TaskQueue`] and executed later by
//! [`TaskQueue::run_due`] on the thread that owns the session. Until the
//! queue is attached to a ready surface, posted tasks are buffered in
//! submission order; attaching schedules them, counting any delay from the
//! moment of attachment.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// A unit of deferred work run against the owner `C`.
pub type Task<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

/// Handle for cancelling a posted task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

struct Entry<C> {
    id: TaskId,
    delay_ms: f64,
    /// `None` while buffered.
    due_ms: Option<f64>,
    task: Task<C>,
}

struct QueueState<C> {
    next_id: u64,
    /// Time of attachment, or of the last `run_due` while attached.
    now_ms: Option<f64>,
    entries: Vec<Entry<C>>,
}

/// A cloneable, thread-safe queue of tasks for one owner.
pub struct TaskQueue<C> {
    inner: Arc<Mutex<QueueState<C>>>,
}

impl<C> Clone for TaskQueue<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> Default for TaskQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for TaskQueue<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("TaskQueue")
            .field("attached", &state.now_ms.is_some())
            .field("pending", &state.entries.len())
            .finish()
    }
}

impl<C> TaskQueue<C> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueueState {
                next_id: 0,
                now_ms: None,
                entries: Vec::new(),
            })),
        }
    }

    // A panicking task never holds the lock, so a poisoned queue is still
    // consistent.
    fn state(&self) -> MutexGuard<'_, QueueState<C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a task to run as soon as possible.
    pub fn post<F>(&self, task: F) -> TaskId
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.post_delayed(task, 0.0)
    }

    /// Queue a task to run no earlier than `delay_ms` from now.
    ///
    /// "Now" is the last time the queue was told about, through `attach` or
    /// `run_due`. While detached the delay starts at the next `attach`.
    pub fn post_delayed<F>(&self, task: F, delay_ms: f64) -> TaskId
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        let mut state = self.state();
        let id = TaskId(state.next_id);
        state.next_id += 1;
        let delay_ms = delay_ms.max(0.0);
        let due_ms = state.now_ms.map(|now| now + delay_ms);
        state.entries.push(Entry {
            id,
            delay_ms,
            due_ms,
            task: Box::new(task),
        });
        id
    }

    /// Cancel a task that has not run yet. Returns whether it was found.
    pub fn remove(&self, id: TaskId) -> bool {
        let mut state = self.state();
        let before = state.entries.len();
        state.entries.retain(|e| e.id != id);
        state.entries.len() != before
    }

    /// Mark the surface ready and schedule everything buffered so far.
    pub fn attach(&self, now_ms: f64) {
        let mut state = self.state();
        if state.now_ms.is_some() {
            state.now_ms = Some(now_ms);
            return;
        }
        state.now_ms = Some(now_ms);
        let mut flushed = 0usize;
        for entry in state.entries.iter_mut().filter(|e| e.due_ms.is_none()) {
            entry.due_ms = Some(now_ms + entry.delay_ms);
            flushed += 1;
        }
        if flushed > 0 {
            debug!(flushed, "task queue attached");
        }
    }

    /// Return to buffering. Scheduled tasks go back to waiting for `attach`.
    pub fn detach(&self) {
        let mut state = self.state();
        state.now_ms = None;
        for entry in state.entries.iter_mut() {
            entry.due_ms = None;
        }
    }

    pub fn is_attached(&self) -> bool {
        self.state().now_ms.is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.state().entries.len()
    }

    /// Run every task due at `now_ms`, in due order then submission order.
    ///
    /// Tasks posted while running are not run until the next call. Returns
    /// the number of tasks run.
    pub fn run_due(&self, now_ms: f64, owner: &mut C) -> usize {
        let mut due = {
            let mut state = self.state();
            if state.now_ms.is_none() {
                return 0;
            }
            state.now_ms = Some(now_ms);
            let (ready, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut state.entries)
                .into_iter()
                .partition(|e| e.due_ms.is_some_and(|due| due <= now_ms));
            state.entries = waiting;
            ready
        };
        due.sort_by(|a, b| {
            a.due_ms
                .partial_cmp(&b.due_ms)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });

        let count = due.len();
        for entry in due {
            (entry.task)(owner);
        }
        count
    }
}
