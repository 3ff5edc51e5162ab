//! Cancellable handles for scheduled work.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::task::AbortHandle;

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// A handle to a scheduled one-shot or repeating task.
///
/// Cheap to clone; every clone controls the same task.
///
/// The handle carries a small state machine shared with the task itself:
///
/// ```text
/// Pending ──(task starts its callback)──→ Fired
///    │
///    └──(cancel)──→ Cancelled
/// ```
///
/// Both transitions out of `Pending` are compare-and-swap, so when a
/// `cancel()` races the timer exactly one of them wins. Repeating tasks
/// never move to `Fired`; they check [`is_cancelled`](Self::is_cancelled)
/// before each run.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    state: Arc<AtomicU8>,
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    /// Creates a pending handle that isn't tied to a Tokio task.
    ///
    /// Custom [`Scheduler`](crate::Scheduler) implementations use this
    /// together with [`try_fire`](Self::try_fire) to follow the same
    /// cancellation protocol as [`TokioScheduler`](crate::TokioScheduler).
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(PENDING)),
            abort: None,
        }
    }

    pub(crate) fn with_abort(mut self, abort: AbortHandle) -> Self {
        self.abort = Some(abort);
        self
    }

    /// Cancels the task. Safe to call any number of times, and safe to
    /// call after the task already fired (it does nothing then).
    pub fn cancel(&self) {
        let _ = self.state.compare_exchange(
            PENDING,
            CANCELLED,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    /// Claims the right to run a one-shot callback.
    ///
    /// Returns `true` exactly once, and only if the handle hasn't been
    /// cancelled first.
    pub fn try_fire(&self) -> bool {
        self.state
            .compare_exchange(PENDING, FIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether [`cancel`](Self::cancel) won the race against the task.
    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    /// Whether the task is done: fired, cancelled, or its Tokio task exited.
    pub fn is_finished(&self) -> bool {
        self.state.load(Ordering::Acquire) != PENDING
            || self.abort.as_ref().is_some_and(AbortHandle::is_finished)
    }
}

impl Default for TaskHandle {
    fn default() -> Self {
        Self::new()
    }
}
