//! The [`Scheduler`] trait and its Tokio implementation.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

use crate::{TaskHandle, TickError};

// ---------------------------------------------------------------------------
// Scheduler trait
// ---------------------------------------------------------------------------

/// The timer service the state engines consume.
///
/// Callbacks are boxed so the trait stays object-safe: subsystems hold an
/// `Arc<dyn Scheduler>` and never know which implementation drives them.
///
/// ## Callback bounds
///
/// - `FnOnce` for [`after`](Self::after): a deadline fires at most once,
///   so the callback may move its captures out (for example a `Weak` it
///   upgrades and consumes).
/// - `FnMut` for [`every`](Self::every): a sweep runs many times and may
///   keep counters between runs, but never gives its captures away.
/// - `Send` → the callback runs on a Tokio worker thread, not the thread
///   that scheduled it.
/// - `'static` → it may outlive the caller's stack frame, so it must own
///   what it captures. Engines capture an `Arc` or `Weak` to their shared
///   state rather than `&self`.
///
/// Callbacks run concurrently with host event callbacks, so whatever they
/// touch must be behind a lock or an atomic.
pub trait Scheduler: Send + Sync + 'static {
    /// Runs `task` once, `delay` from now, unless cancelled first.
    fn after(&self, delay: Duration, task: Box<dyn FnOnce() + Send + 'static>) -> TaskHandle;

    /// Runs `task` every `period`, first run one period from now, until
    /// cancelled.
    fn every(&self, period: Duration, task: Box<dyn FnMut() + Send + 'static>) -> TaskHandle;

    /// Cancels every task this scheduler still has outstanding.
    fn cancel_all(&self);
}

// ---------------------------------------------------------------------------
// TickPolicy
// ---------------------------------------------------------------------------

/// What a repeating task does when it falls behind (for example because
/// the process was suspended).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickPolicy {
    /// Skip the missed ticks and resume on the original cadence.
    /// Right for sweeps: one late sweep sees the same state ten would.
    #[default]
    Skip,
    /// Run every missed tick back-to-back.
    CatchUp,
    /// Run one tick now and restart the cadence from here.
    Delay,
}

impl TickPolicy {
    fn missed_tick_behavior(self) -> MissedTickBehavior {
        match self {
            Self::Skip => MissedTickBehavior::Skip,
            Self::CatchUp => MissedTickBehavior::Burst,
            Self::Delay => MissedTickBehavior::Delay,
        }
    }
}

// ---------------------------------------------------------------------------
// TokioScheduler
// ---------------------------------------------------------------------------

/// Smallest period a repeating task may use. Tokio's interval rejects a
/// zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A [`Scheduler`] that spawns one Tokio task per timer.
///
/// Outstanding handles are remembered so [`cancel_all`](Scheduler::cancel_all)
/// can stop them at shutdown. Finished handles are pruned whenever a new
/// timer is scheduled, so the list stays proportional to live timers.
pub struct TokioScheduler {
    runtime: Handle,
    policy: TickPolicy,
    outstanding: Mutex<Vec<TaskHandle>>,
}

impl TokioScheduler {
    /// Creates a scheduler on the current Tokio runtime.
    ///
    /// # Errors
    /// Returns [`TickError::NoRuntime`] when called outside a runtime.
    pub fn new() -> Result<Self, TickError> {
        let runtime = Handle::try_current().map_err(|_| TickError::NoRuntime)?;
        Ok(Self::with_handle(runtime))
    }

    /// Creates a scheduler that spawns onto the given runtime.
    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            runtime,
            policy: TickPolicy::default(),
            outstanding: Mutex::new(Vec::new()),
        }
    }

    /// Sets the missed-tick policy for repeating tasks.
    pub fn with_policy(mut self, policy: TickPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Number of tasks that have not fired, finished, or been cancelled.
    pub fn outstanding(&self) -> usize {
        self.outstanding
            .lock()
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    fn track(&self, handle: &TaskHandle) {
        let mut outstanding = self.outstanding.lock();
        outstanding.retain(|h| !h.is_finished());
        outstanding.push(handle.clone());
    }
}

impl Scheduler for TokioScheduler {
    fn after(&self, delay: Duration, task: Box<dyn FnOnce() + Send + 'static>) -> TaskHandle {
        let handle = TaskHandle::new();
        let guard = handle.clone();

        let join = self.runtime.spawn(async move {
            time::sleep(delay).await;
            // Losing this race means cancel() got there first.
            if guard.try_fire() {
                trace!("one-shot timer fired");
                task();
            }
        });

        let handle = handle.with_abort(join.abort_handle());
        self.track(&handle);
        trace!(delay_ms = delay.as_millis() as u64, "one-shot timer scheduled");
        handle
    }

    fn every(&self, period: Duration, mut task: Box<dyn FnMut() + Send + 'static>) -> TaskHandle {
        let period = if period < MIN_PERIOD {
            warn!(
                period_ms = period.as_secs_f64() * 1000.0,
                "repeating period below minimum, clamping"
            );
            MIN_PERIOD
        } else {
            period
        };

        let handle = TaskHandle::new();
        let guard = handle.clone();
        let behavior = self.policy.missed_tick_behavior();

        let join = self.runtime.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(behavior);
            loop {
                interval.tick().await;
                if guard.is_cancelled() {
                    break;
                }
                task();
            }
        });

        let handle = handle.with_abort(join.abort_handle());
        self.track(&handle);
        debug!(
            period_ms = period.as_millis() as u64,
            policy = ?self.policy,
            "repeating task scheduled"
        );
        handle
    }

    fn cancel_all(&self) {
        let drained: Vec<TaskHandle> = std::mem::take(&mut *self.outstanding.lock());
        let live = drained.iter().filter(|h| !h.is_finished()).count();
        for handle in &drained {
            handle.cancel();
        }
        debug!(cancelled = live, "all scheduled tasks cancelled");
    }
}
