//! Timers for Warden: one-shot deferred callbacks and repeating ticks.
//!
//! The state engines never touch Tokio timers directly. They consume the
//! [`Scheduler`] trait, which offers exactly three things:
//!
//! - [`Scheduler::after`]: run a callback once after a delay,
//! - [`Scheduler::every`]: run a callback repeatedly at a fixed period,
//! - [`Scheduler::cancel_all`]: stop everything (shutdown).
//!
//! Both `after` and `every` return a [`TaskHandle`]. Cancelling a handle
//! is idempotent: it is fine to cancel twice, or after the callback has
//! already fired. A one-shot callback runs at most once, and never after
//! a `cancel()` that returned before it started.
//!
//! [`TokioScheduler`] is the production implementation.
//!
//! ```ignore
//! let scheduler = TokioScheduler::new()?;
//! let handle = scheduler.after(Duration::from_secs(60), Box::new(|| expire()));
//! // ... later, the request was accepted:
//! handle.cancel();
//! ```

mod error;
mod handle;
mod scheduler;

pub use error::TickError;
pub use handle::TaskHandle;
pub use scheduler::{Scheduler, TickPolicy, TokioScheduler};
