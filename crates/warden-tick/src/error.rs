//! Error types for the timer layer.

/// Errors that can occur while setting up a scheduler.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// [`TokioScheduler::new`](crate::TokioScheduler::new) was called
    /// outside of a Tokio runtime, so there is nowhere to spawn timers.
    #[error("no tokio runtime available to drive timers")]
    NoRuntime,
}
