//! Presence state for Warden: who asked to teleport to whom, and who's idle.
//!
//! Two independent engines, both keyed by [`PlayerId`](warden_protocol::PlayerId)
//! and both reconciled by timers from a [`Scheduler`](warden_tick::Scheduler):
//!
//! - [`TimeoutRequestTable`]: at most one pending teleport request per
//!   target, expired by a one-shot timer unless accepted first.
//! - [`IdlenessTracker`]: a last-activity timestamp per player, classified
//!   idle by a periodic sweep and cleared by the next sign of activity.
//!
//! Both read the monotonic Tokio clock, so tests can pause and advance
//! time instead of sleeping for real.

mod config;
mod error;
mod idle;
mod request;
mod roster;

pub use config::{IdleConfig, RequestConfig};
pub use error::RequestError;
pub use idle::{ActivityState, IdlenessTracker};
pub use request::{PendingRequest, TimeoutRequestTable};
pub use roster::{OnlinePlayer, Roster, SharedRoster};
