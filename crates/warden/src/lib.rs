//! # Warden
//!
//! Moderation and presence core for a multiplayer game server.
//!
//! Three subsystems behind one facade:
//!
//! - a **punishment ledger** of bans and mutes with optional expiry,
//!   evicted lazily on query and by a periodic sweep, persisted
//!   write-through to a JSON file;
//! - a **teleport request table** holding at most one pending request per
//!   target, expired by a one-shot timer unless accepted first;
//! - an **idleness tracker** that marks players idle after a period
//!   without activity and announces when they return.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use warden::prelude::*;
//!
//! # async fn run() -> Result<(), WardenError> {
//! let warden = Warden::builder().build()?;
//!
//! let steve = PlayerId::random();
//! warden.on_join(OnlinePlayer::new(steve, "Steve"));
//! warden.impose_mute(steve, "Steve", "spam", Some(parse_duration("10m")?));
//! assert!(!warden.on_chat(steve).is_allowed());
//!
//! warden.shutdown()?;
//! # Ok(()) }
//! ```

mod config;
mod error;
mod hooks;
mod logging;
mod service;

pub use config::WardenConfig;
pub use error::WardenError;
pub use hooks::{BlockPos, ChatVerdict, LoginVerdict};
pub use logging::init_tracing;
pub use service::{Warden, WardenBuilder};

pub use warden_ledger::{format_duration, format_millis, parse_duration};

/// Everything a host usually needs.
pub mod prelude {
    pub use crate::{
        BlockPos, ChatVerdict, LoginVerdict, Warden, WardenBuilder, WardenConfig, WardenError,
        format_duration, init_tracing, parse_duration,
    };
    pub use warden_ledger::{Clock, ManualClock, PunishmentRecord, SystemClock};
    pub use warden_presence::{
        IdleConfig, OnlinePlayer, PendingRequest, RequestConfig, RequestError, SharedRoster,
    };
    pub use warden_protocol::{
        ChannelNotifier, LogNotifier, Notice, Notifier, PlayerId, PunishmentKind, Recipient,
    };
    pub use warden_store::{JsonFileStore, MemoryStore, PersistentStore, StoreError};
    pub use warden_tick::{Scheduler, TickPolicy, TokioScheduler};
}
