//! The punishment ledger: bans and mutes with expiry.
//!
//! This crate owns every active punishment record:
//!
//! 1. **Imposing**: [`PunishmentLedger::impose`] replaces whatever record
//!    of the same kind the player had (no history is kept).
//! 2. **Reading**: [`PunishmentLedger::query`] is the one way to read
//!    punishment state. It evicts an expired record on the spot, so no
//!    caller ever sees a stale one ("lazy expiry").
//! 3. **Revoking**: by id, or by name for players who are offline
//!    ([`IdentityResolver`] maps names back to ids).
//! 4. **Durability**: every mutation is written through a
//!    [`PersistentStore`](warden_store::PersistentStore). A failed write is
//!    logged and the in-memory state stays authoritative.
//!
//! Durations typed by moderators (`"1d12h30m"`) are handled by
//! [`parse_duration`], and shown back with [`format_millis`].

mod clock;
mod duration;
mod error;
mod identity;
mod ledger;
mod record;

pub use clock::{Clock, ManualClock, SystemClock};
pub use duration::{format_duration, format_millis, parse_duration};
pub use error::LedgerError;
pub use identity::IdentityResolver;
pub use ledger::PunishmentLedger;
pub use record::PunishmentRecord;
