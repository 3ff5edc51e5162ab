//! Shared vocabulary for Warden.
//!
//! Every other crate in the workspace speaks in terms of the types
//! defined here:
//!
//! - **Identity** ([`PlayerId`], [`PunishmentKind`]): who a record or
//!   request is about, and what kind of punishment it is.
//! - **Notices** ([`Notice`], [`Recipient`], [`Notifier`]): the events the
//!   core emits to the host's broadcast service. The core decides *when*
//!   and *how many times* a notice fires; rendering is the host's job.
//! - **Ledger document** ([`LedgerDocument`], [`StoredPunishment`]): the
//!   persisted shape of the punishment ledger.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how the document is
//!   turned into bytes and back.
//!
//! # Architecture
//!
//! ```text
//! warden (facade, hooks)
//!     ↕
//! warden-ledger / warden-presence (state engines)
//!     ↕
//! warden-store / warden-tick (durability, timers)
//!     ↕
//! warden-protocol (this crate)
//! ```

mod codec;
mod document;
mod error;
mod notice;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use document::{LedgerDocument, StoredPunishment};
pub use error::ProtocolError;
pub use notice::{ChannelNotifier, LogNotifier, Notice, Notifier, Recipient};
pub use types::{PlayerId, PunishmentKind};
