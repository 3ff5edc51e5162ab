//! Identity types shared by every Warden subsystem.
//!
//! Subsystems never hold references into each other's state. They refer
//! to players by value through [`PlayerId`], so the ledger, the request
//! table, and the idleness tracker can each evolve on their own.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// A stable identifier for a player.
///
/// Names can change; this can't. It wraps the host's UUID so it can be
/// used as a map key (`Hash + Eq`) and copied freely (`Copy`).
///
/// `#[serde(transparent)]` serializes it as the bare hyphenated UUID
/// string, which is also the key format of the persisted ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Generates a fresh random id. Mostly useful in tests and demos;
    /// real ids come from the host.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn into_inner(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for PlayerId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ProtocolError::InvalidPlayerId(s.to_string()))
    }
}

impl From<Uuid> for PlayerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// PunishmentKind
// ---------------------------------------------------------------------------

/// The two kinds of punishment the ledger tracks.
///
/// A player can hold at most one active record per kind, so a ban and a
/// mute can coexist but two bans can't.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PunishmentKind {
    /// Denies login.
    Ban,
    /// Denies chat.
    Mute,
}

impl PunishmentKind {
    /// Both kinds, in persisted-document order.
    pub const ALL: [PunishmentKind; 2] = [PunishmentKind::Ban, PunishmentKind::Mute];
}

impl fmt::Display for PunishmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ban => write!(f, "ban"),
            Self::Mute => write!(f, "mute"),
        }
    }
}
