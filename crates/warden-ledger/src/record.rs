//! A single punishment record.

use std::time::Duration;

use warden_protocol::{PlayerId, PunishmentKind, StoredPunishment};

/// One active ban or mute.
///
/// Times are epoch milliseconds, matching the persisted document.
/// `expires_at == None` means the punishment is permanent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PunishmentRecord {
    /// Who is punished.
    pub subject_id: PlayerId,
    /// Their name when the punishment was imposed.
    pub subject_name: String,
    /// Ban or mute.
    pub kind: PunishmentKind,
    /// Shown to the player.
    pub reason: String,
    /// When it was imposed.
    pub created_at: i64,
    /// When it lapses, if ever.
    pub expires_at: Option<i64>,
}

impl PunishmentRecord {
    /// Returns `true` if this record never expires.
    pub fn is_permanent(&self) -> bool {
        self.expires_at.is_none()
    }

    /// Returns `true` once `now` has reached the expiry time.
    /// Permanent records are never expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    /// Time left at `now`: `None` for permanent records, zero once expired.
    pub fn remaining(&self, now: i64) -> Option<Duration> {
        self.expires_at.map(|at| {
            let left = at.saturating_sub(now).max(0);
            Duration::from_millis(left as u64)
        })
    }

    pub(crate) fn from_stored(
        subject_id: PlayerId,
        kind: PunishmentKind,
        stored: StoredPunishment,
    ) -> Self {
        Self {
            subject_id,
            subject_name: stored.player_name,
            kind,
            reason: stored.reason,
            created_at: stored.created_time,
            expires_at: stored.expire_time,
        }
    }

    pub(crate) fn to_stored(&self) -> StoredPunishment {
        StoredPunishment {
            player_name: self.subject_name.clone(),
            reason: self.reason.clone(),
            expire_time: self.expires_at,
            created_time: self.created_at,
        }
    }
}
