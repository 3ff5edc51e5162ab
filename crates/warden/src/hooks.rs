//! Game event hooks.
//!
//! The host's event listeners call these. Each one is a side-effecting
//! read: checking a ban or mute may evict an expired record, and chat,
//! commands, and movement count as activity for the idle tracker.

use std::time::Duration;

use tracing::{debug, info};
use warden_presence::OnlinePlayer;
use warden_protocol::PlayerId;

use crate::Warden;

/// Integer block coordinates of a position.
///
/// Movement only counts as activity when the block changes, so looking
/// around while standing still doesn't keep a player active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The block containing a precise position.
    pub fn containing(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: x.floor() as i32,
            y: y.floor() as i32,
            z: z.floor() as i32,
        }
    }
}

/// Whether a connecting player may log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginVerdict {
    Allowed,
    /// Banned. `expires_in` is `None` for a permanent ban.
    Denied {
        reason: String,
        expires_in: Option<Duration>,
    },
}

impl LoginVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Whether a chat message may go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatVerdict {
    Allowed,
    /// Muted. `expires_in` is `None` for a permanent mute.
    Muted {
        reason: String,
        expires_in: Option<Duration>,
    },
}

impl ChatVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

impl Warden {
    /// Before the player joins: refuse banned players.
    pub fn on_pre_login(&self, id: PlayerId, name: &str) -> LoginVerdict {
        match self.query_ban(id) {
            Some(ban) => {
                let expires_in = ban.remaining(self.ledger.now_millis());
                info!(player = %id, %name, reason = %ban.reason, "banned player refused");
                LoginVerdict::Denied {
                    reason: ban.reason,
                    expires_in,
                }
            }
            None => LoginVerdict::Allowed,
        }
    }

    /// The player is in. Remembers their name for offline lookups and
    /// starts their activity clock.
    pub fn on_join(&self, player: OnlinePlayer) {
        let id = player.id;
        self.resolver.remember(id, &player.name);
        self.roster.join(player);
        self.idle.register_activity(id);
        debug!(player = %id, "player joined");
    }

    /// A chat message. Muted messages are refused and don't count as
    /// activity.
    pub fn on_chat(&self, id: PlayerId) -> ChatVerdict {
        if let Some(mute) = self.query_mute(id) {
            let expires_in = mute.remaining(self.ledger.now_millis());
            debug!(player = %id, "chat from muted player blocked");
            return ChatVerdict::Muted {
                reason: mute.reason,
                expires_in,
            };
        }
        self.idle.register_activity(id);
        ChatVerdict::Allowed
    }

    /// The player moved from `from` to `to`.
    pub fn on_move(&self, id: PlayerId, from: BlockPos, to: BlockPos) {
        if from != to {
            self.idle.register_activity(id);
        }
    }

    /// The player ran a command.
    pub fn on_command(&self, id: PlayerId) {
        self.idle.register_activity(id);
    }

    /// The player left. Their idle state goes with them; a teleport
    /// request they're part of stays until it expires.
    pub fn on_quit(&self, id: PlayerId) {
        // Off the roster first: once gone, neither the sweep nor a late
        // event can recreate the idle state cleared below.
        self.roster.leave(id);
        self.idle.clear(id);
        debug!(player = %id, "player quit");
    }
}
