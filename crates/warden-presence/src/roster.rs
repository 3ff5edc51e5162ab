//! Who is online, as far as the idle sweep is concerned.

use std::collections::HashMap;

use parking_lot::RwLock;
use warden_protocol::PlayerId;

/// A connected player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlinePlayer {
    /// Stable id.
    pub id: PlayerId,
    /// Current name.
    pub name: String,
    /// Whether the idle sweep may flag this player. Staff who should
    /// never be auto-flagged join with `false`.
    pub idle_tracked: bool,
}

impl OnlinePlayer {
    /// A player the idle sweep tracks.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            idle_tracked: true,
        }
    }

    /// Opts the player out of automatic idle detection.
    pub fn untracked(mut self) -> Self {
        self.idle_tracked = false;
        self
    }
}

/// The host's list of connected players.
///
/// The idle sweep asks for it on every tick, so implementations should
/// be cheap and must not call back into the tracker.
pub trait Roster: Send + Sync + 'static {
    /// Everyone currently connected.
    fn online_players(&self) -> Vec<OnlinePlayer>;

    /// Returns `true` if `id` is connected right now.
    ///
    /// The tracker asks this while holding its own lock before it starts
    /// tracking someone, so a player who has already left is never
    /// tracked again. The sweep calls it once per listed player. The
    /// default scans [`online_players`](Self::online_players); override it
    /// when a direct lookup exists.
    fn is_online(&self, id: PlayerId) -> bool {
        self.online_players().iter().any(|p| p.id == id)
    }
}

/// A [`Roster`] maintained by join/leave calls.
#[derive(Debug, Default)]
pub struct SharedRoster {
    players: RwLock<HashMap<PlayerId, OnlinePlayer>>,
}

impl SharedRoster {
    /// An empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or refreshes) a connected player.
    pub fn join(&self, player: OnlinePlayer) {
        self.players.write().insert(player.id, player);
    }

    /// Removes a player. Returns what was stored, if anything.
    pub fn leave(&self, id: PlayerId) -> Option<OnlinePlayer> {
        self.players.write().remove(&id)
    }

    /// Looks up a connected player.
    pub fn get(&self, id: PlayerId) -> Option<OnlinePlayer> {
        self.players.read().get(&id).cloned()
    }

    /// Returns `true` if `id` is connected.
    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.read().contains_key(&id)
    }

    /// Number of connected players.
    pub fn len(&self) -> usize {
        self.players.read().len()
    }

    /// Returns `true` if nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.players.read().is_empty()
    }
}

impl Roster for SharedRoster {
    fn online_players(&self) -> Vec<OnlinePlayer> {
        self.players.read().values().cloned().collect()
    }

    fn is_online(&self, id: PlayerId) -> bool {
        self.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_and_leave() {
        let roster = SharedRoster::new();
        let id = PlayerId::random();
        roster.join(OnlinePlayer::new(id, "Steve"));

        assert!(roster.contains(id));
        assert_eq!(roster.online_players().len(), 1);

        let left = roster.leave(id).unwrap();
        assert_eq!(left.name, "Steve");
        assert!(roster.is_empty());
        assert!(roster.leave(id).is_none());
    }

    #[test]
    fn test_rejoin_refreshes_entry() {
        let roster = SharedRoster::new();
        let id = PlayerId::random();
        roster.join(OnlinePlayer::new(id, "Steve"));
        roster.join(OnlinePlayer::new(id, "Steve").untracked());

        assert_eq!(roster.len(), 1);
        assert!(!roster.get(id).unwrap().idle_tracked);
    }
}
