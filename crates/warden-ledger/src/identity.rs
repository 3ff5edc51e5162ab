//! Name ↔ id cache for acting on offline players.
//!
//! Moderators type names; the ledger is keyed by id. While a player is
//! online the host can resolve the name itself, but to unban someone who
//! can't log in we need to remember which id a name belonged to.

use std::collections::HashMap;

use parking_lot::RwLock;
use warden_protocol::PlayerId;

#[derive(Debug, Default)]
struct Maps {
    /// Lowercased name → id.
    by_name: HashMap<String, PlayerId>,
    /// Id → last known name (original casing).
    by_id: HashMap<PlayerId, String>,
}

/// A bidirectional, case-insensitive name cache.
///
/// Both directions live behind one lock so they never disagree: when a
/// player shows up under a new name, the old name stops resolving to them
/// in the same step.
#[derive(Debug, Default)]
pub struct IdentityResolver {
    maps: RwLock<Maps>,
}

impl IdentityResolver {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `name` currently belongs to `id`.
    pub fn remember(&self, id: PlayerId, name: &str) {
        if name.is_empty() {
            return;
        }
        let key = name.to_lowercase();
        let mut maps = self.maps.write();

        if let Some(previous) = maps.by_id.insert(id, name.to_string()) {
            let previous_key = previous.to_lowercase();
            if previous_key != key && maps.by_name.get(&previous_key) == Some(&id) {
                maps.by_name.remove(&previous_key);
            }
        }
        if let Some(displaced) = maps.by_name.insert(key, id) {
            // Someone else held this name before; they no longer do.
            if displaced != id {
                maps.by_id.remove(&displaced);
            }
        }
    }

    /// Looks up the id for `name`, ignoring case.
    pub fn resolve(&self, name: &str) -> Option<PlayerId> {
        self.maps.read().by_name.get(&name.to_lowercase()).copied()
    }

    /// Last known name for `id`.
    pub fn name_of(&self, id: PlayerId) -> Option<String> {
        self.maps.read().by_id.get(&id).cloned()
    }

    /// Number of known players.
    pub fn len(&self) -> usize {
        self.maps.read().by_id.len()
    }

    /// Returns `true` if nothing has been remembered.
    pub fn is_empty(&self) -> bool {
        self.maps.read().by_id.is_empty()
    }
}
