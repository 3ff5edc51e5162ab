//! The punishment ledger: the authoritative set of bans and mutes.
//!
//! # Concurrency
//!
//! Host event callbacks (login, chat) and the expiry sweep all hit the
//! ledger at the same time. Both record maps sit behind one mutex, so every
//! read-check-evict step is atomic: two callers racing on the same expired
//! record see exactly one eviction and one write.
//!
//! Writes to the store happen *after* the record lock is released, under a
//! separate persist lock. The snapshot is taken inside that persist lock, so
//! whichever save runs last always writes the newest state, even when two
//! mutations finish in the opposite order from how they started.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};
use warden_protocol::{LedgerDocument, PlayerId, PunishmentKind};
use warden_store::PersistentStore;

use crate::{Clock, IdentityResolver, LedgerError, PunishmentRecord};

#[derive(Debug, Default)]
struct Records {
    bans: HashMap<PlayerId, PunishmentRecord>,
    mutes: HashMap<PlayerId, PunishmentRecord>,
}

impl Records {
    fn of(&mut self, kind: PunishmentKind) -> &mut HashMap<PlayerId, PunishmentRecord> {
        match kind {
            PunishmentKind::Ban => &mut self.bans,
            PunishmentKind::Mute => &mut self.mutes,
        }
    }

    fn of_ref(&self, kind: PunishmentKind) -> &HashMap<PlayerId, PunishmentRecord> {
        match kind {
            PunishmentKind::Ban => &self.bans,
            PunishmentKind::Mute => &self.mutes,
        }
    }
}

/// Owns every active ban and mute.
///
/// ## Lifecycle of a record
///
/// ```text
/// impose() ──→ [Active] ──→ revoke() ──→ gone
///                  │
///                  └──(expires_at reached)──→ evicted by the next
///                                             query() or sweep_expired()
/// ```
///
/// There is at most one record per `(player, kind)`. Imposing again
/// replaces the old record outright; no history is kept.
pub struct PunishmentLedger {
    records: Mutex<Records>,
    /// Serializes snapshot-and-save so saves land in order.
    persist_lock: Mutex<()>,
    store: Arc<dyn PersistentStore>,
    resolver: Arc<IdentityResolver>,
    clock: Arc<dyn Clock>,
}

impl PunishmentLedger {
    /// Opens the ledger, loading whatever the store holds.
    ///
    /// Loading is best-effort: a store that can't be read is logged and the
    /// ledger starts empty; entries whose key isn't a valid player id are
    /// skipped. Every loaded record teaches `resolver` its player's name.
    pub fn open(
        store: Arc<dyn PersistentStore>,
        resolver: Arc<IdentityResolver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut records = Records::default();

        match store.load() {
            Ok(Some(document)) => {
                for kind in PunishmentKind::ALL {
                    for (key, stored) in document.section(kind) {
                        let Ok(subject_id) = key.parse::<PlayerId>() else {
                            warn!(key = %key, %kind, "skipping ledger entry with invalid player id");
                            continue;
                        };
                        resolver.remember(subject_id, &stored.player_name);
                        let record =
                            PunishmentRecord::from_stored(subject_id, kind, stored.clone());
                        records.of(kind).insert(subject_id, record);
                    }
                }
                info!(
                    bans = records.bans.len(),
                    mutes = records.mutes.len(),
                    "punishment ledger loaded"
                );
            }
            Ok(None) => debug!("punishment ledger starting empty"),
            Err(e) => warn!(error = %e, "failed to load punishment ledger, starting empty"),
        }

        Self {
            records: Mutex::new(records),
            persist_lock: Mutex::new(()),
            store,
            resolver,
            clock,
        }
    }

    /// The resolver this ledger feeds.
    pub fn resolver(&self) -> &Arc<IdentityResolver> {
        &self.resolver
    }

    /// Current time according to the ledger's clock.
    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Punishes `subject_id`, replacing any record of the same kind.
    ///
    /// `duration == None` makes the punishment permanent. Always succeeds;
    /// the write-through to the store is best-effort.
    pub fn impose(
        &self,
        subject_id: PlayerId,
        subject_name: &str,
        kind: PunishmentKind,
        reason: &str,
        duration: Option<Duration>,
    ) -> PunishmentRecord {
        let now = self.clock.now_millis();
        let expires_at = duration.map(|d| {
            let ms = i64::try_from(d.as_millis()).unwrap_or(i64::MAX);
            now.saturating_add(ms)
        });

        let record = PunishmentRecord {
            subject_id,
            subject_name: subject_name.to_string(),
            kind,
            reason: reason.to_string(),
            created_at: now,
            expires_at,
        };

        let replaced = self
            .records
            .lock()
            .of(kind)
            .insert(subject_id, record.clone())
            .is_some();

        self.resolver.remember(subject_id, subject_name);
        info!(
            %subject_id,
            name = subject_name,
            %kind,
            permanent = record.is_permanent(),
            replaced,
            "punishment imposed"
        );

        self.persist();
        record
    }

    /// Returns the active record of `kind` for `subject_id`.
    ///
    /// If the record has expired it is evicted (and the eviction persisted)
    /// right here, and `None` comes back. This is the only read path.
    pub fn query(&self, subject_id: PlayerId, kind: PunishmentKind) -> Option<PunishmentRecord> {
        let now = self.clock.now_millis();

        let (active, evicted) = {
            let mut records = self.records.lock();
            let map = records.of(kind);
            match map.get(&subject_id).map(|r| r.is_expired_at(now)) {
                None => (None, false),
                Some(true) => {
                    map.remove(&subject_id);
                    (None, true)
                }
                Some(false) => (map.get(&subject_id).cloned(), false),
            }
        };

        if evicted {
            info!(%subject_id, %kind, "punishment expired");
            self.persist();
        }
        active
    }

    /// Removes the record of `kind` for `subject_id`.
    ///
    /// Returns `true` only if an *active* record was removed. An expired
    /// record is still cleaned up, but reports `false`.
    pub fn revoke(&self, subject_id: PlayerId, kind: PunishmentKind) -> bool {
        let removed = self.records.lock().of(kind).remove(&subject_id);
        self.finish_revoke(removed)
    }

    /// Removes the record of `kind` for the player called `name`.
    ///
    /// The name is resolved through the [`IdentityResolver`] first. If the
    /// resolver has never heard of it, records are scanned for a matching
    /// stored name (case-insensitive).
    pub fn revoke_by_name(&self, name: &str, kind: PunishmentKind) -> bool {
        if let Some(subject_id) = self.resolver.resolve(name) {
            return self.revoke(subject_id, kind);
        }

        let wanted = name.to_lowercase();
        let removed = {
            let mut records = self.records.lock();
            let map = records.of(kind);
            let found = map
                .iter()
                .find(|(_, r)| r.subject_name.to_lowercase() == wanted)
                .map(|(id, _)| *id);
            found.and_then(|id| map.remove(&id))
        };

        if removed.is_none() {
            debug!(name, %kind, "nothing to revoke by name");
        }
        self.finish_revoke(removed)
    }

    fn finish_revoke(&self, removed: Option<PunishmentRecord>) -> bool {
        let Some(record) = removed else {
            return false;
        };
        let was_active = !record.is_expired_at(self.clock.now_millis());
        info!(
            subject_id = %record.subject_id,
            kind = %record.kind,
            was_active,
            "punishment revoked"
        );
        self.persist();
        was_active
    }

    /// Evicts every expired record in one pass. Returns how many went.
    ///
    /// Lazy expiry in [`query`](Self::query) already guarantees nobody sees
    /// a stale record; this keeps the stored document from accumulating
    /// records for players who never come back.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let evicted = {
            let mut records = self.records.lock();
            let mut evicted = 0;
            for kind in PunishmentKind::ALL {
                let map = records.of(kind);
                let before = map.len();
                map.retain(|_, r| !r.is_expired_at(now));
                evicted += before - map.len();
            }
            evicted
        };

        if evicted > 0 {
            info!(evicted, "expired punishments swept");
            self.persist();
        }
        evicted
    }

    /// Number of records of `kind` currently held (expired or not).
    pub fn count(&self, kind: PunishmentKind) -> usize {
        self.records.lock().of_ref(kind).len()
    }

    /// The ledger as it would be persisted.
    pub fn snapshot(&self) -> LedgerDocument {
        let records = self.records.lock();
        let mut document = LedgerDocument::default();
        for kind in PunishmentKind::ALL {
            let section = document.section_mut(kind);
            for (id, record) in records.of_ref(kind) {
                section.insert(id.to_string(), record.to_stored());
            }
        }
        document
    }

    /// Writes the current state to the store, reporting failure.
    ///
    /// Mutations already write through on their own; this exists for
    /// shutdown, where the caller wants to know if the final save worked.
    pub fn flush(&self) -> Result<(), LedgerError> {
        let _guard = self.persist_lock.lock();
        let document = self.snapshot();
        self.store.save(&document)?;
        Ok(())
    }

    /// Best-effort write-through after a mutation.
    fn persist(&self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "ledger write-through failed, keeping in-memory state");
        }
    }
}
