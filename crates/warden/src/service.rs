//! `Warden` builder and the command-layer entry points.
//!
//! This is the object a host creates once at startup and hands to its
//! command handlers and event listeners. It owns the ledger, the request
//! table, and the idleness tracker, and wires them to one scheduler and
//! one notifier.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use warden_ledger::{Clock, IdentityResolver, PunishmentLedger, PunishmentRecord, SystemClock};
use warden_presence::{IdlenessTracker, PendingRequest, SharedRoster, TimeoutRequestTable};
use warden_protocol::{LogNotifier, Notifier, PlayerId, PunishmentKind};
use warden_store::{JsonFileStore, PersistentStore};
use warden_tick::{Scheduler, TaskHandle, TokioScheduler};

use crate::{WardenConfig, WardenError};

/// Builder for configuring and starting a [`Warden`].
///
/// Every collaborator has a production default, so the common case is
///
/// ```rust,no_run
/// # async fn run() -> Result<(), warden::WardenError> {
/// let warden = warden::Warden::builder().build()?;
/// # Ok(()) }
/// ```
///
/// Tests swap in a `MemoryStore`, a `ManualClock`, and a
/// `ChannelNotifier`.
pub struct WardenBuilder {
    config: WardenConfig,
    store: Option<Arc<dyn PersistentStore>>,
    clock: Option<Arc<dyn Clock>>,
    notifier: Option<Arc<dyn Notifier>>,
    roster: Option<Arc<SharedRoster>>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl WardenBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: WardenConfig::default(),
            store: None,
            clock: None,
            notifier: None,
            roster: None,
            scheduler: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: WardenConfig) -> Self {
        self.config = config;
        self
    }

    /// Persists the ledger here instead of a JSON file at
    /// `config.ledger_path`.
    pub fn store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Wall clock for punishment timestamps. Defaults to the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Where notices go. Defaults to [`LogNotifier`].
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Shares an existing roster instead of creating one.
    pub fn roster(mut self, roster: Arc<SharedRoster>) -> Self {
        self.roster = Some(roster);
        self
    }

    /// Drives timers with this scheduler instead of a new
    /// [`TokioScheduler`].
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Opens the ledger and starts the idle and expiry sweeps.
    ///
    /// # Errors
    /// [`WardenError::Tick`] when no scheduler was given and there's no
    /// Tokio runtime to create one on.
    pub fn build(self) -> Result<Warden, WardenError> {
        let config = self.config;

        let scheduler: Arc<dyn Scheduler> = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Arc::new(TokioScheduler::new()?),
        };
        let store: Arc<dyn PersistentStore> = match self.store {
            Some(store) => store,
            None => Arc::new(JsonFileStore::new(config.ledger_path.clone())),
        };
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None => Arc::new(LogNotifier),
        };
        let roster = self.roster.unwrap_or_default();

        let resolver = Arc::new(IdentityResolver::new());
        let ledger = Arc::new(PunishmentLedger::open(store, Arc::clone(&resolver), clock));

        let requests = TimeoutRequestTable::new(
            config.request.clone(),
            Arc::clone(&scheduler),
            Arc::clone(&notifier),
        );
        let idle = IdlenessTracker::new(config.idle.clone(), roster.clone(), notifier);
        idle.start(scheduler.as_ref());

        let weak = Arc::downgrade(&ledger);
        let expiry_sweep = scheduler.every(
            config.expiry_sweep_interval,
            Box::new(move || {
                if let Some(ledger) = weak.upgrade() {
                    ledger.sweep_expired();
                }
            }),
        );

        info!(
            bans = ledger.count(PunishmentKind::Ban),
            mutes = ledger.count(PunishmentKind::Mute),
            request_timeout_secs = config.request.timeout.as_secs(),
            idle_threshold_secs = config.idle.threshold.as_secs(),
            "warden started"
        );

        Ok(Warden {
            config,
            ledger,
            resolver,
            requests,
            idle,
            roster,
            scheduler,
            expiry_sweep,
        })
    }
}

impl Default for WardenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The moderation and presence core.
///
/// All methods take `&self` and are safe to call from any thread; share
/// it behind an `Arc`.
pub struct Warden {
    config: WardenConfig,
    pub(crate) ledger: Arc<PunishmentLedger>,
    pub(crate) resolver: Arc<IdentityResolver>,
    requests: TimeoutRequestTable,
    pub(crate) idle: IdlenessTracker,
    pub(crate) roster: Arc<SharedRoster>,
    scheduler: Arc<dyn Scheduler>,
    expiry_sweep: TaskHandle,
}

impl Warden {
    /// Creates a new builder.
    pub fn builder() -> WardenBuilder {
        WardenBuilder::new()
    }

    /// The configuration this instance was built with.
    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    /// The underlying ledger, for listings and diagnostics.
    pub fn ledger(&self) -> &PunishmentLedger {
        &self.ledger
    }

    /// Name/id lookups for offline players.
    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    /// The players the idle sweep sees.
    pub fn roster(&self) -> &SharedRoster {
        &self.roster
    }

    // -- punishments --------------------------------------------------------

    /// Bans a player. `duration == None` bans permanently.
    pub fn impose_ban(
        &self,
        id: PlayerId,
        name: &str,
        reason: &str,
        duration: Option<Duration>,
    ) -> PunishmentRecord {
        self.ledger
            .impose(id, name, PunishmentKind::Ban, reason, duration)
    }

    /// Mutes a player. `duration == None` mutes permanently.
    pub fn impose_mute(
        &self,
        id: PlayerId,
        name: &str,
        reason: &str,
        duration: Option<Duration>,
    ) -> PunishmentRecord {
        self.ledger
            .impose(id, name, PunishmentKind::Mute, reason, duration)
    }

    /// Lifts a ban. Returns `false` if there was no active ban.
    pub fn revoke_ban(&self, id: PlayerId) -> bool {
        self.ledger.revoke(id, PunishmentKind::Ban)
    }

    /// Lifts a mute. Returns `false` if there was no active mute.
    pub fn revoke_mute(&self, id: PlayerId) -> bool {
        self.ledger.revoke(id, PunishmentKind::Mute)
    }

    /// Lifts a ban by player name (case-insensitive, works offline).
    pub fn revoke_ban_by_name(&self, name: &str) -> bool {
        self.ledger.revoke_by_name(name, PunishmentKind::Ban)
    }

    /// Lifts a mute by player name (case-insensitive, works offline).
    pub fn revoke_mute_by_name(&self, name: &str) -> bool {
        self.ledger.revoke_by_name(name, PunishmentKind::Mute)
    }

    /// The player's active ban, if any.
    pub fn query_ban(&self, id: PlayerId) -> Option<PunishmentRecord> {
        self.ledger.query(id, PunishmentKind::Ban)
    }

    /// The player's active mute, if any.
    pub fn query_mute(&self, id: PlayerId) -> Option<PunishmentRecord> {
        self.ledger.query(id, PunishmentKind::Mute)
    }

    // -- teleport requests --------------------------------------------------

    /// Asks `to` to accept a teleport from `from`.
    ///
    /// # Errors
    /// [`WardenError::SelfRequest`] if `from == to`, or
    /// [`RequestError::AlreadyPending`](warden_presence::RequestError::AlreadyPending)
    /// if `to` already has a request waiting.
    pub fn request_teleport(
        &self,
        from: PlayerId,
        to: PlayerId,
    ) -> Result<PendingRequest, WardenError> {
        if from == to {
            return Err(WardenError::SelfRequest(from));
        }
        Ok(self.requests.request(from, to)?)
    }

    /// Accepts the request waiting for `to` and returns who sent it. The
    /// host then performs the actual teleport.
    ///
    /// # Errors
    /// [`RequestError::NotFound`](warden_presence::RequestError::NotFound)
    /// if nothing is waiting.
    pub fn accept_teleport(&self, to: PlayerId) -> Result<PlayerId, WardenError> {
        Ok(self.requests.accept(to)?)
    }

    /// The request waiting for `to`, if any.
    pub fn pending_teleport(&self, to: PlayerId) -> Option<PendingRequest> {
        self.requests.pending(to)
    }

    // -- idleness -----------------------------------------------------------

    /// Records activity for a player, ending any idle episode.
    pub fn register_activity(&self, id: PlayerId) {
        self.idle.register_activity(id);
    }

    /// Flips the player's idle flag by hand. Returns the new value, which
    /// is always `false` for a player who isn't online.
    pub fn toggle_idle(&self, id: PlayerId) -> bool {
        self.idle.toggle_manual(id)
    }

    /// Returns `true` if the player is currently idle.
    pub fn is_idle(&self, id: PlayerId) -> bool {
        self.idle.is_idle(id)
    }

    // -- lifecycle ----------------------------------------------------------

    /// Stops every timer and writes the ledger out.
    ///
    /// Pending teleport requests are dropped without notices. The flush
    /// result is returned so the host can decide whether to retry; it is
    /// logged either way.
    pub fn shutdown(&self) -> Result<(), WardenError> {
        self.expiry_sweep.cancel();
        self.idle.stop();
        self.requests.clear();
        self.scheduler.cancel_all();

        match self.ledger.flush() {
            Ok(()) => {
                info!("warden shut down, ledger flushed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "warden shut down, ledger flush failed");
                Err(WardenError::from_ledger(e))
            }
        }
    }
}

impl Drop for Warden {
    fn drop(&mut self) {
        self.expiry_sweep.cancel();
        debug!("warden dropped");
    }
}
