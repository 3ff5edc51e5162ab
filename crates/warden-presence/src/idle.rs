//! Idle detection from a rolling activity timestamp.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};
use warden_protocol::{Notice, Notifier, PlayerId};
use warden_tick::{Scheduler, TaskHandle};

use crate::{IdleConfig, Roster};

/// What the tracker knows about one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityState {
    /// Whose state this is.
    pub subject: PlayerId,
    /// Last chat, command, block-changing move, join, or manual return.
    pub last_activity_at: Instant,
    /// Whether an idle episode is in progress.
    pub idle: bool,
}

impl ActivityState {
    fn fresh(subject: PlayerId, now: Instant) -> Self {
        Self {
            subject,
            last_activity_at: now,
            idle: false,
        }
    }
}

struct Inner {
    states: Mutex<HashMap<PlayerId, ActivityState>>,
    roster: Arc<dyn Roster>,
    notifier: Arc<dyn Notifier>,
    config: IdleConfig,
}

impl Inner {
    /// The player's state, created on first sight.
    ///
    /// Returns `None` for a player the roster no longer lists, even if an
    /// entry is still waiting for [`clear`](IdlenessTracker::clear).
    /// Callers hold the states lock; the quit path removes the player from
    /// the roster before clearing their state, so once a player has left,
    /// nothing can touch or recreate their entry.
    fn state_of<'a>(
        &self,
        states: &'a mut HashMap<PlayerId, ActivityState>,
        id: PlayerId,
        now: Instant,
    ) -> Option<&'a mut ActivityState> {
        if !self.roster.is_online(id) {
            return None;
        }
        Some(
            states
                .entry(id)
                .or_insert_with(|| ActivityState::fresh(id, now)),
        )
    }

    fn sweep(&self) -> usize {
        // The snapshot may already be stale by the time the lock is held;
        // state_of re-checks membership per player.
        let online = self.roster.online_players();
        let now = Instant::now();
        let mut flagged = 0;

        let mut states = self.states.lock();
        for player in online.iter().filter(|p| p.idle_tracked) {
            let Some(state) = self.state_of(&mut states, player.id, now) else {
                continue;
            };
            if state.idle {
                continue;
            }
            if now.saturating_duration_since(state.last_activity_at) >= self.config.threshold {
                state.idle = true;
                flagged += 1;
                info!(player = %player.id, name = %player.name, "player is now idle");
                self.notifier.notify(Notice::NowIdle { player: player.id });
            }
        }

        if flagged > 0 {
            debug!(flagged, tracked = states.len(), "idle sweep finished");
        }
        flagged
    }
}

/// Classifies players as active or idle.
///
/// Activity signals come from host event callbacks; classification comes
/// from a periodic sweep started with [`start`](Self::start). Both take
/// the same lock, and notices are emitted while it is held, so each idle
/// episode produces exactly one "now idle" and at most one "returned".
///
/// ## Who gets tracked
///
/// A player gets an [`ActivityState`] the first time the tracker sees them
/// while the [`Roster`] lists them as online: a join, a chat, a sweep. The
/// membership check happens with the tracker's lock held, and the host
/// removes a quitting player from the roster *before* calling
/// [`clear`](Self::clear). Together that means:
///
/// - a sweep working from a snapshot taken just before a quit skips the
///   departed player instead of re-adding them;
/// - a chat or toggle that arrives after the quit is ignored.
///
/// ## Lock order
///
/// Tracker lock first, then the roster's. The roster never calls back
/// into the tracker, so the two can't deadlock.
pub struct IdlenessTracker {
    inner: Arc<Inner>,
    sweep_task: Mutex<Option<TaskHandle>>,
}

impl IdlenessTracker {
    /// Creates a tracker that sweeps the players `roster` lists and
    /// announces idle episodes through `notifier`. Call
    /// [`start`](Self::start) to begin sweeping.
    pub fn new(config: IdleConfig, roster: Arc<dyn Roster>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(Inner {
                states: Mutex::new(HashMap::new()),
                roster,
                notifier,
                config,
            }),
            sweep_task: Mutex::new(None),
        }
    }

    /// Starts the periodic sweep on `scheduler`, replacing any sweep
    /// started earlier.
    pub fn start(&self, scheduler: &dyn Scheduler) -> TaskHandle {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let handle = scheduler.every(
            self.inner.config.sweep_interval,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.sweep();
                }
            }),
        );

        if let Some(previous) = self.sweep_task.lock().replace(handle.clone()) {
            previous.cancel();
        }
        debug!(
            interval_ms = self.inner.config.sweep_interval.as_millis() as u64,
            threshold_secs = self.inner.config.threshold.as_secs(),
            "idle sweep started"
        );
        handle
    }

    /// Stops the periodic sweep. Tracked state is kept.
    pub fn stop(&self) {
        if let Some(handle) = self.sweep_task.lock().take() {
            handle.cancel();
            debug!("idle sweep stopped");
        }
    }

    /// Runs one sweep now. Returns how many players were newly marked idle.
    pub fn sweep(&self) -> usize {
        self.inner.sweep()
    }

    /// Records activity: resets the timestamp and ends any idle episode.
    ///
    /// Ignored for players the roster doesn't list, such as a chat event
    /// that arrives after the player quit.
    pub fn register_activity(&self, id: PlayerId) {
        let now = Instant::now();
        let mut states = self.inner.states.lock();
        let Some(state) = self.inner.state_of(&mut states, id, now) else {
            debug!(player = %id, "activity from offline player ignored");
            return;
        };
        state.last_activity_at = now;
        if state.idle {
            state.idle = false;
            debug!(player = %id, "player returned");
            self.inner.notifier.notify(Notice::Returned { player: id });
        }
    }

    /// Flips the player's idle flag by hand and returns the new value.
    ///
    /// Going back to active counts as activity, so the next sweep won't
    /// immediately re-flag the player. Offline players can't be toggled
    /// and always report `false`.
    pub fn toggle_manual(&self, id: PlayerId) -> bool {
        let now = Instant::now();
        let mut states = self.inner.states.lock();
        let Some(state) = self.inner.state_of(&mut states, id, now) else {
            debug!(player = %id, "idle toggle for offline player ignored");
            return false;
        };

        state.idle = !state.idle;
        if state.idle {
            info!(player = %id, "player went idle manually");
            self.inner.notifier.notify(Notice::NowIdle { player: id });
        } else {
            state.last_activity_at = now;
            debug!(player = %id, "player returned manually");
            self.inner.notifier.notify(Notice::Returned { player: id });
        }
        state.idle
    }

    /// Returns `true` if the player is in an idle episode. Unknown players
    /// are active.
    pub fn is_idle(&self, id: PlayerId) -> bool {
        self.inner
            .states
            .lock()
            .get(&id)
            .is_some_and(|state| state.idle)
    }

    /// A copy of the player's current state, if tracked.
    pub fn state(&self, id: PlayerId) -> Option<ActivityState> {
        self.inner.states.lock().get(&id).copied()
    }

    /// Forgets the player. Returns `true` if anything was tracked.
    pub fn clear(&self, id: PlayerId) -> bool {
        self.inner.states.lock().remove(&id).is_some()
    }

    /// Number of tracked players.
    pub fn tracked(&self) -> usize {
        self.inner.states.lock().len()
    }
}

impl Drop for IdlenessTracker {
    fn drop(&mut self) {
        self.stop();
    }
}
