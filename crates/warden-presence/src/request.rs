//! Pending teleport requests with a per-request deadline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};
use warden_protocol::{Notice, Notifier, PlayerId};
use warden_tick::{Scheduler, TaskHandle};

use crate::{RequestConfig, RequestError};

/// An outstanding request, as seen by callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    /// Who asked.
    pub requester: PlayerId,
    /// Who has to answer.
    pub target: PlayerId,
    /// When it was made.
    pub created_at: Instant,
    /// When it lapses if nobody answers.
    pub deadline: Instant,
}

/// One slot per target.
///
/// `ticket` is unique per request for the lifetime of the table. The
/// deadline callback carries the ticket it was armed for and only evicts
/// a slot that still holds that ticket, so a timer left over from an
/// earlier request can never remove a newer one from the same requester.
struct Slot {
    request: PendingRequest,
    ticket: u64,
    timer: Option<TaskHandle>,
}

struct Shared {
    slots: Mutex<HashMap<PlayerId, Slot>>,
    notifier: Arc<dyn Notifier>,
}

impl Shared {
    /// Deadline callback.
    fn expire(&self, requester: PlayerId, target: PlayerId, ticket: u64) {
        let expired = {
            let mut slots = self.slots.lock();
            let armed_for_this = slots
                .get(&target)
                .is_some_and(|slot| slot.ticket == ticket && slot.request.requester == requester);
            if armed_for_this {
                slots.remove(&target)
            } else {
                None
            }
        };

        match expired {
            Some(_) => {
                info!(%requester, %target, "teleport request expired");
                self.notifier
                    .notify(Notice::TeleportExpired { requester, target });
            }
            None => debug!(%target, ticket, "stale request timer ignored"),
        }
    }
}

/// At most one pending request per target, each with its own deadline.
///
/// `request` and `accept` are called from host event callbacks; deadline
/// callbacks run on scheduler tasks. All three touch the slot map under
/// one lock, so for any request exactly one of "accepted" and "expired"
/// happens, and it happens once.
///
/// ## Accept versus deadline
///
/// Both sides finish by removing the slot, and only the one that actually
/// removed it sends a notice:
///
/// ```text
/// accept(T)  ── lock ── remove slot ── Some ──→ TeleportAccepted
///                                   └─ None ──→ Err(NotFound)
/// deadline   ── lock ── slot holds my ticket? ── yes ──→ remove, TeleportExpired
///                                              └─ no ───→ nothing
/// ```
///
/// Cancelling the timer after a successful accept is a courtesy: if the
/// callback already started, it finds the slot gone (or holding a newer
/// ticket) and does nothing.
///
/// ## Example
///
/// ```ignore
/// let table = TimeoutRequestTable::new(RequestConfig::default(), scheduler, notifier);
/// table.request(alex, steve)?;
/// // Steve types /tpaccept:
/// let requester = table.accept(steve)?;
/// assert_eq!(requester, alex);
/// ```
pub struct TimeoutRequestTable {
    shared: Arc<Shared>,
    scheduler: Arc<dyn Scheduler>,
    config: RequestConfig,
    next_ticket: AtomicU64,
}

impl TimeoutRequestTable {
    /// Creates an empty table.
    pub fn new(
        config: RequestConfig,
        scheduler: Arc<dyn Scheduler>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                slots: Mutex::new(HashMap::new()),
                notifier,
            }),
            scheduler,
            config,
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Records a request from `requester` to `target` and arms its deadline.
    ///
    /// # Errors
    /// [`RequestError::AlreadyPending`] if `target` already has a pending
    /// request, whoever it's from. The existing request is left untouched.
    pub fn request(
        &self,
        requester: PlayerId,
        target: PlayerId,
    ) -> Result<PendingRequest, RequestError> {
        let now = Instant::now();
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let request = PendingRequest {
            requester,
            target,
            created_at: now,
            deadline: now + self.config.timeout,
        };

        {
            let mut slots = self.shared.slots.lock();
            if let Some(existing) = slots.get(&target) {
                return Err(RequestError::AlreadyPending {
                    target,
                    requester: existing.request.requester,
                });
            }
            slots.insert(
                target,
                Slot {
                    request: request.clone(),
                    ticket,
                    timer: None,
                },
            );
        }

        debug!(%requester, %target, "teleport requested");
        self.shared
            .notifier
            .notify(Notice::TeleportRequested { requester, target });

        // Armed outside the lock: a zero timeout may fire before we get
        // the lock back.
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let timer = self.scheduler.after(
            self.config.timeout,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.expire(requester, target, ticket);
                }
            }),
        );

        let mut slots = self.shared.slots.lock();
        match slots.get_mut(&target) {
            Some(slot) if slot.ticket == ticket => slot.timer = Some(timer),
            // Already accepted or expired.
            _ => timer.cancel(),
        }

        Ok(request)
    }

    /// Accepts the request pending for `target`, cancelling its deadline.
    /// Returns the requester.
    ///
    /// # Errors
    /// [`RequestError::NotFound`] if nothing is pending for `target`,
    /// including when the deadline already passed.
    pub fn accept(&self, target: PlayerId) -> Result<PlayerId, RequestError> {
        let slot = self
            .shared
            .slots
            .lock()
            .remove(&target)
            .ok_or(RequestError::NotFound(target))?;

        if let Some(timer) = &slot.timer {
            timer.cancel();
        }

        let requester = slot.request.requester;
        debug!(%requester, %target, "teleport request accepted");
        self.shared
            .notifier
            .notify(Notice::TeleportAccepted { requester, target });
        Ok(requester)
    }

    /// The request pending for `target`, if any.
    pub fn pending(&self, target: PlayerId) -> Option<PendingRequest> {
        self.shared
            .slots
            .lock()
            .get(&target)
            .map(|slot| slot.request.clone())
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.shared.slots.lock().len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.shared.slots.lock().is_empty()
    }

    /// Drops every pending request without notifying anyone. Used at
    /// shutdown.
    pub fn clear(&self) {
        let drained: Vec<Slot> = self.shared.slots.lock().drain().map(|(_, s)| s).collect();
        for slot in &drained {
            if let Some(timer) = &slot.timer {
                timer.cancel();
            }
        }
        debug!(dropped = drained.len(), "pending requests cleared");
    }
}
