//! Integration tests for the teleport request table.
//!
//! Most tests run on a paused Tokio clock with the real scheduler. The
//! stale-timer tests swap in a scheduler that ignores cancellation, so a
//! deadline callback can be fired by hand after its request is gone.
//! The race test at the end runs on a real multi-threaded runtime.

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use warden_presence::{RequestConfig, RequestError, TimeoutRequestTable};
use warden_protocol::{ChannelNotifier, Notice, PlayerId};
use warden_tick::{Scheduler, TaskHandle, TokioScheduler};

// =========================================================================
// Helpers
// =========================================================================

fn table(timeout: Duration) -> (TimeoutRequestTable, UnboundedReceiver<Notice>) {
    let (notifier, rx) = ChannelNotifier::new();
    let scheduler = Arc::new(TokioScheduler::new().unwrap());
    let table = TimeoutRequestTable::new(RequestConfig { timeout }, scheduler, Arc::new(notifier));
    (table, rx)
}

fn drain(rx: &mut UnboundedReceiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

/// Keeps every one-shot callback and ignores cancellation, standing in
/// for a timer that had already started firing when it was cancelled.
#[derive(Default)]
struct HeldScheduler {
    held: Mutex<Vec<Box<dyn FnOnce() + Send + 'static>>>,
}

impl HeldScheduler {
    fn fire(&self, index: usize) {
        let task = self.held.lock().remove(index);
        task();
    }
}

impl Scheduler for HeldScheduler {
    fn after(&self, _delay: Duration, task: Box<dyn FnOnce() + Send + 'static>) -> TaskHandle {
        self.held.lock().push(task);
        TaskHandle::new()
    }

    fn every(&self, _period: Duration, _task: Box<dyn FnMut() + Send + 'static>) -> TaskHandle {
        TaskHandle::new()
    }

    fn cancel_all(&self) {}
}

// =========================================================================
// request() / accept()
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_accept_returns_requester_and_disarms_deadline() {
    let (table, mut rx) = table(secs(60));
    let (a, t) = (PlayerId::random(), PlayerId::random());

    table.request(a, t).unwrap();
    tokio::time::sleep(secs(30)).await;
    assert_eq!(table.accept(t), Ok(a));

    tokio::time::sleep(secs(120)).await;
    assert_eq!(
        drain(&mut rx),
        vec![
            Notice::TeleportRequested { requester: a, target: t },
            Notice::TeleportAccepted { requester: a, target: t },
        ]
    );
    assert!(table.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_second_request_for_same_target_is_rejected() {
    let (table, mut rx) = table(secs(60));
    let (a, b, t) = (PlayerId::random(), PlayerId::random(), PlayerId::random());

    let first = table.request(a, t).unwrap();
    assert_eq!(
        table.request(b, t),
        Err(RequestError::AlreadyPending { target: t, requester: a })
    );
    assert_eq!(table.pending(t), Some(first), "slot untouched");
    assert_eq!(drain(&mut rx).len(), 1, "only the first request was announced");
}

#[tokio::test(start_paused = true)]
async fn test_one_requester_may_ask_several_targets() {
    let (table, _rx) = table(secs(60));
    let (a, t1, t2) = (PlayerId::random(), PlayerId::random(), PlayerId::random());

    table.request(a, t1).unwrap();
    table.request(a, t2).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.accept(t2), Ok(a));
    assert!(table.pending(t1).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_accept_without_request_is_not_found() {
    let (table, mut rx) = table(secs(60));
    let t = PlayerId::random();
    assert_eq!(table.accept(t), Err(RequestError::NotFound(t)));
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_pending_request_records_deadline() {
    let (table, _rx) = table(secs(60));
    let request = table.request(PlayerId::random(), PlayerId::random()).unwrap();
    assert_eq!(request.deadline - request.created_at, secs(60));
}

// =========================================================================
// Deadlines
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_unanswered_request_expires_once() {
    let (table, mut rx) = table(secs(60));
    let (a, t) = (PlayerId::random(), PlayerId::random());
    table.request(a, t).unwrap();

    tokio::time::sleep(secs(59)).await;
    assert!(table.pending(t).is_some(), "not yet");

    tokio::time::sleep(secs(2)).await;
    assert!(table.pending(t).is_none());
    assert_eq!(table.accept(t), Err(RequestError::NotFound(t)));

    tokio::time::sleep(secs(300)).await;
    assert_eq!(
        drain(&mut rx),
        vec![
            Notice::TeleportRequested { requester: a, target: t },
            Notice::TeleportExpired { requester: a, target: t },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_slot_is_free_again_after_expiry() {
    let (table, _rx) = table(secs(60));
    let (a, b, t) = (PlayerId::random(), PlayerId::random(), PlayerId::random());
    table.request(a, t).unwrap();

    tokio::time::sleep(secs(61)).await;
    table.request(b, t).unwrap();
    assert_eq!(table.accept(t), Ok(b));
}

#[tokio::test(start_paused = true)]
async fn test_zero_timeout_expires_immediately() {
    let (table, mut rx) = table(Duration::ZERO);
    let (a, t) = (PlayerId::random(), PlayerId::random());
    table.request(a, t).unwrap();

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(table.is_empty());
    assert!(drain(&mut rx).contains(&Notice::TeleportExpired { requester: a, target: t }));
}

#[tokio::test(start_paused = true)]
async fn test_clear_drops_requests_silently() {
    let (table, mut rx) = table(secs(60));
    table.request(PlayerId::random(), PlayerId::random()).unwrap();
    table.request(PlayerId::random(), PlayerId::random()).unwrap();
    drain(&mut rx);

    table.clear();
    tokio::time::sleep(secs(120)).await;
    assert!(table.is_empty());
    assert!(drain(&mut rx).is_empty());
}

// =========================================================================
// Stale timers
// =========================================================================

#[test]
fn test_stale_timer_does_not_evict_reused_slot() {
    // A asks T, T accepts, A asks T again. The first deadline then fires
    // anyway. It must leave the second request alone.
    let scheduler = Arc::new(HeldScheduler::default());
    let (notifier, mut rx) = ChannelNotifier::new();
    let table = TimeoutRequestTable::new(
        RequestConfig::default(),
        Arc::clone(&scheduler) as Arc<dyn Scheduler>,
        Arc::new(notifier),
    );
    let (a, t) = (PlayerId::random(), PlayerId::random());

    table.request(a, t).unwrap();
    table.accept(t).unwrap();
    table.request(a, t).unwrap();
    drain(&mut rx);

    scheduler.fire(0);
    assert!(table.pending(t).is_some());
    assert!(drain(&mut rx).is_empty());

    scheduler.fire(0);
    assert!(table.pending(t).is_none());
    assert_eq!(
        drain(&mut rx),
        vec![Notice::TeleportExpired { requester: a, target: t }]
    );
}

#[test]
fn test_timer_after_table_dropped_is_harmless() {
    let scheduler = Arc::new(HeldScheduler::default());
    let (notifier, mut rx) = ChannelNotifier::new();
    let table = TimeoutRequestTable::new(
        RequestConfig::default(),
        Arc::clone(&scheduler) as Arc<dyn Scheduler>,
        Arc::new(notifier),
    );
    table.request(PlayerId::random(), PlayerId::random()).unwrap();
    drain(&mut rx);
    drop(table);

    scheduler.fire(0);
    assert!(drain(&mut rx).is_empty());
}

// =========================================================================
// Races
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_accept_racing_deadline_resolves_once() {
    const ROUNDS: usize = 50;
    const ACCEPTORS: usize = 4;

    let (table, mut rx) = table(Duration::ZERO);
    let a = PlayerId::random();
    let mut targets = Vec::with_capacity(ROUNDS);
    let mut accepted = 0;

    for _ in 0..ROUNDS {
        let t = PlayerId::random();
        targets.push(t);
        let start = Barrier::new(ACCEPTORS);

        table.request(a, t).unwrap();
        accepted += thread::scope(|s| {
            let acceptors: Vec<_> = (0..ACCEPTORS)
                .map(|_| {
                    s.spawn(|| {
                        start.wait();
                        table.accept(t).is_ok()
                    })
                })
                .collect();
            acceptors
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|&ok| ok)
                .count()
        });
    }

    // Let any deadline that won its race get delivered.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let notices = drain(&mut rx);
    assert!(table.is_empty());

    let mut expired = 0;
    for t in &targets {
        let outcomes = notices
            .iter()
            .filter(|n| match n {
                Notice::TeleportAccepted { target, .. } | Notice::TeleportExpired { target, .. } => {
                    target == t
                }
                _ => false,
            })
            .count();
        assert_eq!(outcomes, 1, "request must be accepted or expired, not both");
        expired += notices
            .iter()
            .filter(|n| matches!(n, Notice::TeleportExpired { target, .. } if target == t))
            .count();
    }
    assert_eq!(accepted + expired, ROUNDS);
}
