//! Integration tests for the Tokio-backed scheduler.
//!
//! Uses `start_paused = true` so time only moves when the test sleeps or
//! advances it. Sleeping in the test lets the runtime auto-advance to each
//! pending timer in order, which fires them deterministically.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use warden_tick::{Scheduler, TickError, TokioScheduler};

// =========================================================================
// Helpers
// =========================================================================

fn counter() -> (Arc<AtomicU32>, impl Fn() -> u32) {
    let count = Arc::new(AtomicU32::new(0));
    let reader = {
        let count = Arc::clone(&count);
        move || count.load(Ordering::SeqCst)
    };
    (count, reader)
}

// =========================================================================
// Construction
// =========================================================================

#[test]
fn test_new_outside_runtime_is_error() {
    assert!(matches!(TokioScheduler::new(), Err(TickError::NoRuntime)));
}

#[tokio::test(start_paused = true)]
async fn test_new_inside_runtime_has_nothing_outstanding() {
    let scheduler = TokioScheduler::new().unwrap();
    assert_eq!(scheduler.outstanding(), 0);
}

// =========================================================================
// after()
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_after_fires_once_after_delay() {
    let scheduler = TokioScheduler::new().unwrap();
    let (count, read) = counter();

    let handle = scheduler.after(
        Duration::from_secs(60),
        Box::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        }),
    );

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert_eq!(read(), 0, "must not fire early");

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(read(), 1);
    assert!(handle.is_finished());

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(read(), 1, "one-shot must fire exactly once");
}

#[tokio::test(start_paused = true)]
async fn test_after_cancelled_never_fires() {
    let scheduler = TokioScheduler::new().unwrap();
    let (count, read) = counter();

    let handle = scheduler.after(
        Duration::from_secs(10),
        Box::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        }),
    );
    handle.cancel();
    assert!(handle.is_cancelled());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(read(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_twice_and_after_fire_is_harmless() {
    let scheduler = TokioScheduler::new().unwrap();
    let (count, read) = counter();

    let handle = scheduler.after(
        Duration::from_secs(1),
        Box::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        }),
    );
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(read(), 1);

    handle.cancel();
    handle.cancel();
    assert_eq!(read(), 1);
    assert!(!handle.is_cancelled(), "fired before cancel, so cancel lost");
}

// =========================================================================
// every()
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_every_repeats_at_period() {
    let scheduler = TokioScheduler::new().unwrap();
    let (count, read) = counter();

    let handle = scheduler.every(
        Duration::from_secs(5),
        Box::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        }),
    );

    tokio::time::sleep(Duration::from_millis(4_900)).await;
    assert_eq!(read(), 0, "first run is one period out");

    tokio::time::sleep(Duration::from_millis(10_200)).await;
    assert_eq!(read(), 3);

    handle.cancel();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(read(), 3, "no runs after cancel");
}

#[tokio::test(start_paused = true)]
async fn test_every_with_zero_period_is_clamped_not_panicking() {
    let scheduler = TokioScheduler::new().unwrap();
    let (count, read) = counter();

    let handle = scheduler.every(
        Duration::ZERO,
        Box::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        }),
    );
    tokio::time::sleep(Duration::from_millis(5)).await;
    handle.cancel();
    assert!(read() >= 1);
}

// =========================================================================
// cancel_all()
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_cancel_all_stops_oneshots_and_repeaters() {
    let scheduler = TokioScheduler::new().unwrap();
    let (count, read) = counter();

    let c1 = Arc::clone(&count);
    scheduler.after(
        Duration::from_secs(10),
        Box::new(move || {
            c1.fetch_add(1, Ordering::SeqCst);
        }),
    );
    let c2 = Arc::clone(&count);
    scheduler.every(
        Duration::from_secs(3),
        Box::new(move || {
            c2.fetch_add(100, Ordering::SeqCst);
        }),
    );
    assert_eq!(scheduler.outstanding(), 2);

    scheduler.cancel_all();
    scheduler.cancel_all();

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(read(), 0);
    assert_eq!(scheduler.outstanding(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_finished_handles_are_pruned() {
    let scheduler = TokioScheduler::new().unwrap();

    scheduler.after(Duration::from_secs(1), Box::new(|| {}));
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(scheduler.outstanding(), 0);

    scheduler.after(Duration::from_secs(1), Box::new(|| {}));
    assert_eq!(scheduler.outstanding(), 1);
}
