//! Tests for the ticketed phase timer.
//!
//! All tests run with `start_paused = true` so deadlines resolve
//! deterministically under Tokio's auto-advanced test clock.

use std::time::Duration;

use saming_clock::PhaseTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket(u32);

#[tokio::test(start_paused = true)]
async fn test_fires_with_the_armed_ticket() {
    let mut timer = PhaseTimer::new();
    timer.arm(Ticket(1), Duration::from_secs(120));

    let ticket = timer.fired().await;
    assert_eq!(ticket, Ticket(1));
    assert!(!timer.is_armed(), "firing disarms the timer");
}

#[tokio::test(start_paused = true)]
async fn test_unarmed_timer_pends_forever() {
    let mut timer: PhaseTimer<Ticket> = PhaseTimer::new();
    let result =
        tokio::time::timeout(Duration::from_secs(3600), timer.fired()).await;
    assert!(result.is_err(), "an unarmed timer must never fire");
}

#[tokio::test(start_paused = true)]
async fn test_cancel_disarms() {
    let mut timer = PhaseTimer::new();
    timer.arm(Ticket(1), Duration::from_secs(1));
    timer.cancel();
    assert!(!timer.is_armed());

    let result =
        tokio::time::timeout(Duration::from_secs(10), timer.fired()).await;
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_rearm_replaces_previous_deadline() {
    let mut timer = PhaseTimer::new();
    timer.arm(Ticket(1), Duration::from_secs(1000));
    timer.arm(Ticket(2), Duration::from_secs(1));

    let ticket = timer.fired().await;
    assert_eq!(ticket, Ticket(2));
}

#[tokio::test(start_paused = true)]
async fn test_sync_with_same_ticket_keeps_the_deadline() {
    let mut timer = PhaseTimer::new();
    timer.sync(Some((Ticket(1), Duration::from_secs(10))));

    // Halfway through, the room still wants the same ticket: the original
    // deadline must be kept, not pushed out by another 10 s.
    tokio::time::sleep(Duration::from_secs(5)).await;
    timer.sync(Some((Ticket(1), Duration::from_secs(10))));

    let fired = tokio::time::timeout(Duration::from_secs(6), timer.fired())
        .await
        .expect("deadline should not have been reset");
    assert_eq!(fired, Ticket(1));
}

#[tokio::test(start_paused = true)]
async fn test_sync_with_new_ticket_rearms() {
    let mut timer = PhaseTimer::new();
    timer.sync(Some((Ticket(1), Duration::from_secs(100))));
    timer.sync(Some((Ticket(2), Duration::from_secs(1))));

    let ticket = timer.fired().await;
    assert_eq!(ticket, Ticket(2));
}

#[tokio::test(start_paused = true)]
async fn test_sync_none_cancels() {
    let mut timer = PhaseTimer::new();
    timer.sync(Some((Ticket(1), Duration::from_secs(1))));
    timer.sync(None);
    assert!(!timer.is_armed());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_the_future_keeps_the_deadline() {
    let mut timer = PhaseTimer::new();
    timer.arm(Ticket(7), Duration::from_secs(2));

    // Simulate a lost select! race: poll with a short timeout, drop.
    let early =
        tokio::time::timeout(Duration::from_secs(1), timer.fired()).await;
    assert!(early.is_err());
    assert!(timer.is_armed(), "losing the race must not disarm");

    let ticket = timer.fired().await;
    assert_eq!(ticket, Ticket(7));
}
