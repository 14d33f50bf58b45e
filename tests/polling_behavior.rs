//! Behavior-driven tests for live polling
//!
//! Each scenario drives a real timer task with a short interval and a
//! scripted fetch, then inspects what the view would render.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use courtside_core::{lock_session, ApiError, PollPhase, Poller, PollingSession};
use courtside_tests::scripted_fetch;
use serde_json::{json, Value};
use tokio::sync::Notify;
use tokio::time::timeout;

const FAST: Duration = Duration::from_millis(10);
const IDLE_GAP: Duration = Duration::from_millis(50);
const DEADLINE: Duration = Duration::from_secs(5);

fn is_live(payload: &Value) -> bool {
    payload["live"] == json!(true)
}

// =============================================================================
// Change detection
// =============================================================================

#[tokio::test]
async fn identical_payload_does_not_update_the_view() {
    // Given: Three fetches where the second repeats the first and the third ends the game
    let first = json!({"score": [88, 90], "live": true});
    let last = json!({"score": [101, 99], "live": false});
    let (fetch, calls) = scripted_fetch(vec![Ok(first.clone()), Ok(first), Ok(last.clone())]);
    let session = PollingSession::<Value>::new().shared();

    // When: Polling runs until the liveness predicate turns false
    let mut timer = Poller::every(FAST).spawn(&session, fetch, is_live);
    timeout(DEADLINE, timer.join())
        .await
        .expect("polling stops once nothing is live");

    // Then: All three fetches ran but only the first and third changed the view
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let state = lock_session(&session);
    assert_eq!(state.revision(), 2);
    assert_eq!(state.view().data, Some(last));
    assert!(!state.view().loading);
    assert_eq!(state.phase(), PollPhase::Idle);
}

#[tokio::test]
async fn polling_stops_after_first_load_when_nothing_is_live() {
    // Given: A slate of finished games
    let (fetch, calls) = scripted_fetch(vec![Ok(json!({"live": false}))]);
    let session = PollingSession::<Value>::new().shared();

    // When: Polling starts
    let mut timer = Poller::every(FAST).spawn(&session, fetch, is_live);
    timeout(DEADLINE, timer.join())
        .await
        .expect("polling stops immediately");

    // Then: The initial load still rendered, and no further fetch happened
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(lock_session(&session).revision(), 1);
    assert!(timer.is_finished());
}

// =============================================================================
// Failure policy
// =============================================================================

#[tokio::test]
async fn first_fetch_failure_is_shown_to_the_view() {
    // Given: A backend that is down from the start
    let (fetch, _) = scripted_fetch(vec![Err(ApiError::network("Network error: refused"))]);
    let session = PollingSession::<Value>::new().shared();

    // When: Polling starts
    let mut timer = Poller::every(FAST).spawn(&session, fetch, is_live);
    timeout(DEADLINE, timer.join())
        .await
        .expect("nothing to keep polling");

    // Then: The view shows the error instead of a spinner
    let state = lock_session(&session);
    let error = state.view().error.as_ref().expect("error is visible");
    assert_eq!(error.code(), "NETWORK_ERROR");
    assert!(!state.view().loading);
    assert_eq!(state.view().data, None);
}

#[tokio::test]
async fn background_failures_keep_previous_data_visible() {
    // Given: A live game, then a failed refresh, then the final score
    let live = json!({"score": [50, 48], "live": true});
    let final_score = json!({"score": [99, 97], "live": false});
    let (fetch, calls) = scripted_fetch(vec![
        Ok(live.clone()),
        Err(ApiError::network("Network error: timeout")),
        Ok(final_score.clone()),
    ]);
    let session = PollingSession::<Value>::new().shared();
    let mut revisions = lock_session(&session).subscribe();

    // When: Polling runs to completion
    let mut timer = Poller::every(FAST).spawn(&session, fetch, is_live);
    timeout(DEADLINE, timer.join())
        .await
        .expect("polling stops after the final score");

    // Then: The failure never reached the view and the last success is shown
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    let state = lock_session(&session);
    assert_eq!(state.view().error, None);
    assert_eq!(state.view().data, Some(final_score));
    assert_eq!(*revisions.borrow_and_update(), 2);
}

// =============================================================================
// Teardown and concurrency
// =============================================================================

#[tokio::test]
async fn result_arriving_after_stop_does_not_touch_the_view() {
    // Given: A fetch that blocks until released
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let fetch = {
        let started = Arc::clone(&started);
        let release = Arc::clone(&release);
        move || {
            let started = Arc::clone(&started);
            let release = Arc::clone(&release);
            async move {
                started.notify_one();
                release.notified().await;
                Ok::<_, ApiError>(json!({"live": true}))
            }
        }
    };
    let session = PollingSession::<Value>::new().shared();
    let mut timer = Poller::every(FAST).spawn(&session, fetch, is_live);

    // When: The view is torn down while the fetch is in flight, then the fetch resolves
    timeout(DEADLINE, started.notified())
        .await
        .expect("fetch was dispatched");
    timer.stop();
    release.notify_one();
    timeout(DEADLINE, timer.join())
        .await
        .expect("loop exits after the late result");

    // Then: Retained state is exactly what it was before the fetch
    let state = lock_session(&session);
    assert!(state.view().loading);
    assert_eq!(state.view().data, None);
    assert_eq!(state.revision(), 0);
    assert_eq!(state.phase(), PollPhase::Idle);
}

#[tokio::test]
async fn dropping_the_session_ends_the_loop_without_aborting_the_fetch() {
    // Given: A blocked fetch that records whether it ran to completion
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let completed = Arc::new(AtomicUsize::new(0));
    let fetch = {
        let started = Arc::clone(&started);
        let release = Arc::clone(&release);
        let completed = Arc::clone(&completed);
        move || {
            let started = Arc::clone(&started);
            let release = Arc::clone(&release);
            let completed = Arc::clone(&completed);
            async move {
                started.notify_one();
                release.notified().await;
                completed.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ApiError>(json!({"live": true}))
            }
        }
    };
    let session = PollingSession::<Value>::new().shared();
    let weak = Arc::downgrade(&session);
    let mut timer = Poller::every(FAST).spawn(&session, fetch, is_live);

    // When: The owning view disappears mid-fetch
    timeout(DEADLINE, started.notified())
        .await
        .expect("fetch was dispatched");
    drop(session);
    release.notify_one();
    timeout(DEADLINE, timer.join())
        .await
        .expect("loop notices the session is gone");

    // Then: The fetch finished normally and nothing kept the session alive
    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert!(weak.upgrade().is_none());
}

#[tokio::test]
async fn slow_fetches_never_overlap() {
    // Given: A fetch slower than the polling interval
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));
    let fetch = {
        let in_flight = Arc::clone(&in_flight);
        let peak = Arc::clone(&peak);
        let calls = Arc::clone(&calls);
        move || {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(30)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, ApiError>(json!({"call": call, "live": call < 4}))
            }
        }
    };
    let session = PollingSession::<Value>::new().shared();

    // When: Polling runs with ticks firing faster than fetches complete
    let mut timer = Poller::every(Duration::from_millis(5)).spawn(&session, fetch, is_live);
    timeout(DEADLINE, timer.join())
        .await
        .expect("polling stops after the fourth call");

    // Then: At most one request was ever in flight
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reset_for_new_identifiers_discards_the_in_flight_result() {
    // Given: A blocked fetch for the previous game
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let fetch = {
        let started = Arc::clone(&started);
        let release = Arc::clone(&release);
        move || {
            let started = Arc::clone(&started);
            let release = Arc::clone(&release);
            async move {
                started.notify_one();
                release.notified().await;
                Ok::<_, ApiError>(json!({"gameId": "old", "live": true}))
            }
        }
    };
    let session = PollingSession::<Value>::new().shared();
    let mut timer = Poller::every(FAST).spawn(&session, fetch, is_live);

    // When: The view switches to a different game before the fetch resolves
    timeout(DEADLINE, started.notified())
        .await
        .expect("fetch was dispatched");
    lock_session(&session).reset();
    release.notify_one();
    timeout(DEADLINE, timer.join())
        .await
        .expect("stale timer exits");

    // Then: The old game's data never appears and the view waits for the new one
    let state = lock_session(&session);
    assert_eq!(state.view().data, None);
    assert!(state.view().loading);
    assert_eq!(state.generation(), 1);
}

#[tokio::test]
async fn reset_between_ticks_stops_the_previous_timer() {
    // Given: A live game that has finished its first load
    let old_game = json!({"gameId": "old", "live": true});
    let (fetch, calls) = scripted_fetch(vec![Ok(old_game.clone()), Ok(old_game)]);
    let session = PollingSession::<Value>::new().shared();
    let mut revisions = lock_session(&session).subscribe();
    let mut timer = Poller::every(IDLE_GAP).spawn(&session, fetch, is_live);
    timeout(DEADLINE, revisions.changed())
        .await
        .expect("first load lands")
        .expect("session alive");

    // When: The view switches to a different game while no fetch is in flight
    lock_session(&session).reset();
    timeout(DEADLINE, timer.join())
        .await
        .expect("timer for the old game exits on its next tick");

    // Then: The old game is never fetched again and the view waits for the new one
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let state = lock_session(&session);
    assert_eq!(state.generation(), 1);
    assert_eq!(state.view().data, None);
    assert!(state.view().loading);
    assert_eq!(state.phase(), PollPhase::Idle);
}

#[tokio::test]
async fn dropping_the_timer_stops_polling_before_the_next_tick() {
    // Given: A live game that has finished its first load
    let live = json!({"live": true});
    let (fetch, calls) = scripted_fetch(vec![Ok(live.clone()), Ok(live.clone()), Ok(live)]);
    let session = PollingSession::<Value>::new().shared();
    let mut revisions = lock_session(&session).subscribe();
    let timer = Poller::every(IDLE_GAP).spawn(&session, fetch, is_live);
    timeout(DEADLINE, revisions.changed())
        .await
        .expect("first load lands")
        .expect("session alive");

    // When: The view goes away and more than one interval passes
    drop(timer);
    tokio::time::sleep(IDLE_GAP * 3).await;

    // Then: No further fetch ran and the loop released its fetch closure
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(Arc::strong_count(&calls), 1);
    assert_eq!(lock_session(&session).revision(), 1);
}
