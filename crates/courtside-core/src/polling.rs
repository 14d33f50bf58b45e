//! Interval polling for live views.
//!
//! A [`PollingSession`] holds what a view shows (data, error, loading flag)
//! together with the bookkeeping needed to poll it: the serialized last
//! payload, the in-flight flag and a generation counter. A [`Poller`] spawns
//! the timer task that drives a session; the returned [`PollTimer`] stops the
//! task when it is dropped.
//!
//! In-flight requests are never aborted. The task only keeps a [`Weak`]
//! reference to its session, so a result that arrives after the view is gone
//! (or after the timer was stopped, or after the session was reset for new
//! identifiers) is dropped on the floor instead of touching retained state.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::error::ApiError;

/// Refresh period for the list of live games.
pub const LIVE_GAMES_INTERVAL: Duration = Duration::from_secs(2);

/// Refresh period for a single game's detail view.
pub const GAME_DETAIL_INTERVAL: Duration = Duration::from_secs(5);

/// Session shared between a view and its timer task.
pub type SharedSession<T> = Arc<Mutex<PollingSession<T>>>;

/// Locks a shared session, recovering the state if a holder panicked.
pub fn lock_session<T>(session: &Mutex<PollingSession<T>>) -> MutexGuard<'_, PollingSession<T>> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What the owning view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState<T> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub loading: bool,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Fetching,
}

/// Proof that a fetch was started; handed back on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    initial: bool,
}

impl FetchTicket {
    /// True for the first fetch of a generation.
    pub const fn is_initial(&self) -> bool {
        self.initial
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Effect of one completed fetch on the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Visible state changed.
    Updated,
    /// Same payload as last time; nothing changed.
    Unchanged,
    /// First fetch failed; the error is now visible.
    Failed,
    /// Background fetch failed; logged, previous data kept.
    FailureSuppressed,
    /// Ticket belongs to an earlier generation.
    Discarded,
}

#[derive(Debug)]
pub struct PollingSession<T> {
    view: ViewState<T>,
    last_payload: Option<String>,
    phase: PollPhase,
    generation: u64,
    completed: u64,
    revision: watch::Sender<u64>,
}

impl<T> Default for PollingSession<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PollingSession<T> {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            view: ViewState::default(),
            last_payload: None,
            phase: PollPhase::Idle,
            generation: 0,
            completed: 0,
            revision,
        }
    }

    pub fn shared(self) -> SharedSession<T> {
        Arc::new(Mutex::new(self))
    }

    pub fn view(&self) -> &ViewState<T> {
        &self.view
    }

    pub const fn phase(&self) -> PollPhase {
        self.phase
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of visible changes so far.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver notified on every visible change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Idle → Fetching. Returns `None` while another fetch is in flight.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.phase == PollPhase::Fetching {
            return None;
        }
        self.phase = PollPhase::Fetching;
        Some(FetchTicket {
            generation: self.generation,
            initial: self.completed == 0,
        })
    }

    /// Fetching → Idle without applying a result.
    pub fn abandon_fetch(&mut self, ticket: FetchTicket) {
        if ticket.generation == self.generation {
            self.phase = PollPhase::Idle;
        }
    }

    /// Starts a new generation for different identifiers.
    ///
    /// Visible state returns to loading; any fetch still in flight for the
    /// previous generation is discarded when it completes.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = PollPhase::Idle;
        self.completed = 0;
        self.last_payload = None;
        self.view = ViewState::default();
        self.bump();
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}

impl<T: Serialize> PollingSession<T> {
    /// Fetching → Idle, applying `result` to the visible state.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<T, ApiError>,
    ) -> PollOutcome {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding poll result from previous generation"
            );
            return PollOutcome::Discarded;
        }

        self.phase = PollPhase::Idle;
        self.completed += 1;

        match result {
            Ok(data) => {
                // A payload that cannot be serialized is always treated as new.
                let payload = serde_json::to_string(&data).ok();
                if !ticket.initial && payload.is_some() && payload == self.last_payload {
                    return PollOutcome::Unchanged;
                }

                self.last_payload = payload;
                self.view = ViewState {
                    data: Some(data),
                    error: None,
                    loading: false,
                };
                self.bump();
                PollOutcome::Updated
            }
            Err(error) if ticket.initial => {
                self.view.error = Some(error);
                self.view.loading = false;
                self.bump();
                PollOutcome::Failed
            }
            Err(error) => {
                warn!(
                    code = error.code(),
                    status = ?error.status_code(),
                    "background poll failed: {}",
                    error.message()
                );
                PollOutcome::FailureSuppressed
            }
        }
    }
}

/// Spawns timer tasks that drive a [`PollingSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    interval: Duration,
}

impl Poller {
    pub const fn every(interval: Duration) -> Self {
        Self { interval }
    }

    pub const fn live_games() -> Self {
        Self::every(LIVE_GAMES_INTERVAL)
    }

    pub const fn game_detail() -> Self {
        Self::every(GAME_DETAIL_INTERVAL)
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Fetches immediately, then once per interval while `keep_polling`
    /// holds for the visible data.
    ///
    /// The loop is bound to the session's generation at spawn time. It ends
    /// when the predicate turns false (or there is no data to test), when the
    /// session is dropped or reset, or when the returned timer is stopped or
    /// dropped.
    pub fn spawn<T, F, Fut, L>(
        &self,
        session: &SharedSession<T>,
        fetch: F,
        keep_polling: L,
    ) -> PollTimer
    where
        T: Serialize + Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
        L: Fn(&T) -> bool + Send + 'static,
    {
        let generation = lock_session(session).generation();
        let (stop, stop_rx) = watch::channel(false);
        let task = tokio::spawn(poll_loop(
            Arc::downgrade(session),
            generation,
            self.interval,
            stop_rx,
            fetch,
            keep_polling,
        ));

        PollTimer {
            stop,
            task: Some(task),
        }
    }
}

async fn poll_loop<T, F, Fut, L>(
    session: Weak<Mutex<PollingSession<T>>>,
    generation: u64,
    period: Duration,
    mut stop: watch::Receiver<bool>,
    fetch: F,
    keep_polling: L,
) where
    T: Serialize + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    L: Fn(&T) -> bool + Send + 'static,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await;

    debug!(interval_ms = period.as_millis() as u64, "polling started");

    loop {
        if is_stopped(&stop) {
            debug!("polling stopped");
            break;
        }

        let ticket = match session.upgrade() {
            Some(shared) => {
                let mut guard = lock_session(&shared);
                // `fetch` is bound to the identifiers of the spawning generation.
                if guard.generation() != generation {
                    debug!(
                        spawned = generation,
                        current = guard.generation(),
                        "session reset; polling stopped"
                    );
                    break;
                }
                guard.begin_fetch()
            }
            None => break,
        };

        if let Some(ticket) = ticket {
            let result = fetch().await;

            let Some(shared) = session.upgrade() else {
                debug!("session dropped while fetching; discarding result");
                break;
            };

            let (outcome, keep) = {
                let mut guard = lock_session(&shared);
                if is_stopped(&stop) {
                    guard.abandon_fetch(ticket);
                    debug!("polling stopped while fetching; discarding result");
                    break;
                }
                let outcome = guard.complete_fetch(ticket, result);
                let keep = guard.view().data.as_ref().is_some_and(&keep_polling);
                (outcome, keep)
            };

            debug!(?outcome, keep, "poll completed");
            if outcome == PollOutcome::Discarded || !keep {
                break;
            }
        }

        tokio::select! {
            _ = ticker.tick() => {}
            _ = stop.changed() => {}
        }
    }
}

fn is_stopped(stop: &watch::Receiver<bool>) -> bool {
    *stop.borrow() || stop.has_changed().is_err()
}

/// Handle to a running poll loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct PollTimer {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollTimer {
    /// Asks the loop to stop. A fetch already in flight runs to completion
    /// and its result is discarded.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits for the loop to exit. Safe to call again after it returns.
    pub async fn join(&mut self) {
        let Some(task) = self.task.as_mut() else {
            return;
        };
        if let Err(error) = task.await {
            if error.is_panic() {
                warn!("poll task panicked: {error}");
            }
        }
        self.task = None;
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.stop.send_replace(true);
    }
}
