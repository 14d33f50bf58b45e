use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use courtside_core::{
    lock_session, ApiError, ApiResponse, Poller, PollingSession, RateLimitInfo, SharedSession,
};
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

use crate::error::CliError;
use crate::output::Renderer;

use super::CommandResult;

/// Side-channel details of the most recent fetch, for report metadata.
#[derive(Debug, Clone, Copy, Default)]
struct LastFetch {
    status: Option<u16>,
    rate_limit: Option<RateLimitInfo>,
    latency_ms: u64,
}

/// Polls `fetch` with `poller` and emits a report for every visible change.
///
/// Returns when the liveness predicate turns false, or on Ctrl-C.
pub async fn follow<T, F, Fut, L>(
    endpoint: &str,
    poller: Poller,
    fetch: F,
    keep_polling: L,
    renderer: &mut Renderer,
) -> Result<(), CliError>
where
    T: Serialize + Clone + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<ApiResponse<T>, ApiError>> + Send + 'static,
    L: Fn(&T) -> bool + Send + 'static,
{
    let session = PollingSession::<T>::new().shared();
    let mut revisions = lock_session(&session).subscribe();
    let last_fetch = Arc::new(Mutex::new(LastFetch::default()));

    // The session only sees the payload, so rate-limit headers that change on
    // every response do not count as a visible change.
    let recorder = Arc::clone(&last_fetch);
    let poll_fetch = move || {
        let call = fetch();
        let recorder = Arc::clone(&recorder);
        async move {
            let started = Instant::now();
            let outcome = call.await;
            let record = match &outcome {
                Ok(response) => LastFetch {
                    status: Some(response.status),
                    rate_limit: response.rate_limit,
                    latency_ms: super::elapsed_ms(started),
                },
                Err(error) => LastFetch {
                    status: error.status_code(),
                    rate_limit: error.rate_limit().copied(),
                    latency_ms: super::elapsed_ms(started),
                },
            };
            *recorder.lock().unwrap_or_else(PoisonError::into_inner) = record;
            outcome.map(ApiResponse::into_data)
        }
    };

    info!(endpoint, interval_ms = poller.interval().as_millis() as u64, "watching");
    let mut timer = poller.spawn(&session, poll_fetch, keep_polling);
    let mut interrupted = false;

    loop {
        tokio::select! {
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                emit_view(endpoint, &session, &mut revisions, &last_fetch, renderer)?;
            }
            () = timer.join() => break,
            _ = tokio::signal::ctrl_c() => {
                interrupted = true;
                break;
            }
        }
    }

    if interrupted {
        info!(endpoint, "interrupted");
        timer.stop();
    }

    // A final update can land between the last wakeup and the task exiting.
    if revisions.has_changed().unwrap_or(false) {
        emit_view(endpoint, &session, &mut revisions, &last_fetch, renderer)?;
    }

    Ok(())
}

fn emit_view<T: Serialize + Clone>(
    endpoint: &str,
    session: &SharedSession<T>,
    revisions: &mut watch::Receiver<u64>,
    last_fetch: &Mutex<LastFetch>,
    renderer: &mut Renderer,
) -> Result<(), CliError> {
    let revision = *revisions.borrow_and_update();
    let view = lock_session(session).view().clone();
    let last = *last_fetch.lock().unwrap_or_else(PoisonError::into_inner);

    // Nothing fetched yet.
    if view.loading {
        return Ok(());
    }

    let outcome = match (view.data, view.error) {
        (_, Some(error)) => Err(error),
        (Some(data), None) => Ok(ApiResponse {
            data,
            status: last.status.unwrap_or(200),
            rate_limit: last.rate_limit,
        }),
        (None, None) => return Ok(()),
    };

    let mut report = CommandResult::from_outcome(endpoint, outcome, last.latency_ms)?.into_report()?;
    report.meta = report.meta.with_revision(revision);
    renderer.emit(&report)
}
