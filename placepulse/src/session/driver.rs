//! Iterative pagination over the search result set.
//!
//! One driver task serves one submitted query. It walks the result set in
//! increasing offset order, handing each parsed page to the session
//! daemon and waiting for the commit acknowledgement before advancing, so
//! page N+1 is never fetched before page N is committed. Cancellation is
//! cooperative and observed at each iteration boundary; a run that loses
//! its acknowledgement channel knows it has been superseded and stops
//! without further commits.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::page::parse_page;
use crate::provider::{PlaceSearchProvider, SearchClient};
use crate::session::EngineEvent;

/// Runs one full pagination run, from offset 0 until the reported count
/// is exhausted, a page fails to parse, or the run is cancelled.
pub(crate) async fn run_pagination<C: SearchClient>(
    provider: Arc<PlaceSearchProvider<C>>,
    query: String,
    limit: u32,
    run_id: u64,
    events: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) {
    let mut offset: u32 = 0;

    loop {
        let body = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!(run_id, offset, "pagination run cancelled");
                return;
            }

            body = provider.fetch(&query, limit, offset) => body,
        };

        let page = match parse_page(&body) {
            Ok(page) => page,
            Err(error) => {
                debug!(run_id, offset, error = %error, "pagination run aborting");
                let _ = events.send(EngineEvent::RunFailed { run_id, error }).await;
                return;
            }
        };

        let reported_count = page.reported_count;
        let accepted = page.accepted.len();
        let (ack_tx, ack_rx) = oneshot::channel();

        if events
            .send(EngineEvent::PageReady {
                run_id,
                accepted: page.accepted,
                ack: ack_tx,
            })
            .await
            .is_err()
        {
            return;
        }
        if ack_rx.await.is_err() {
            debug!(run_id, offset, "page commit not acknowledged; run superseded");
            return;
        }

        debug!(run_id, offset, accepted, reported_count, "page committed");

        if offset + limit < reported_count {
            offset += limit;
        } else {
            let _ = events.send(EngineEvent::RunCompleted { run_id }).await;
            return;
        }
    }
}
