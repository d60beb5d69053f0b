//! Commands and internal events of the session daemon.

use std::collections::BTreeMap;

use tokio::sync::oneshot;

use crate::coord::GeoPoint;
use crate::page::ParseFailure;

/// A user action delivered to the session daemon.
#[derive(Debug)]
pub enum SessionCommand {
    /// Start a pagination run for the given query, superseding any
    /// in-flight work.
    Submit(String),

    /// Cancel in-flight work and empty the display. A no-op when the
    /// session is already idle.
    Clear,

    /// Apply a new page-size limit from raw user input. Invalid input is
    /// rejected with a notification and leaves the limit unchanged.
    SetLimit(String),
}

/// Internal events marshalled into the daemon's event loop.
///
/// Pagination runs and tick sources execute on worker tasks; everything
/// they produce flows through this single channel so that all state
/// mutation stays on the daemon task. Events from superseded runs or
/// tickers are identified by their id and dropped.
#[derive(Debug)]
pub(crate) enum EngineEvent {
    /// One parsed page is ready to be committed.
    ///
    /// The driver waits for `ack` before fetching the next page, which
    /// keeps commits strictly ordered by offset. Dropping `ack` without
    /// sending tells the driver its run was superseded.
    PageReady {
        run_id: u64,
        accepted: BTreeMap<u32, GeoPoint>,
        ack: oneshot::Sender<()>,
    },

    /// The run consumed its final page.
    RunCompleted { run_id: u64 },

    /// The run hit a structurally invalid page and aborted.
    RunFailed { run_id: u64, error: ParseFailure },

    /// One second elapsed on the active ticker.
    Tick { epoch: u64 },
}
