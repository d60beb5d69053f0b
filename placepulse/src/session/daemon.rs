//! Session daemon: the single owner of all mutable session state.
//!
//! The daemon is a long-running event loop that receives user commands,
//! page commits from the in-flight pagination run, and expiry ticks, and
//! serializes all of them onto one task.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        SessionDaemon                         │
//! │                                                              │
//! │  SessionCommand ──► ┌─────────────┐    ┌──────────────────┐  │
//! │  (submit/clear/     │ Command     │───►│ registry,        │  │
//! │   set limit)        │ handling    │    │ scheduler,       │  │
//! │                     └─────────────┘    │ config, metrics  │  │
//! │                                        └────────▲─────────┘  │
//! │  pagination task ──► PageReady / RunCompleted / │            │
//! │  (worker)            RunFailed ─────────────────┤            │
//! │                                                 │            │
//! │  ticker task ──────► Tick ──────────────────────┘            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pagination task and the ticker are owned handles: submitting a new
//! query or clearing cancels them deterministically, and events from a
//! superseded run or ticker are identified by id and dropped.
//!
//! # Example
//!
//! ```ignore
//! use placepulse::provider::{PlaceSearchProvider, ReqwestSearchClient};
//! use placepulse::session::SessionDaemon;
//! use tokio_util::sync::CancellationToken;
//!
//! let provider = PlaceSearchProvider::new(ReqwestSearchClient::new()?);
//! let (daemon, handle) = SessionDaemon::new(provider, renderer, notifier);
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(daemon.run(shutdown.clone()));
//!
//! handle.submit("hamburg").await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::expiry::ExpiryScheduler;
use crate::provider::{PlaceSearchProvider, SearchClient};
use crate::registry::MarkerRegistry;
use crate::render::{MapRenderer, Notifier};
use crate::session::command::{EngineEvent, SessionCommand};
use crate::session::config::SessionConfig;
use crate::session::{driver, parse_limit};
use crate::telemetry::SearchMetrics;

/// Period of the expiry tick.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Capacity of the command channel.
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Capacity of the internal event channel.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Error returned by [`SessionHandle`] when the daemon has stopped.
#[derive(Debug, Error)]
#[error("session daemon is no longer running")]
pub struct SessionClosed;

/// Cloneable entry surface for the embedding application.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// Submits a query, superseding any in-flight run or countdown.
    ///
    /// An empty query should be routed to [`clear`](Self::clear) instead,
    /// the way the original search box treats cleared text.
    pub async fn submit(&self, query: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(SessionCommand::Submit(query.into())).await
    }

    /// Cancels in-flight work and empties the display.
    pub async fn clear(&self) -> Result<(), SessionClosed> {
        self.send(SessionCommand::Clear).await
    }

    /// Applies a new page-size limit from raw user input.
    pub async fn set_limit(&self, input: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(SessionCommand::SetLimit(input.into())).await
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionClosed> {
        self.command_tx.send(command).await.map_err(|_| SessionClosed)
    }
}

/// Tracked handle of the in-flight pagination run.
struct RunHandle {
    id: u64,
    cancellation: CancellationToken,
    task: JoinHandle<()>,
}

impl RunHandle {
    fn cancel(&self) {
        self.cancellation.cancel();
    }
}

/// Tracked handle of the active ticker task.
struct TickerHandle {
    epoch: u64,
    cancellation: CancellationToken,
    task: JoinHandle<()>,
}

impl TickerHandle {
    fn stop(&self) {
        self.cancellation.cancel();
    }
}

/// Repeating one-second tick source.
///
/// The first tick fires immediately, so markers with lifespan index 0
/// are swept as soon as the countdown starts. The task stops when its
/// token is cancelled or the daemon goes away.
async fn run_ticker(epoch: u64, events: mpsc::Sender<EngineEvent>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => return,

            _ = interval.tick() => {
                if events.send(EngineEvent::Tick { epoch }).await.is_err() {
                    return;
                }
            }
        }
    }
}

/// The session daemon.
///
/// Owns the marker registry, expiry scheduler, configuration, and the
/// request metrics, and receives all mutations through its event loop.
pub struct SessionDaemon<C, R, N>
where
    C: SearchClient,
    R: MapRenderer,
    N: Notifier,
{
    core: DaemonCore<C, R, N>,
    command_rx: mpsc::Receiver<SessionCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl<C, R, N> SessionDaemon<C, R, N>
where
    C: SearchClient,
    R: MapRenderer,
    N: Notifier,
{
    /// Creates a daemon with its command channel.
    ///
    /// Returns the daemon and the handle the embedding application uses
    /// to drive it.
    pub fn new(provider: PlaceSearchProvider<C>, renderer: R, notifier: N) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let metrics = provider.metrics();
        let daemon = Self {
            core: DaemonCore {
                provider: Arc::new(provider),
                renderer,
                notifier,
                metrics,
                config: SessionConfig::new(),
                registry: MarkerRegistry::new(),
                scheduler: ExpiryScheduler::new(),
                event_tx,
                active_run: None,
                ticker: None,
                next_run_id: 1,
                next_epoch: 1,
            },
            command_rx,
            event_rx,
        };

        (daemon, SessionHandle { command_tx })
    }

    /// Runs the daemon until shutdown is signalled.
    pub async fn run(self, shutdown: CancellationToken) {
        info!("session daemon starting");

        let Self {
            mut core,
            mut command_rx,
            mut event_rx,
        } = self;

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("session daemon shutting down");
                    break;
                }

                Some(command) = command_rx.recv() => {
                    core.handle_command(command);
                }

                Some(event) = event_rx.recv() => {
                    core.handle_event(event);
                }
            }
        }

        core.shutdown();
        info!("session daemon stopped");
    }
}

/// Mutable daemon state, touched only from the daemon task.
struct DaemonCore<C, R, N>
where
    C: SearchClient,
    R: MapRenderer,
    N: Notifier,
{
    provider: Arc<PlaceSearchProvider<C>>,
    renderer: R,
    notifier: N,
    metrics: Arc<SearchMetrics>,
    config: SessionConfig,
    registry: MarkerRegistry,
    scheduler: ExpiryScheduler,
    event_tx: mpsc::Sender<EngineEvent>,
    active_run: Option<RunHandle>,
    ticker: Option<TickerHandle>,
    next_run_id: u64,
    next_epoch: u64,
}

impl<C, R, N> DaemonCore<C, R, N>
where
    C: SearchClient,
    R: MapRenderer,
    N: Notifier,
{
    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Submit(query) => {
                info!(query = %query, limit = self.config.page_limit(), "query submitted");
                self.reset_session();
                self.start_run(query);
            }
            SessionCommand::Clear => {
                if self.is_idle() {
                    debug!("clear while idle; nothing to do");
                    return;
                }
                info!("session cleared");
                self.reset_session();
            }
            SessionCommand::SetLimit(input) => match parse_limit(&input) {
                Ok(limit) => {
                    // parse_limit already range-checked the value.
                    let _ = self.config.set_page_limit(limit);
                    info!(limit, "page-size limit updated");
                }
                Err(error) => {
                    warn!(input = %input, error = %error, "rejected page-size limit");
                    self.notifier.notify(&error.to_string());
                }
            },
        }
    }

    fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::PageReady {
                run_id,
                accepted,
                ack,
            } => {
                if !self.is_active_run(run_id) {
                    debug!(run_id, "dropping page from superseded run");
                    return;
                }
                for (lifespan_index, point) in accepted {
                    let handle = self.renderer.render_point(point);
                    self.registry.add(handle, lifespan_index);
                }
                let _ = ack.send(());
            }
            EngineEvent::RunCompleted { run_id } => {
                if !self.is_active_run(run_id) {
                    debug!(run_id, "ignoring completion of superseded run");
                    return;
                }
                self.active_run = None;

                let requests = self.metrics.take_requests();
                info!(
                    requests,
                    markers = self.registry.len(),
                    "pagination run complete"
                );
                self.notifier.notify(&format!("Requests: {requests}"));

                self.scheduler.start(self.registry.len() as u32);
                self.start_ticker();
            }
            EngineEvent::RunFailed { run_id, error } => {
                if !self.is_active_run(run_id) {
                    debug!(run_id, "ignoring failure of superseded run");
                    return;
                }
                self.active_run = None;

                warn!(error = %error, "pagination run failed");
                self.notifier.notify("Error in JSON");
                self.reset_session();
            }
            EngineEvent::Tick { epoch } => self.handle_tick(epoch),
        }
    }

    fn handle_tick(&mut self, epoch: u64) {
        let current = match &self.ticker {
            Some(ticker) => ticker.epoch,
            None => return,
        };
        if epoch != current {
            debug!(epoch, current, "dropping tick from superseded ticker");
            return;
        }

        match self.scheduler.on_tick(&mut self.registry) {
            Some(sweep) => {
                for handle in &sweep.expired {
                    self.renderer.remove_point(*handle);
                }
                if !sweep.expired.is_empty() {
                    debug!(removed = sweep.expired.len(), "markers expired");
                }
                if sweep.finished {
                    debug!("all markers expired; session reset");
                    self.reset_session();
                }
            }
            None => self.stop_ticker(),
        }
    }

    /// True when nothing is running and nothing is displayed.
    fn is_idle(&self) -> bool {
        self.active_run.is_none() && !self.scheduler.is_running() && self.registry.is_empty()
    }

    fn is_active_run(&self, run_id: u64) -> bool {
        self.active_run.as_ref().is_some_and(|run| run.id == run_id)
    }

    /// Cancels in-flight work and returns the session to a clean idle
    /// state: no run, no countdown, no markers, zeroed request counter.
    fn reset_session(&mut self) {
        if let Some(run) = self.active_run.take() {
            run.cancel();
        }
        self.scheduler.stop();
        self.stop_ticker();
        self.registry.clear();
        self.renderer.clear_all();
        self.metrics.reset();
    }

    fn start_run(&mut self, query: String) {
        let run_id = self.next_run_id;
        self.next_run_id += 1;

        let cancellation = CancellationToken::new();
        let task = tokio::spawn(driver::run_pagination(
            Arc::clone(&self.provider),
            query,
            self.config.page_limit(),
            run_id,
            self.event_tx.clone(),
            cancellation.clone(),
        ));

        debug!(run_id, "pagination run started");
        self.active_run = Some(RunHandle {
            id: run_id,
            cancellation,
            task,
        });
    }

    fn start_ticker(&mut self) {
        self.stop_ticker();

        let epoch = self.next_epoch;
        self.next_epoch += 1;

        let cancellation = CancellationToken::new();
        let task = tokio::spawn(run_ticker(epoch, self.event_tx.clone(), cancellation.clone()));

        debug!(epoch, "expiry ticker started");
        self.ticker = Some(TickerHandle {
            epoch,
            cancellation,
            task,
        });
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
            ticker.task.abort();
        }
    }

    fn shutdown(&mut self) {
        if let Some(run) = self.active_run.take() {
            run.cancel();
            run.task.abort();
        }
        self.stop_ticker();
    }
}
