//! Integration tests for the session engine.
//!
//! These tests drive the complete flow through the public API: a scripted
//! search client stands in for the MusicBrainz endpoint, and recording
//! collaborators stand in for the map view and the notification surface.
//!
//! Run with: `cargo test --test session_integration`

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::time::{advance, Duration};
use tokio_util::sync::CancellationToken;

use placepulse::coord::GeoPoint;
use placepulse::provider::{FetchError, PlaceSearchProvider, SearchClient};
use placepulse::render::{MapRenderer, MarkerHandle, Notifier};
use placepulse::session::{SessionDaemon, SessionHandle};

// ============================================================================
// Test Collaborators
// ============================================================================

/// One scripted response of the fake endpoint.
enum Scripted {
    /// Respond with this body.
    Body(String),
    /// Hang forever (an in-flight request that never completes).
    Never,
}

/// Fake search endpoint replaying a fixed script.
struct ScriptedClient {
    script: Mutex<VecDeque<Scripted>>,
    urls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedClient {
    fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            urls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn url_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.urls)
    }
}

impl SearchClient for ScriptedClient {
    fn get<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, FetchError>> + Send + 'a>> {
        self.urls.lock().unwrap().push(url.to_string());
        let next = self.script.lock().unwrap().pop_front();
        Box::pin(async move {
            match next {
                Some(Scripted::Body(body)) => Ok(body),
                Some(Scripted::Never) => {
                    std::future::pending::<Result<String, FetchError>>().await
                }
                None => Err(FetchError::Transport("script exhausted".to_string())),
            }
        })
    }
}

#[derive(Debug, Default)]
struct RenderLog {
    rendered: Vec<(u64, f64, f64)>,
    removed: Vec<u64>,
    cleared: usize,
}

struct RecordingRenderer {
    next_handle: u64,
    log: Arc<Mutex<RenderLog>>,
}

impl RecordingRenderer {
    fn new() -> (Self, Arc<Mutex<RenderLog>>) {
        let log = Arc::new(Mutex::new(RenderLog::default()));
        (
            Self {
                next_handle: 0,
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl MapRenderer for RecordingRenderer {
    fn render_point(&mut self, point: GeoPoint) -> MarkerHandle {
        self.next_handle += 1;
        self.log.lock().unwrap().rendered.push((
            self.next_handle,
            point.latitude(),
            point.longitude(),
        ));
        MarkerHandle::new(self.next_handle)
    }

    fn remove_point(&mut self, handle: MarkerHandle) {
        self.log.lock().unwrap().removed.push(handle.raw());
    }

    fn clear_all(&mut self) {
        self.log.lock().unwrap().cleared += 1;
    }
}

struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
        let messages = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                messages: Arc::clone(&messages),
            },
            messages,
        )
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

// ============================================================================
// Helpers
// ============================================================================

struct Harness {
    handle: SessionHandle,
    shutdown: CancellationToken,
    render_log: Arc<Mutex<RenderLog>>,
    messages: Arc<Mutex<Vec<String>>>,
    urls: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    fn start(script: Vec<Scripted>) -> Self {
        let client = ScriptedClient::new(script);
        let urls = client.url_log();
        let provider = PlaceSearchProvider::new(client);
        let (renderer, render_log) = RecordingRenderer::new();
        let (notifier, messages) = RecordingNotifier::new();
        let (daemon, handle) = SessionDaemon::new(provider, renderer, notifier);

        let shutdown = CancellationToken::new();
        tokio::spawn(daemon.run(shutdown.clone()));

        Self {
            handle,
            shutdown,
            render_log,
            messages,
            urls,
        }
    }

    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    fn rendered(&self) -> Vec<(u64, f64, f64)> {
        self.render_log.lock().unwrap().rendered.clone()
    }

    fn removed(&self) -> Vec<u64> {
        self.render_log.lock().unwrap().removed.clone()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Lets queued commands, fetches, and commits run without advancing time.
async fn drain() {
    for _ in 0..40 {
        tokio::task::yield_now().await;
    }
}

/// Advances the paused clock and lets the resulting ticks be handled.
async fn advance_secs(secs: u64) {
    advance(Duration::from_secs(secs)).await;
    drain().await;
}

fn place(begin: &str, lat: f64, lon: f64) -> String {
    format!(
        r#"{{"coordinates": {{"latitude": "{lat}", "longitude": "{lon}"}}, "life-span": {{"begin": "{begin}"}}}}"#
    )
}

fn page(places: &[String], count: u32) -> Scripted {
    Scripted::Body(format!(
        r#"{{"places": [{}], "count": {count}}}"#,
        places.join(", ")
    ))
}

// ============================================================================
// Integration Tests
// ============================================================================

/// A single 1992 place is rendered, survives until the elapsed counter
/// reaches its lifespan index of 2, and the session then resets.
#[tokio::test(start_paused = true)]
async fn test_single_place_expires_after_its_lifespan() {
    let harness = Harness::start(vec![page(&[place("1992-01-01", 10.0, 20.0)], 1)]);

    harness.handle.submit("hamburg").await.unwrap();
    drain().await;

    // One fetch, one marker, one request reported, countdown running.
    assert_eq!(harness.urls.lock().unwrap().len(), 1);
    assert_eq!(harness.rendered(), vec![(1, 10.0, 20.0)]);
    assert_eq!(harness.messages(), ["Requests: 1"]);

    // Ticks at elapsed 0 and 1 leave the marker alone.
    advance_secs(1).await;
    assert!(harness.removed().is_empty());

    // The tick at elapsed 2 removes it and finishes the countdown.
    advance_secs(1).await;
    assert_eq!(harness.removed(), vec![1]);
    assert!(harness.render_log.lock().unwrap().cleared >= 1);
}

/// count=45 with limit=20 issues exactly three fetches at offsets
/// 0, 20, 40, and the request summary reports all of them.
#[tokio::test(start_paused = true)]
async fn test_multi_page_run_walks_all_offsets() {
    let harness = Harness::start(vec![
        page(&[place("1991-01-01", 1.0, 1.0)], 45),
        page(&[place("1992-01-01", 2.0, 2.0)], 45),
        page(&[place("1993-01-01", 3.0, 3.0)], 45),
    ]);

    harness.handle.submit("berlin").await.unwrap();
    drain().await;

    let urls = harness.urls.lock().unwrap().clone();
    assert_eq!(urls.len(), 3);
    assert!(urls[0].contains("offset=0"));
    assert!(urls[1].contains("offset=20"));
    assert!(urls[2].contains("offset=40"));

    // Pages were committed in offset order.
    let rendered = harness.rendered();
    assert_eq!(rendered.len(), 3);
    assert_eq!(rendered[0].1, 1.0);
    assert_eq!(rendered[1].1, 2.0);
    assert_eq!(rendered[2].1, 3.0);

    assert_eq!(harness.messages(), ["Requests: 3"]);
}

/// A non-JSON payload (the synthesized transport-failure text) aborts the
/// run, notifies the user, and resets the session. The next query starts
/// from a clean request counter.
#[tokio::test(start_paused = true)]
async fn test_error_payload_resets_session() {
    let harness = Harness::start(vec![
        Scripted::Body("Error with timeout.".to_string()),
        page(&[place("1995-01-01", 5.0, 5.0)], 1),
    ]);

    harness.handle.submit("first").await.unwrap();
    drain().await;

    assert_eq!(harness.messages(), ["Error in JSON"]);
    assert!(harness.rendered().is_empty());

    harness.handle.submit("second").await.unwrap();
    drain().await;

    // The failed run's request was not carried into the new total.
    let messages = harness.messages();
    assert_eq!(messages.last().unwrap(), "Requests: 1");
    assert_eq!(harness.rendered().len(), 1);
}

/// Clearing while a run has a request in flight stops the run: no further
/// pages are committed and the display ends empty.
#[tokio::test(start_paused = true)]
async fn test_clear_mid_run_stops_commits() {
    let harness = Harness::start(vec![
        page(&[place("1995-01-01", 5.0, 5.0)], 45),
        Scripted::Never,
    ]);

    harness.handle.submit("munich").await.unwrap();
    drain().await;

    // Page one is committed; the offset-20 fetch hangs.
    assert_eq!(harness.rendered().len(), 1);
    assert_eq!(harness.urls.lock().unwrap().len(), 2);

    harness.handle.clear().await.unwrap();
    drain().await;
    advance_secs(5).await;

    // Nothing further was committed or fetched, and the map was cleared.
    assert_eq!(harness.rendered().len(), 1);
    assert_eq!(harness.urls.lock().unwrap().len(), 2);
    assert!(harness.render_log.lock().unwrap().cleared >= 1);
}

/// Limit validation rejects 0, 101, "", and "-5", keeps the previous
/// value, and accepts 1 and 100.
#[tokio::test(start_paused = true)]
async fn test_limit_validation_boundaries() {
    let harness = Harness::start(vec![page(&[], 0)]);

    for input in ["0", "101", "", "-5"] {
        harness.handle.set_limit(input).await.unwrap();
    }
    drain().await;
    assert_eq!(harness.messages().len(), 4);

    harness.handle.set_limit("1").await.unwrap();
    harness.handle.submit("x").await.unwrap();
    drain().await;

    // No fifth validation message, and the accepted limit is used.
    let messages = harness.messages();
    assert_eq!(messages.len(), 5);
    assert_eq!(messages.last().unwrap(), "Requests: 1");
    assert!(harness.urls.lock().unwrap()[0].contains("limit=1&"));
}

/// Markers from pages of one run expire per their own lifespan index:
/// index 0 goes on the first tick, index 1 on the next.
#[tokio::test(start_paused = true)]
async fn test_staggered_expiry_across_indices() {
    let harness = Harness::start(vec![page(
        &[place("1990-06-01", 1.0, 1.0), place("1991-06-01", 2.0, 2.0)],
        2,
    )]);

    harness.handle.submit("vienna").await.unwrap();
    drain().await;
    assert_eq!(harness.rendered().len(), 2);

    // First tick (elapsed 0) removes the 1990 marker immediately.
    assert_eq!(harness.removed().len(), 1);

    advance_secs(1).await;
    assert_eq!(harness.removed().len(), 2);
    assert!(harness.render_log.lock().unwrap().cleared >= 1);
}
