//! Search telemetry for observability and user feedback.
//!
//! The engine reports how many HTTP requests a completed pagination run
//! issued. The counter is a lock-free atomic so the fetch path (which runs
//! off the owner task) can record requests without synchronization, while
//! the session daemon takes and resets the total when it reports it.
//!
//! # Example
//!
//! ```
//! use placepulse::telemetry::SearchMetrics;
//!
//! let metrics = SearchMetrics::new();
//! metrics.record_request();
//! metrics.record_request();
//! assert_eq!(metrics.requests_issued(), 2);
//!
//! // Reporting consumes the total.
//! assert_eq!(metrics.take_requests(), 2);
//! assert_eq!(metrics.requests_issued(), 0);
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

/// Request counter shared between the fetch client and the session daemon.
///
/// Every fetch attempt counts, including ones that fail at the transport
/// level before producing a usable response.
#[derive(Debug, Default)]
pub struct SearchMetrics {
    requests: AtomicU32,
}

impl SearchMetrics {
    /// Creates a zeroed metrics object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one issued search request.
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of requests issued since the last reset.
    pub fn requests_issued(&self) -> u32 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Returns the current request total and resets it to zero.
    pub fn take_requests(&self) -> u32 {
        self.requests.swap(0, Ordering::Relaxed)
    }

    /// Resets the request total without reading it.
    pub fn reset(&self) {
        self.requests.store(0, Ordering::Relaxed);
    }
}
