//! MusicBrainz place-search provider.
//!
//! Fetches one page of place search results per call against the public
//! MusicBrainz web service.
//!
//! # URL Pattern
//!
//! `http://musicbrainz.org/ws/2/place/?query={q}&limit={l}&offset={o}&fmt=json`
//!
//! - No authentication required
//! - `limit` controls the page size, `offset` selects the page
//! - `fmt=json` requests the JSON representation
//!
//! # Failure Handling
//!
//! `fetch` never returns an error. A transport failure produces a
//! synthesized `Error with <cause>.` text payload, which the page parser
//! then rejects as an invalid document. This keeps the whole error path of
//! a run in one place (the parser) regardless of whether the network or
//! the server misbehaved.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::provider::SearchClient;
use crate::telemetry::SearchMetrics;

/// Base URL of the MusicBrainz place search endpoint.
pub const MUSICBRAINZ_PLACE_SEARCH_URL: &str = "http://musicbrainz.org/ws/2/place/";

/// Paged search provider for MusicBrainz places.
///
/// Every `fetch` call counts against the shared [`SearchMetrics`] request
/// counter, whether or not the request succeeds.
pub struct PlaceSearchProvider<C: SearchClient> {
    client: C,
    base_url: String,
    metrics: Arc<SearchMetrics>,
}

impl<C: SearchClient> PlaceSearchProvider<C> {
    /// Creates a provider against the public MusicBrainz endpoint.
    pub fn new(client: C) -> Self {
        Self {
            client,
            base_url: MUSICBRAINZ_PLACE_SEARCH_URL.to_string(),
            metrics: Arc::new(SearchMetrics::new()),
        }
    }

    /// Overrides the endpoint base URL (for local servers in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Shared handle to the request counter.
    pub fn metrics(&self) -> Arc<SearchMetrics> {
        Arc::clone(&self.metrics)
    }

    fn build_url(&self, query: &str, limit: u32, offset: u32) -> String {
        format!(
            "{}?query={}&limit={}&offset={}&fmt=json",
            self.base_url, query, limit, offset
        )
    }

    /// Fetches one page of results as raw text.
    ///
    /// On transport failure the returned text is a synthesized error
    /// payload rather than a JSON document.
    pub async fn fetch(&self, query: &str, limit: u32, offset: u32) -> String {
        self.metrics.record_request();
        let url = self.build_url(query, limit, offset);
        debug!(url = %url, "requesting search page");

        match self.client.get(&url).await {
            Ok(body) => body,
            Err(error) => {
                warn!(url = %url, error = %error, "search request failed");
                format!("Error with {error}.")
            }
        }
    }
}
