//! Search endpoint access.
//!
//! This module provides the HTTP client abstraction and the MusicBrainz
//! place-search provider built on top of it. The provider deliberately
//! never fails: transport errors are folded into the returned page text so
//! the parsing stage treats the page as invalid and aborts the run.

mod http;
mod musicbrainz;

pub use http::{FetchError, ReqwestSearchClient, SearchClient};
pub use musicbrainz::{PlaceSearchProvider, MUSICBRAINZ_PLACE_SEARCH_URL};

#[cfg(test)]
pub use http::tests::MockSearchClient;
