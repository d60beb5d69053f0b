//! Record filtering and lifespan-index extraction.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use tracing::trace;

use crate::coord::GeoPoint;
use crate::page::PlacesDocument;

/// Founding years are counted from this base year; places founded earlier
/// are not plotted. The lifespan index of an accepted place is
/// `founding year - LIFESPAN_BASE_YEAR`.
pub const LIFESPAN_BASE_YEAR: i32 = 1990;

/// A page the parser could not decode at the structural level.
///
/// This is distinct from a page with zero accepted records: it aborts the
/// whole pagination run.
#[derive(Debug, Error)]
pub enum ParseFailure {
    /// The payload is not a valid places document (not JSON at all, or
    /// the `places`/`count` fields are absent or mistyped).
    #[error("not a valid places document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

/// The accepted records of one page.
#[derive(Debug)]
pub struct PageResult {
    /// Accepted coordinates keyed by lifespan index. A later record with
    /// the same index overwrites an earlier one within the page.
    pub accepted: BTreeMap<u32, GeoPoint>,

    /// Server-reported total match count across all pages.
    pub reported_count: u32,
}

/// Decodes one page of response text and filters its records.
///
/// A record is accepted when it has a coordinates object with parseable
/// latitude and longitude, a `life-span` object with a non-empty `begin`
/// date, and a begin year of [`LIFESPAN_BASE_YEAR`] or later. Records
/// failing any of these checks are skipped without affecting the page.
pub fn parse_page(body: &str) -> Result<PageResult, ParseFailure> {
    let document: PlacesDocument = serde_json::from_str(body)?;

    let mut accepted = BTreeMap::new();
    for record in &document.places {
        if let Some((index, point)) = accept_record(record) {
            accepted.insert(index, point);
        }
    }

    trace!(
        records = document.places.len(),
        accepted = accepted.len(),
        reported_count = document.count,
        "parsed search page"
    );

    Ok(PageResult {
        accepted,
        reported_count: document.count,
    })
}

/// Extracts the lifespan index and coordinate of a single record, or
/// `None` if the record does not qualify.
fn accept_record(record: &Value) -> Option<(u32, GeoPoint)> {
    let life_span = record.get("life-span")?;
    let begin = life_span.get("begin")?.as_str()?;

    // The begin date starts with a 4-digit year ("1992-01-01" or "1992").
    let year: i32 = begin.get(..4)?.parse().ok()?;
    if year < LIFESPAN_BASE_YEAR {
        return None;
    }

    let coordinates = record.get("coordinates")?;
    let lat = decimal_field(coordinates, "latitude")?;
    let lon = decimal_field(coordinates, "longitude")?;
    let point = GeoPoint::new(lat, lon).ok()?;

    Some(((year - LIFESPAN_BASE_YEAR) as u32, point))
}

/// Reads a decimal-degree field that the server serializes as a string
/// (but tolerates a bare number).
fn decimal_field(value: &Value, key: &str) -> Option<f64> {
    match value.get(key)? {
        Value::String(text) => text.trim().parse().ok(),
        Value::Number(number) => number.as_f64(),
        _ => None,
    }
}
