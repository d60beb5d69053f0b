//! Wire format of a place search response.

use serde::Deserialize;
use serde_json::Value;

/// Top-level structure of one search response page.
///
/// `places` holds the raw records of this page; `count` is the total
/// number of matching records across all pages as reported by the server.
///
/// Records are kept as untyped JSON values: the server's record shape
/// varies (missing coordinates, missing life spans, extra fields), and a
/// malformed record must only drop that record, never invalidate the page.
/// The parser inspects each value individually.
#[derive(Debug, Deserialize)]
pub struct PlacesDocument {
    /// Raw place records, in server order.
    pub places: Vec<Value>,

    /// Server-reported total match count across all pages.
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_minimal_document() {
        let document: PlacesDocument =
            serde_json::from_str(r#"{"places": [], "count": 0}"#).unwrap();
        assert!(document.places.is_empty());
        assert_eq!(document.count, 0);
    }

    #[test]
    fn test_ignores_extra_fields() {
        let document: PlacesDocument =
            serde_json::from_str(r#"{"created": "now", "places": [{}], "count": 1, "offset": 0}"#)
                .unwrap();
        assert_eq!(document.places.len(), 1);
    }

    #[test]
    fn test_missing_places_is_an_error() {
        let result = serde_json::from_str::<PlacesDocument>(r#"{"count": 3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_count_is_an_error() {
        let result = serde_json::from_str::<PlacesDocument>(r#"{"places": []}"#);
        assert!(result.is_err());
    }
}
