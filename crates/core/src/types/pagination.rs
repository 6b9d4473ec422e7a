//! The paginated response envelope used by BigCommerce v3 endpoints.
//!
//! Every v3 collection endpoint answers with:
//!
//! ```json
//! {
//!   "data": [ ... ],
//!   "meta": {
//!     "pagination": {
//!       "total": 36, "count": 10, "per_page": 10,
//!       "current_page": 1, "total_pages": 4,
//!       "links": { "next": "?page=2&limit=10", "current": "?page=1&limit=10" }
//!     }
//!   }
//! }
//! ```
//!
//! Single-entity endpoints reuse the same envelope with an object in `data`
//! and an empty `meta`.

use serde::{Deserialize, Serialize};

/// Server-reported pagination metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    /// Total number of items across all pages.
    pub total: u64,
    /// Number of items on this page.
    pub count: u64,
    /// Requested page size.
    pub per_page: u64,
    /// 1-based index of this page.
    pub current_page: u32,
    /// Number of pages in the collection.
    pub total_pages: u32,
    /// Set when the collection is too large to paginate fully.
    pub too_many: bool,
}

impl Pagination {
    /// Whether pages after this one exist.
    ///
    /// Only the server's page counters are consulted; the item count of the
    /// page is irrelevant.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// Relative links to neighbouring pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLinks {
    /// Query string of the previous page.
    pub previous: Option<String>,
    /// Query string of this page.
    pub current: Option<String>,
    /// Query string of the next page.
    pub next: Option<String>,
}

/// The `meta` object of a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    /// Present on collection responses.
    pub pagination: Option<PaginationWithLinks>,
}

/// Pagination counters together with their navigation links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationWithLinks {
    /// Page counters.
    #[serde(flatten)]
    pub counters: Pagination,
    /// Navigation links.
    pub links: PageLinks,
}

/// A `{ data, meta }` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The payload.
    pub data: T,
    /// Response metadata.
    #[serde(default)]
    pub meta: Meta,
}

impl<T> Envelope<T> {
    /// Pagination counters, if the server sent any.
    #[must_use]
    pub fn pagination(&self) -> Option<Pagination> {
        self.meta.pagination.as_ref().map(|p| p.counters)
    }

    /// Whether the server reports further pages.
    ///
    /// A response without pagination metadata is a single page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.pagination().is_some_and(|p| p.has_more())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_with_pagination() {
        let body = r#"{
            "data": [1, 2, 3],
            "meta": {"pagination": {
                "total": 7, "count": 3, "per_page": 3,
                "current_page": 1, "total_pages": 3,
                "links": {"current": "?page=1", "next": "?page=2"},
                "too_many": false
            }}
        }"#;
        let envelope: Envelope<Vec<u8>> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.data, vec![1, 2, 3]);
        assert!(envelope.has_more());

        let meta = envelope.meta.pagination.unwrap();
        assert_eq!(meta.counters.total, 7);
        assert_eq!(meta.links.next.as_deref(), Some("?page=2"));
    }

    #[test]
    fn test_last_page_has_no_more() {
        let p = Pagination {
            current_page: 3,
            total_pages: 3,
            ..Pagination::default()
        };
        assert!(!p.has_more());
    }

    #[test]
    fn test_has_more_ignores_item_count() {
        // A short page in the middle of the collection still has successors.
        let p = Pagination {
            count: 1,
            per_page: 250,
            current_page: 2,
            total_pages: 5,
            ..Pagination::default()
        };
        assert!(p.has_more());
    }

    #[test]
    fn test_envelope_without_meta() {
        let envelope: Envelope<Vec<u8>> = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(envelope.data.is_empty());
        assert!(!envelope.has_more());
        assert!(envelope.pagination().is_none());
    }

    #[test]
    fn test_empty_meta_object() {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"data": {"id": 1}, "meta": {}}"#).unwrap();
        assert!(!envelope.has_more());
    }
}
