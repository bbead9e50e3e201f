#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the bankfind server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the search-layer types to allow independent evolution of the API
//! contract.

use bankfind_search_models::{BankRecord, SearchPage};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `true` when the server can respond.
    pub healthy: bool,
    /// Server crate version.
    pub version: String,
}

/// Generic message response, used for the API root and for errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Human-readable message.
    pub message: String,
}

impl ApiMessage {
    /// Builds a message response.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Query parameters for the search endpoint.
///
/// `p` stays a string so a non-numeric page can be rejected with the
/// API's own validation message instead of a framework error.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQueryParams {
    /// Raw search query.
    pub q: Option<String>,
    /// 1-based page number; defaults to 1 when absent.
    pub p: Option<String>,
}

/// Query parameters for the reverse-geocoding proxy endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationQueryParams {
    /// Latitude, forwarded verbatim to the upstream geocoder.
    #[serde(default)]
    pub latitude: String,
    /// Longitude, forwarded verbatim to the upstream geocoder.
    #[serde(default)]
    pub longitude: String,
}

/// A single search result as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSearchHit {
    /// Stable record identifier.
    pub id: u64,
    /// Relevance score (higher is better).
    pub score: f32,
    /// Full field projection of the matched record.
    pub fields: BankRecord,
}

/// Search results response with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSearchResponse {
    /// Total number of result pages.
    pub total_results_pages: u64,
    /// Whether hits exist beyond the returned page.
    pub more_results: bool,
    /// The 1-based page this response covers.
    pub page: usize,
    /// Engine-side search time, humanized (e.g. "1.523ms").
    pub took: String,
    /// The hits on this page, best score first.
    pub results: Vec<ApiSearchHit>,
}

impl From<SearchPage> for ApiSearchResponse {
    fn from(page: SearchPage) -> Self {
        Self {
            total_results_pages: page.total_pages,
            more_results: page.has_more,
            page: page.page,
            took: format!("{:?}", std::time::Duration::from_secs_f64(page.elapsed_secs)),
            results: page
                .hits
                .into_iter()
                .map(|hit| ApiSearchHit {
                    id: hit.id,
                    score: hit.score,
                    fields: hit.record,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankfind_search_models::SearchHit;

    #[test]
    fn search_response_carries_pagination_metadata() {
        let page = SearchPage {
            total_hits: 25,
            page: 3,
            page_size: 10,
            total_pages: 3,
            has_more: false,
            elapsed_secs: 0.001_5,
            hits: vec![SearchHit {
                id: 7,
                score: 1.5,
                record: BankRecord::default(),
            }],
        };

        let response = ApiSearchResponse::from(page);
        assert_eq!(response.total_results_pages, 3);
        assert!(!response.more_results);
        assert_eq!(response.page, 3);
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].id, 7);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("total_results_pages").is_some());
        assert!(json.get("more_results").is_some());
        assert!(json.get("took").is_some());
    }
}
