#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the Tantivy-based bank branch search index.
//!
//! This crate contains only data types, configuration structs, and simple
//! conversions. It has no heavyweight dependencies (no Tantivy, no I/O).

use serde::{Deserialize, Serialize};

/// A single bank branch record.
///
/// One record per physical branch, created by bulk ingestion from the RBI
/// CSV dump and immutable thereafter. The serialized field names match the
/// public API contract (`IFSC` and `MICR` keep their conventional casing).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankRecord {
    /// Full bank name (e.g., "State Bank of India").
    pub name: String,
    /// IFSC code identifying the branch for electronic transfers.
    #[serde(rename = "IFSC")]
    pub ifsc: String,
    /// MICR code printed on cheques, if the branch has one.
    #[serde(rename = "MICR")]
    pub micr: String,
    /// Branch name (e.g., "Koramangala").
    pub branch: String,
    /// Street address of the branch.
    pub address: String,
    /// Contact phone number.
    pub contact: String,
    /// City.
    pub city: String,
    /// District.
    pub district: String,
    /// State.
    pub state: String,
    /// Common abbreviation of the bank (e.g., "SBI").
    pub abbreviation: String,
}

/// An (abbreviation, canonical name) pair from the abbreviation registry.
///
/// Entries are unique by abbreviation within a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbbreviationEntry {
    /// Common abbreviation of the bank (e.g., "SBI").
    pub abbreviation: String,
    /// Canonical bank name (e.g., "State Bank of India").
    pub name: String,
}

/// Configuration for building or opening a search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIndexConfig {
    /// Directory where the Tantivy index is stored.
    pub index_dir: String,

    /// Number of records per ingestion batch commit.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Memory budget for the Tantivy `IndexWriter` in bytes.
    /// Defaults to 256 MB.
    #[serde(default = "default_writer_heap")]
    pub writer_heap_bytes: usize,
}

const fn default_batch_size() -> usize {
    100
}

const fn default_writer_heap() -> usize {
    256 * 1024 * 1024 // 256 MB
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            index_dir: String::new(),
            batch_size: default_batch_size(),
            writer_heap_bytes: default_writer_heap(),
        }
    }
}

/// Statistics about a built search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of records indexed.
    pub total_records: u64,
    /// Number of malformed CSV rows skipped during ingestion.
    pub skipped_records: u64,
    /// Index size on disk in bytes.
    pub index_size_bytes: u64,
    /// Time taken to build the index in seconds.
    pub build_time_secs: f64,
}

/// A single ranked hit from a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Stable record identifier (ingestion row number).
    pub id: u64,
    /// Tantivy relevance score (higher is better).
    pub score: f32,
    /// Full field projection of the matched record.
    pub record: BankRecord,
}

/// One page of ranked search results plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    /// Total number of hits across all pages.
    pub total_hits: u64,
    /// The 1-based page this response covers.
    pub page: usize,
    /// Number of hits requested per page.
    pub page_size: usize,
    /// Total number of result pages (`ceil(total_hits / page_size)`).
    pub total_pages: u64,
    /// Whether hits exist beyond this page.
    pub has_more: bool,
    /// Engine-side search time in seconds.
    pub elapsed_secs: f64,
    /// The hits on this page, best score first.
    pub hits: Vec<SearchHit>,
}
