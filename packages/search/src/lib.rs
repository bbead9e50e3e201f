#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tantivy-based full-text search for bank branch lookup.
//!
//! In-process Tantivy index over bank branch records ingested from the
//! RBI CSV dump, with a query interpretation pipeline tuned for short
//! free-text queries that mix a bank abbreviation with a place name
//! ("sbi jp nagar").
//!
//! # Architecture
//!
//! - **Index time**: Records are indexed through two analyzer profiles
//!   ([`analyzer`]) — free text is stripped to letters, lowercased,
//!   stop-word filtered, shingled, and edge-n-grammed; codes keep their
//!   digits. The profiles are registered on every open/create path so
//!   index-time and query-time terms always line up.
//! - **Query time**: Raw queries are normalized ([`normalize`]), scored
//!   against the abbreviation registry ([`matcher`]), assembled into a
//!   boolean query ([`query`]), and executed with corrected pagination
//!   arithmetic.
//! - **State**: A [`SearchContext`] built once at startup holds the index
//!   reader and the immutable registry; requests share it without locks.
//!
//! # Usage
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use bankfind_search::{AbbreviationRegistry, BankIndex, SearchContext};
//!
//! let index = BankIndex::open("search.index")?;
//! let registry = AbbreviationRegistry::load(
//!     "banks.json".as_ref(),
//!     "data.csv".as_ref(),
//! )?;
//! let context = SearchContext::new(index, registry);
//!
//! let page = context.search("sbi jp nagar", 1, 10).await?;
//! println!("{} hits", page.total_hits);
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod ingest;
pub mod matcher;
pub mod normalize;
pub mod query;
pub mod registry;
pub mod schema;

use std::path::Path;
use std::time::Instant;

use tantivy::collector::{Count, TopDocs};
use tantivy::schema::Value;
use tantivy::{Index, IndexReader, ReloadPolicy, TantivyDocument};

pub use bankfind_search_models::{
    AbbreviationEntry, BankRecord, IndexStats, SearchHit, SearchIndexConfig, SearchPage,
};
pub use registry::AbbreviationRegistry;
use schema::BankFields;

/// Minimum raw query length accepted by the executor.
pub const MIN_QUERY_LEN: usize = 3;

/// Errors from search operations.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Query shorter than [`MIN_QUERY_LEN`] characters.
    #[error("search query should be of minimum {MIN_QUERY_LEN} characters")]
    QueryTooShort,

    /// Page number or page size outside the valid range.
    #[error("invalid page number")]
    InvalidPage,

    /// Every query token was excluded; nothing to search for.
    #[error("query contains no searchable terms")]
    EmptyQuery,

    /// Tantivy error.
    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    /// Index directory not found.
    #[error("Index directory not found: {0}")]
    IndexNotFound(String),

    /// Async task join error.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl SearchError {
    /// Returns `true` for errors caused by the caller's input rather
    /// than by the engine.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::QueryTooShort | Self::InvalidPage | Self::EmptyQuery
        )
    }
}

/// A handle to an opened bank branch index for searching.
///
/// The index is backed by memory-mapped files and supports concurrent
/// searches from multiple threads/tasks.
pub struct BankIndex {
    fields: BankFields,
    reader: IndexReader,
}

impl BankIndex {
    /// Opens an existing bank branch index from a directory.
    ///
    /// The index must have been previously built with
    /// [`ingest::build_index`].
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist or does not
    /// contain a valid Tantivy index.
    pub fn open(index_dir: impl AsRef<Path>) -> Result<Self, SearchError> {
        let index_dir = index_dir.as_ref();
        if !index_dir.exists() {
            return Err(SearchError::IndexNotFound(
                index_dir.display().to_string(),
            ));
        }

        log::info!("Opening bank branch index at {}", index_dir.display());

        let index = Index::open_in_dir(index_dir)?;
        analyzer::register_analyzers(&index);

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()?;

        let fields = BankFields::from_schema(&index.schema());

        Ok(Self { fields, reader })
    }

    /// Returns `true` if `index_dir` exists and contains an index.
    #[must_use]
    pub fn is_available(index_dir: impl AsRef<Path>) -> bool {
        let dir = index_dir.as_ref();
        dir.exists() && dir.join("meta.json").exists()
    }

    /// Returns the total number of documents in the index.
    #[must_use]
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }
}

/// Immutable per-process search state: the opened index plus the
/// abbreviation registry.
///
/// Constructed once at startup, then shared read-only by every request
/// handler; no locking is needed after construction.
pub struct SearchContext {
    index: BankIndex,
    registry: AbbreviationRegistry,
}

impl SearchContext {
    /// Bundles an opened index with a loaded registry.
    #[must_use]
    pub const fn new(index: BankIndex, registry: AbbreviationRegistry) -> Self {
        Self { index, registry }
    }

    /// The underlying index handle.
    #[must_use]
    pub const fn index(&self) -> &BankIndex {
        &self.index
    }

    /// The abbreviation registry.
    #[must_use]
    pub const fn registry(&self) -> &AbbreviationRegistry {
        &self.registry
    }

    /// Searches the index for a raw user query.
    ///
    /// `page` is 1-based; the engine offset is `(page - 1) * page_size`.
    ///
    /// This is an async wrapper around sync Tantivy search, dispatched
    /// to a blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input (short query, zero page,
    /// nothing searchable) or an engine error if the search fails.
    pub async fn search(
        &self,
        raw: &str,
        page: usize,
        page_size: usize,
    ) -> Result<SearchPage, SearchError> {
        let query = self.prepare(raw, page, page_size)?;
        let reader = self.index.reader.clone();
        let fields = self.index.fields.clone();

        tokio::task::spawn_blocking(move || {
            execute(&reader, &fields, query.as_ref(), page, page_size)
        })
        .await?
    }

    /// Synchronous search (for use in non-async contexts).
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input or an engine error if
    /// the search fails.
    pub fn search_sync(
        &self,
        raw: &str,
        page: usize,
        page_size: usize,
    ) -> Result<SearchPage, SearchError> {
        let query = self.prepare(raw, page, page_size)?;
        execute(&self.index.reader, &self.index.fields, query.as_ref(), page, page_size)
    }

    /// Validates the request and builds the boolean query.
    fn prepare(
        &self,
        raw: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Box<dyn tantivy::query::Query>, SearchError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() < MIN_QUERY_LEN {
            return Err(SearchError::QueryTooShort);
        }
        if page == 0 || page_size == 0 {
            return Err(SearchError::InvalidPage);
        }

        let interpreted = matcher::interpret(&self.registry, trimmed);
        log::debug!(
            "Interpreted query {trimmed:?}: terms={:?} abbreviation={:?}",
            interpreted.terms,
            interpreted.abbreviation
        );

        query::build_search_query(
            &self.index.fields,
            &interpreted.terms,
            interpreted.abbreviation.as_deref(),
        )
        .ok_or(SearchError::EmptyQuery)
    }
}

/// Internal sync search implementation shared by both async and sync
/// public APIs.
fn execute(
    reader: &IndexReader,
    fields: &BankFields,
    query: &dyn tantivy::query::Query,
    page: usize,
    page_size: usize,
) -> Result<SearchPage, SearchError> {
    let searcher = reader.searcher();
    let offset = (page - 1) * page_size;

    let start = Instant::now();
    let (top_docs, total_hits) = searcher.search(
        query,
        &(TopDocs::with_limit(page_size).and_offset(offset), Count),
    )?;
    let elapsed = start.elapsed();

    let total_hits = total_hits as u64;

    let mut hits = Vec::with_capacity(top_docs.len());
    for (score, doc_address) in top_docs {
        let doc: TantivyDocument = searcher.doc(doc_address)?;
        let id = doc
            .get_first(fields.id)
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        hits.push(SearchHit {
            id,
            score,
            record: record_from_doc(&doc, fields),
        });
    }

    Ok(SearchPage {
        total_hits,
        page,
        page_size,
        total_pages: total_hits.div_ceil(page_size as u64),
        has_more: total_hits > (page * page_size) as u64,
        elapsed_secs: elapsed.as_secs_f64(),
        hits,
    })
}

/// Projects the stored document fields back into a typed record.
fn record_from_doc(doc: &TantivyDocument, fields: &BankFields) -> BankRecord {
    let text = |field| {
        doc.get_first(field)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };

    BankRecord {
        name: text(fields.name),
        ifsc: text(fields.ifsc),
        micr: text(fields.micr),
        branch: text(fields.branch),
        address: text(fields.address),
        contact: text(fields.contact),
        city: text(fields.city),
        district: text(fields.district),
        state: text(fields.state),
        abbreviation: text(fields.abbreviation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_HEADER: &str =
        "BANK,IFSC,MICR,BRANCH,ADDRESS,CONTACT,CITY,DISTRICT,STATE,ABBREVIATION\n";

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn entry(abbreviation: &str, name: &str) -> AbbreviationEntry {
        AbbreviationEntry {
            abbreviation: abbreviation.to_string(),
            name: name.to_string(),
        }
    }

    fn build_two_bank_context(dir: &Path) -> SearchContext {
        let data = dir.join("data.csv");
        std::fs::write(
            &data,
            format!(
                "{CSV_HEADER}\
                 HDFC Bank,HDFC0000123,560240002,Koramangala,80 Feet Road,08012345678,Bangalore,Bangalore,Karnataka,HDFC\n\
                 State Bank of India,SBIN0000691,560002017,Koramangala,1st Block,08087654321,Bangalore,Bangalore,Karnataka,SBI\n",
            ),
        )
        .unwrap();

        let index_dir = dir.join("index");
        ingest::build_index(
            &index_dir,
            &data,
            &SearchIndexConfig {
                writer_heap_bytes: 50_000_000,
                ..SearchIndexConfig::default()
            },
        )
        .unwrap();

        let index = BankIndex::open(&index_dir).unwrap();
        let registry = AbbreviationRegistry::from_entries(vec![
            entry("HDFC", "HDFC Bank"),
            entry("SBI", "State Bank of India"),
        ]);
        SearchContext::new(index, registry)
    }

    #[test]
    fn open_missing_index_fails() {
        let result = BankIndex::open(std::env::temp_dir().join("bankfind_no_such_index"));
        assert!(matches!(result, Err(SearchError::IndexNotFound(_))));
    }

    #[test]
    fn short_query_is_rejected_before_normalization() {
        let dir = scratch_dir("bankfind_lib_test_short");
        let context = build_two_bank_context(&dir);

        let result = context.search_sync("sb", 1, 10);
        assert!(matches!(result, Err(SearchError::QueryTooShort)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn zero_page_is_rejected() {
        let dir = scratch_dir("bankfind_lib_test_page0");
        let context = build_two_bank_context(&dir);

        let result = context.search_sync("koramangala", 0, 10);
        assert!(matches!(result, Err(SearchError::InvalidPage)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn all_excluded_query_is_rejected() {
        let dir = scratch_dir("bankfind_lib_test_empty");
        let context = build_two_bank_context(&dir);

        let result = context.search_sync("ltd of and", 1, 10);
        assert!(matches!(result, Err(SearchError::EmptyQuery)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn abbreviation_match_narrows_to_one_bank() {
        let dir = scratch_dir("bankfind_lib_test_abbrev");
        let context = build_two_bank_context(&dir);

        // Both branches are in Koramangala; the abbreviation pins HDFC.
        let page = context.search_sync("hdfc koramangala", 1, 10).unwrap();
        assert_eq!(page.total_hits, 1);
        assert_eq!(page.hits[0].record.abbreviation, "HDFC");
        assert_eq!(page.hits[0].record.ifsc, "HDFC0000123");
        assert!(page.elapsed_secs >= 0.0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn free_text_matches_all_banks_in_place() {
        let dir = scratch_dir("bankfind_lib_test_place");
        let context = build_two_bank_context(&dir);

        let page = context.search_sync("koramangala", 1, 10).unwrap();
        assert_eq!(page.total_hits, 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn merged_short_tokens_match_joined_place_names() {
        let dir = scratch_dir("bankfind_lib_test_merge");
        let data = dir.join("data.csv");
        std::fs::write(
            &data,
            format!(
                "{CSV_HEADER}\
                 Canara Bank,CNRB0000444,,JPNagar,24th Main,,Bangalore,Bangalore,Karnataka,CANARA\n",
            ),
        )
        .unwrap();
        let index_dir = dir.join("index");
        ingest::build_index(
            &index_dir,
            &data,
            &SearchIndexConfig {
                writer_heap_bytes: 50_000_000,
                ..SearchIndexConfig::default()
            },
        )
        .unwrap();
        let context = SearchContext::new(
            BankIndex::open(&index_dir).unwrap(),
            AbbreviationRegistry::from_entries(Vec::new()),
        );

        let page = context.search_sync("jp nagar", 1, 10).unwrap();
        assert_eq!(page.total_hits, 1);
        assert_eq!(page.hits[0].record.branch, "JPNagar");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn ifsc_code_resolves_through_free_text() {
        let dir = scratch_dir("bankfind_lib_test_ifsc");
        let context = build_two_bank_context(&dir);

        let page = context.search_sync("sbin0000691", 1, 10).unwrap();
        assert_eq!(page.total_hits, 1);
        assert_eq!(page.hits[0].record.ifsc, "SBIN0000691");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn pagination_arithmetic() {
        let dir = scratch_dir("bankfind_lib_test_pagination");
        let data = dir.join("data.csv");

        let mut csv = String::from(CSV_HEADER);
        for i in 0..25 {
            csv.push_str(&format!(
                "Bank {i},BK00000{i:03},,Branch {i},Street {i},,Bangalore,Bangalore,Karnataka,B{i}\n"
            ));
        }
        std::fs::write(&data, csv).unwrap();

        let index_dir = dir.join("index");
        ingest::build_index(
            &index_dir,
            &data,
            &SearchIndexConfig {
                writer_heap_bytes: 50_000_000,
                ..SearchIndexConfig::default()
            },
        )
        .unwrap();
        let context = SearchContext::new(
            BankIndex::open(&index_dir).unwrap(),
            AbbreviationRegistry::from_entries(Vec::new()),
        );

        let first = context.search_sync("bangalore", 1, 10).unwrap();
        assert_eq!(first.total_hits, 25);
        assert_eq!(first.hits.len(), 10);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_more);

        let last = context.search_sync("bangalore", 3, 10).unwrap();
        assert_eq!(last.hits.len(), 5);
        assert_eq!(last.total_pages, 3);
        assert!(!last.has_more);

        let beyond = context.search_sync("bangalore", 4, 10).unwrap();
        assert!(beyond.hits.is_empty());
        assert!(!beyond.has_more);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn async_search_matches_sync() {
        let dir = scratch_dir("bankfind_lib_test_async");
        let context = build_two_bank_context(&dir);

        let page = context.search("hdfc koramangala", 1, 10).await.unwrap();
        assert_eq!(page.total_hits, 1);
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 10);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
