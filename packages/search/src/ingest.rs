//! Bank branch CSV ingestion.
//!
//! Streams the RBI branch dump (fixed headers `BANK, IFSC, MICR, BRANCH,
//! ADDRESS, CONTACT, CITY, DISTRICT, STATE, ABBREVIATION`) into a fresh
//! Tantivy index, committing every `batch_size` rows. Malformed rows are
//! skipped and counted rather than aborting the build; a failed batch
//! commit aborts with the error, leaving previously committed batches in
//! place (recovery is an operational full rebuild, not this layer's job).

use std::path::Path;
use std::time::Instant;

use serde::Deserialize;
use tantivy::{Index, IndexWriter, doc};

use bankfind_search_models::{BankRecord, IndexStats, SearchIndexConfig};

use crate::analyzer;
use crate::schema::{self, BankFields};

/// Errors from building the bank branch index.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Tantivy error.
    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The branch CSV does not exist.
    #[error("data file not found: {0}")]
    DataNotFound(String),

    /// CSV parsing error.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path of the file being parsed.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },
}

/// A raw row from the branch CSV.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "BANK", default)]
    name: String,
    #[serde(rename = "IFSC", default)]
    ifsc: String,
    #[serde(rename = "MICR", default)]
    micr: String,
    #[serde(rename = "BRANCH", default)]
    branch: String,
    #[serde(rename = "ADDRESS", default)]
    address: String,
    #[serde(rename = "CONTACT", default)]
    contact: String,
    #[serde(rename = "CITY", default)]
    city: String,
    #[serde(rename = "DISTRICT", default)]
    district: String,
    #[serde(rename = "STATE", default)]
    state: String,
    #[serde(rename = "ABBREVIATION", default)]
    abbreviation: String,
}

impl From<CsvRow> for BankRecord {
    fn from(row: CsvRow) -> Self {
        Self {
            name: row.name,
            ifsc: row.ifsc,
            micr: row.micr,
            branch: row.branch,
            address: row.address,
            contact: row.contact,
            city: row.city,
            district: row.district,
            state: row.state,
            abbreviation: row.abbreviation,
        }
    }
}

/// Builds the composite free-text value indexed under `search_text`.
#[must_use]
pub fn build_search_text(record: &BankRecord) -> String {
    [
        record.name.as_str(),
        record.branch.as_str(),
        record.address.as_str(),
        record.city.as_str(),
        record.district.as_str(),
        record.state.as_str(),
    ]
    .iter()
    .copied()
    .filter(|part| !part.is_empty())
    .collect::<Vec<&str>>()
    .join(" ")
}

/// Builds a bank branch index from the CSV dump.
///
/// Recreates `index_dir` from scratch, registers the analyzers, streams
/// the CSV and commits every `config.batch_size` records (plus a final
/// partial batch).
///
/// # Errors
///
/// Returns an error if the data file is missing, the index cannot be
/// created, or a batch commit fails.
pub fn build_index(
    index_dir: &Path,
    data_path: &Path,
    config: &SearchIndexConfig,
) -> Result<IndexStats, IngestError> {
    let start = Instant::now();

    if !data_path.exists() {
        return Err(IngestError::DataNotFound(data_path.display().to_string()));
    }

    if index_dir.exists() {
        log::info!("Removing existing index at {}", index_dir.display());
        std::fs::remove_dir_all(index_dir)?;
    }
    std::fs::create_dir_all(index_dir)?;

    let schema = schema::build_schema();
    let index = Index::create_in_dir(index_dir, schema.clone())?;
    analyzer::register_analyzers(&index);

    let mut writer: IndexWriter = index.writer(config.writer_heap_bytes)?;
    let fields = BankFields::from_schema(&schema);

    log::info!("Indexing branch data from {}", data_path.display());

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(data_path)
        .map_err(|e| IngestError::Csv {
            path: data_path.display().to_string(),
            source: e,
        })?;

    let mut total = 0u64;
    let mut skipped = 0u64;
    let mut batch_count = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::trace!("  skipping malformed row: {e}");
                skipped += 1;
                continue;
            }
        };

        let record = BankRecord::from(row);
        add_document(&writer, &fields, total, &record)?;
        total += 1;
        batch_count += 1;

        if batch_count >= config.batch_size {
            commit_batch(&mut writer)?;
            batch_count = 0;
        }

        if total.is_multiple_of(10_000) {
            log::info!("  indexed {total} records...");
        }
    }

    // Commit the final partial batch
    if batch_count > 0 {
        commit_batch(&mut writer)?;
    }

    writer.wait_merging_threads()?;

    let elapsed = start.elapsed();
    let index_size_bytes = dir_size(index_dir).unwrap_or(0);

    #[allow(clippy::cast_precision_loss)]
    let mb = index_size_bytes as f64 / 1_048_576.0;
    log::info!(
        "Index built: {total} records ({skipped} skipped), {mb:.1} MB, {:.1}s",
        elapsed.as_secs_f64()
    );

    Ok(IndexStats {
        total_records: total,
        skipped_records: skipped,
        index_size_bytes,
        build_time_secs: elapsed.as_secs_f64(),
    })
}

/// Adds a single branch document to the index writer.
fn add_document(
    writer: &IndexWriter,
    fields: &BankFields,
    id: u64,
    record: &BankRecord,
) -> Result<(), IngestError> {
    writer.add_document(doc!(
        fields.id => id,
        fields.name => record.name.as_str(),
        fields.ifsc => record.ifsc.as_str(),
        fields.micr => record.micr.as_str(),
        fields.branch => record.branch.as_str(),
        fields.address => record.address.as_str(),
        fields.contact => record.contact.as_str(),
        fields.city => record.city.as_str(),
        fields.district => record.district.as_str(),
        fields.state => record.state.as_str(),
        fields.abbreviation => record.abbreviation.as_str(),
        fields.search_text => build_search_text(record),
    ))?;

    Ok(())
}

/// Commits one ingestion batch, logging failures before propagating.
fn commit_batch(writer: &mut IndexWriter) -> Result<(), IngestError> {
    if let Err(e) = writer.commit() {
        log::error!("Batch commit failed: {e}");
        return Err(e.into());
    }
    Ok(())
}

/// Recursively calculates the total size of a directory.
fn dir_size(path: &Path) -> std::io::Result<u64> {
    let mut total = 0u64;
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let ft = entry.file_type()?;
            if ft.is_file() {
                total += entry.metadata()?.len();
            } else if ft.is_dir() {
                total += dir_size(&entry.path())?;
            }
        }
    }
    Ok(total)
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

    #[test]
    fn builds_index_from_csv() {
        let dir = scratch_dir("bankfind_ingest_test_build");
        let data = dir.join("data.csv");
        std::fs::write(
            &data,
            format!(
                "{CSV_HEADER}\
                 HDFC Bank,HDFC0000123,560240002,Koramangala,80 Feet Road,08012345678,Bangalore,Bangalore,Karnataka,HDFC\n\
                 State Bank of India,SBIN0000691,560002017,Jayanagar,9th Block,08087654321,Bangalore,Bangalore,Karnataka,SBI\n",
            ),
        )
        .unwrap();

        let stats = build_index(
            &dir.join("index"),
            &data,
            &SearchIndexConfig {
                writer_heap_bytes: 50_000_000,
                ..SearchIndexConfig::default()
            },
        )
        .unwrap();

        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.skipped_records, 0);
        assert!(stats.index_size_bytes > 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn commits_across_multiple_batches() {
        let dir = scratch_dir("bankfind_ingest_test_batches");
        let data = dir.join("data.csv");

        let mut csv = String::from(CSV_HEADER);
        for i in 0..5 {
            csv.push_str(&format!(
                "Bank {i},BANK000000{i},,Branch {i},,,Bangalore,Bangalore,Karnataka,B{i}\n"
            ));
        }
        std::fs::write(&data, csv).unwrap();

        let stats = build_index(
            &dir.join("index"),
            &data,
            &SearchIndexConfig {
                batch_size: 2,
                writer_heap_bytes: 50_000_000,
                ..SearchIndexConfig::default()
            },
        )
        .unwrap();

        assert_eq!(stats.total_records, 5);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_data_file_is_an_error() {
        let dir = scratch_dir("bankfind_ingest_test_missing");

        let result = build_index(
            &dir.join("index"),
            &dir.join("absent.csv"),
            &SearchIndexConfig::default(),
        );
        assert!(matches!(result, Err(IngestError::DataNotFound(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn search_text_skips_empty_fields() {
        let record = BankRecord {
            name: "HDFC Bank".to_string(),
            branch: "Koramangala".to_string(),
            city: "Bangalore".to_string(),
            ..BankRecord::default()
        };

        assert_eq!(build_search_text(&record), "HDFC Bank Koramangala Bangalore");
    }
}
