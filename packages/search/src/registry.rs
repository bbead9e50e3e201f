//! Bank abbreviation registry.
//!
//! An immutable set of (abbreviation, canonical name) pairs built once at
//! startup and shared read-only across all request handlers. The preferred
//! source is a curated JSON list (an array of `{abbreviation, name}`
//! objects); when that file is absent or unreadable the registry falls
//! back to first-seen deduplication over the branch CSV, so the service
//! still starts from a bare data dump.
//!
//! A curated list that parses but contains some malformed elements is a
//! degraded start, not a fatal one: valid entries are kept and each bad
//! element is logged at warn level.

use std::path::Path;

use serde::Deserialize;

use bankfind_search_models::AbbreviationEntry;

/// Errors from building the abbreviation registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Neither the curated list nor the branch CSV was usable.
    #[error("no usable abbreviation source: list {list_path} and data {data_path} both unreadable")]
    NoUsableSource {
        /// Curated list path that was tried first.
        list_path: String,
        /// Branch CSV path tried as fallback.
        data_path: String,
    },

    /// CSV parsing error from the fallback source.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path of the file being parsed.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },
}

/// The two columns the fallback scan needs from the branch CSV.
#[derive(Debug, Deserialize)]
struct AbbreviationRow {
    #[serde(rename = "BANK", default)]
    name: String,
    #[serde(rename = "ABBREVIATION", default)]
    abbreviation: String,
}

struct RegistryEntry {
    entry: AbbreviationEntry,
    abbreviation_lower: String,
    name_lower: String,
}

/// Immutable registry of bank abbreviations.
pub struct AbbreviationRegistry {
    entries: Vec<RegistryEntry>,
}

impl AbbreviationRegistry {
    /// Builds the registry from the curated JSON list, falling back to
    /// first-seen deduplication over the branch CSV.
    ///
    /// # Errors
    ///
    /// Returns an error only when neither source is usable. This is a
    /// startup-fatal condition for the caller.
    pub fn load(list_path: &Path, data_path: &Path) -> Result<Self, RegistryError> {
        if let Some(entries) = load_curated_list(list_path) {
            log::info!(
                "Loaded {} bank abbreviations from {}",
                entries.len(),
                list_path.display()
            );
            return Ok(Self::from_entries(entries));
        }

        match load_from_csv(data_path) {
            Ok(entries) => {
                log::info!(
                    "Derived {} bank abbreviations from {}",
                    entries.len(),
                    data_path.display()
                );
                Ok(Self::from_entries(entries))
            }
            Err(e) => {
                log::error!("Failed to derive abbreviations from CSV: {e}");
                Err(RegistryError::NoUsableSource {
                    list_path: list_path.display().to_string(),
                    data_path: data_path.display().to_string(),
                })
            }
        }
    }

    /// Builds a registry directly from entries, keeping the first entry
    /// seen per distinct non-empty abbreviation.
    #[must_use]
    pub fn from_entries(entries: Vec<AbbreviationEntry>) -> Self {
        let mut deduped: Vec<RegistryEntry> = Vec::with_capacity(entries.len());

        for entry in entries {
            if entry.abbreviation.is_empty() {
                continue;
            }
            let abbreviation_lower = entry.abbreviation.to_lowercase();
            if deduped
                .iter()
                .any(|e| e.abbreviation_lower == abbreviation_lower)
            {
                continue;
            }
            deduped.push(RegistryEntry {
                name_lower: entry.name.to_lowercase(),
                abbreviation_lower,
                entry,
            });
        }

        Self { entries: deduped }
    }

    /// Number of entries in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the registry holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lowercased abbreviations whose abbreviation starts with `token`.
    ///
    /// `token` must already be lowercase (normalizer output).
    pub fn prefix_matches<'a>(&'a self, token: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |e| e.abbreviation_lower.starts_with(token))
            .map(|e| e.abbreviation_lower.as_str())
    }

    /// Lowercased abbreviations whose canonical name contains `token`.
    ///
    /// `token` must already be lowercase (normalizer output).
    pub fn substring_matches<'a>(&'a self, token: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |e| e.name_lower.contains(token))
            .map(|e| e.abbreviation_lower.as_str())
    }

    /// All entries, in registry order.
    pub fn entries(&self) -> impl Iterator<Item = &AbbreviationEntry> {
        self.entries.iter().map(|e| &e.entry)
    }
}

/// Reads the curated JSON list, tolerating malformed elements.
///
/// Returns `None` when the file is absent or not parseable as a JSON
/// array at all — the caller then falls back to the CSV scan.
fn load_curated_list(list_path: &Path) -> Option<Vec<AbbreviationEntry>> {
    let raw = match std::fs::read_to_string(list_path) {
        Ok(raw) => raw,
        Err(e) => {
            log::debug!("Curated list {} not readable: {e}", list_path.display());
            return None;
        }
    };

    let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(values) => values,
        Err(e) => {
            log::warn!(
                "Curated list {} is not a JSON array ({e}); falling back to CSV",
                list_path.display()
            );
            return None;
        }
    };

    let mut entries = Vec::with_capacity(values.len());
    for (i, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<AbbreviationEntry>(value) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                log::warn!(
                    "Skipping malformed entry {i} in {}: {e}",
                    list_path.display()
                );
            }
        }
    }

    Some(entries)
}

/// Scans the branch CSV and keeps the first record seen per distinct
/// non-empty abbreviation.
fn load_from_csv(data_path: &Path) -> Result<Vec<AbbreviationEntry>, RegistryError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(data_path)
        .map_err(|e| RegistryError::Csv {
            path: data_path.display().to_string(),
            source: e,
        })?;

    let mut entries: Vec<AbbreviationEntry> = Vec::new();
    for result in reader.deserialize::<AbbreviationRow>() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::trace!("  skipping malformed row: {e}");
                continue;
            }
        };

        if row.abbreviation.is_empty() {
            continue;
        }
        if entries.iter().any(|e| e.abbreviation == row.abbreviation) {
            continue;
        }

        entries.push(AbbreviationEntry {
            abbreviation: row.abbreviation,
            name: row.name,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(abbreviation: &str, name: &str) -> AbbreviationEntry {
        AbbreviationEntry {
            abbreviation: abbreviation.to_string(),
            name: name.to_string(),
        }
    }

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn prefers_curated_list_over_csv() {
        let dir = scratch_dir("bankfind_registry_test_curated");
        let list = dir.join("banks.json");
        let data = dir.join("data.csv");
        std::fs::write(
            &list,
            r#"[{"abbreviation": "SBI", "name": "State Bank of India"}]"#,
        )
        .unwrap();
        std::fs::write(
            &data,
            "BANK,IFSC,MICR,BRANCH,ADDRESS,CONTACT,CITY,DISTRICT,STATE,ABBREVIATION\n\
             HDFC Bank,HDFC0000001,,Main,,,Mumbai,Mumbai,Maharashtra,HDFC\n",
        )
        .unwrap();

        let registry = AbbreviationRegistry::load(&list, &data).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries().next().unwrap().abbreviation, "SBI");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn keeps_valid_entries_from_partially_malformed_list() {
        let dir = scratch_dir("bankfind_registry_test_degraded");
        let list = dir.join("banks.json");
        std::fs::write(
            &list,
            r#"[
                {"abbreviation": "SBI", "name": "State Bank of India"},
                {"name": "missing abbreviation"},
                42,
                {"abbreviation": "HDFC", "name": "HDFC Bank"}
            ]"#,
        )
        .unwrap();

        let registry = AbbreviationRegistry::load(&list, &dir.join("absent.csv")).unwrap();
        let abbreviations: Vec<&str> = registry
            .entries()
            .map(|e| e.abbreviation.as_str())
            .collect();
        assert_eq!(abbreviations, vec!["SBI", "HDFC"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn falls_back_to_csv_first_seen_dedup() {
        let dir = scratch_dir("bankfind_registry_test_fallback");
        let data = dir.join("data.csv");
        std::fs::write(
            &data,
            "BANK,IFSC,MICR,BRANCH,ADDRESS,CONTACT,CITY,DISTRICT,STATE,ABBREVIATION\n\
             State Bank of India,SBIN0000691,,Jayanagar,,,Bangalore,Bangalore,Karnataka,SBI\n\
             State Bank of India (renamed),SBIN0000700,,Indiranagar,,,Bangalore,Bangalore,Karnataka,SBI\n\
             No Abbreviation Bank,NOAB0000001,,Main,,,Delhi,Delhi,Delhi,\n\
             HDFC Bank,HDFC0000001,,Main,,,Mumbai,Mumbai,Maharashtra,HDFC\n",
        )
        .unwrap();

        let registry = AbbreviationRegistry::load(&dir.join("absent.json"), &data).unwrap();
        assert_eq!(registry.len(), 2);
        let first = registry.entries().next().unwrap();
        assert_eq!(first.abbreviation, "SBI");
        assert_eq!(first.name, "State Bank of India");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn errors_when_no_source_usable() {
        let dir = scratch_dir("bankfind_registry_test_nosource");

        let result =
            AbbreviationRegistry::load(&dir.join("absent.json"), &dir.join("absent.csv"));
        assert!(matches!(result, Err(RegistryError::NoUsableSource { .. })));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn prefix_matches_lowercased_abbreviation() {
        let registry = AbbreviationRegistry::from_entries(vec![
            entry("SBI", "State Bank of India"),
            entry("SBT", "State Bank of Travancore"),
            entry("HDFC", "HDFC Bank"),
        ]);

        let matches: Vec<&str> = registry.prefix_matches("sb").collect();
        assert_eq!(matches, vec!["sbi", "sbt"]);
        assert_eq!(registry.prefix_matches("hdfc").count(), 1);
        assert_eq!(registry.prefix_matches("icici").count(), 0);
    }

    #[test]
    fn substring_matches_canonical_name() {
        let registry = AbbreviationRegistry::from_entries(vec![
            entry("SBI", "State Bank of India"),
            entry("SBT", "State Bank of Travancore"),
        ]);

        let matches: Vec<&str> = registry.substring_matches("state").collect();
        assert_eq!(matches, vec!["sbi", "sbt"]);
        assert_eq!(registry.substring_matches("travancore").count(), 1);
    }

    #[test]
    fn from_entries_dedups_by_abbreviation() {
        let registry = AbbreviationRegistry::from_entries(vec![
            entry("SBI", "State Bank of India"),
            entry("sbi", "Some Other Expansion"),
        ]);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries().next().unwrap().name, "State Bank of India");
    }
}
