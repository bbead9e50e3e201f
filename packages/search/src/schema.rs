//! Tantivy index schema definition for bank branch records.
//!
//! Record fields are stored for full projection in search results; the
//! searchable text lives in a composite `search_text` field plus the two
//! analyzed code fields. The analyzer names referenced here are registered
//! by [`crate::analyzer::register_analyzers`] on every open/create path.

use tantivy::schema::{
    self, FAST, Field, INDEXED, STORED, STRING, Schema, TextFieldIndexing, TextOptions,
};

use crate::analyzer;

/// Names of all fields in the bank branch schema.
pub struct FieldNames;

impl FieldNames {
    /// Stable record identifier (ingestion row number).
    pub const ID: &'static str = "id";
    /// Full bank name.
    pub const NAME: &'static str = "name";
    /// IFSC code, analyzed for prefix matching.
    pub const IFSC: &'static str = "ifsc";
    /// MICR code, exact match.
    pub const MICR: &'static str = "micr";
    /// Branch name.
    pub const BRANCH: &'static str = "branch";
    /// Street address.
    pub const ADDRESS: &'static str = "address";
    /// Contact phone number.
    pub const CONTACT: &'static str = "contact";
    /// City.
    pub const CITY: &'static str = "city";
    /// District.
    pub const DISTRICT: &'static str = "district";
    /// State.
    pub const STATE: &'static str = "state";
    /// Bank abbreviation, analyzed for prefix matching.
    pub const ABBREVIATION: &'static str = "abbreviation";
    /// Composite free-text field for term matching (not stored).
    pub const SEARCH_TEXT: &'static str = "search_text";
}

/// All resolved field handles for efficient document construction.
#[derive(Debug, Clone)]
pub struct BankFields {
    /// Stable record identifier.
    pub id: Field,
    /// Full bank name.
    pub name: Field,
    /// IFSC code.
    pub ifsc: Field,
    /// MICR code.
    pub micr: Field,
    /// Branch name.
    pub branch: Field,
    /// Street address.
    pub address: Field,
    /// Contact phone number.
    pub contact: Field,
    /// City.
    pub city: Field,
    /// District.
    pub district: Field,
    /// State.
    pub state: Field,
    /// Bank abbreviation.
    pub abbreviation: Field,
    /// Composite free-text field.
    pub search_text: Field,
}

impl BankFields {
    /// Resolves field handles from a schema.
    ///
    /// # Panics
    ///
    /// Panics if the schema does not contain the expected fields (should
    /// only happen if the schema was not built by [`build_schema`]).
    #[must_use]
    pub fn from_schema(schema: &Schema) -> Self {
        let field = |name: &str| {
            schema
                .get_field(name)
                .unwrap_or_else(|_| panic!("schema missing {name} field"))
        };

        Self {
            id: field(FieldNames::ID),
            name: field(FieldNames::NAME),
            ifsc: field(FieldNames::IFSC),
            micr: field(FieldNames::MICR),
            branch: field(FieldNames::BRANCH),
            address: field(FieldNames::ADDRESS),
            contact: field(FieldNames::CONTACT),
            city: field(FieldNames::CITY),
            district: field(FieldNames::DISTRICT),
            state: field(FieldNames::STATE),
            abbreviation: field(FieldNames::ABBREVIATION),
            search_text: field(FieldNames::SEARCH_TEXT),
        }
    }
}

/// Builds the Tantivy schema for the bank branch index.
///
/// Fields:
/// - `id` — u64 (indexed + stored + fast): stable record identifier
/// - `ifsc`, `abbreviation` — TEXT (`bank_code` analyzer + stored)
/// - `micr` — STRING (exact match + stored)
/// - `name`, `branch`, `address`, `contact`, `city`, `district`, `state`
///   — stored only; their searchable text lives in `search_text`
/// - `search_text` — TEXT (`bank_text` analyzer, not stored): composite
///   of all free-text fields
#[must_use]
pub fn build_schema() -> Schema {
    let mut builder = Schema::builder();

    builder.add_u64_field(FieldNames::ID, INDEXED | STORED | FAST);

    let code_indexing = TextFieldIndexing::default()
        .set_tokenizer(analyzer::CODE_ANALYZER)
        .set_index_option(schema::IndexRecordOption::WithFreqsAndPositions);
    let code_stored = TextOptions::default()
        .set_indexing_options(code_indexing)
        .set_stored();

    builder.add_text_field(FieldNames::IFSC, code_stored.clone());
    builder.add_text_field(FieldNames::ABBREVIATION, code_stored);

    // Exact-match code field
    builder.add_text_field(FieldNames::MICR, STRING | STORED);

    // Stored-only record fields
    let stored_only = TextOptions::default().set_stored();
    builder.add_text_field(FieldNames::NAME, stored_only.clone());
    builder.add_text_field(FieldNames::BRANCH, stored_only.clone());
    builder.add_text_field(FieldNames::ADDRESS, stored_only.clone());
    builder.add_text_field(FieldNames::CONTACT, stored_only.clone());
    builder.add_text_field(FieldNames::CITY, stored_only.clone());
    builder.add_text_field(FieldNames::DISTRICT, stored_only.clone());
    builder.add_text_field(FieldNames::STATE, stored_only);

    // Composite text field for term matching (not stored)
    let text_indexing = TextFieldIndexing::default()
        .set_tokenizer(analyzer::TEXT_ANALYZER)
        .set_index_option(schema::IndexRecordOption::WithFreqsAndPositions);
    let text_indexed_only = TextOptions::default().set_indexing_options(text_indexing);
    builder.add_text_field(FieldNames::SEARCH_TEXT, text_indexed_only);

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_expected_fields() {
        let schema = build_schema();
        assert!(schema.get_field(FieldNames::ID).is_ok());
        assert!(schema.get_field(FieldNames::NAME).is_ok());
        assert!(schema.get_field(FieldNames::IFSC).is_ok());
        assert!(schema.get_field(FieldNames::MICR).is_ok());
        assert!(schema.get_field(FieldNames::BRANCH).is_ok());
        assert!(schema.get_field(FieldNames::ADDRESS).is_ok());
        assert!(schema.get_field(FieldNames::CONTACT).is_ok());
        assert!(schema.get_field(FieldNames::CITY).is_ok());
        assert!(schema.get_field(FieldNames::DISTRICT).is_ok());
        assert!(schema.get_field(FieldNames::STATE).is_ok());
        assert!(schema.get_field(FieldNames::ABBREVIATION).is_ok());
        assert!(schema.get_field(FieldNames::SEARCH_TEXT).is_ok());
    }

    #[test]
    fn fields_resolve_from_schema() {
        let schema = build_schema();
        let fields = BankFields::from_schema(&schema);
        assert_ne!(fields.ifsc, fields.micr);
        assert_ne!(fields.search_text, fields.abbreviation);
    }
}
