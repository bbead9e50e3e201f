//! Boolean query construction for bank branch searches.
//!
//! Assembles the structured query from an interpreted raw query: a
//! disjunction over the free-text terms (minimum one must match) ANDed
//! with an optional term on the `abbreviation` field. Free-text terms are
//! looked up across the composite `search_text` field and the two code
//! fields, so a pasted IFSC or MICR code still resolves without a
//! dedicated code endpoint.

use tantivy::Term;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::IndexRecordOption;

use crate::schema::BankFields;

/// Builds the search query for free-text terms and an optional
/// abbreviation.
///
/// Returns `None` when both parts are absent (every token was excluded
/// and nothing matched) — the caller must reject such a query rather
/// than fall back to match-all.
#[must_use]
pub fn build_search_query(
    fields: &BankFields,
    terms: &[String],
    abbreviation: Option<&str>,
) -> Option<Box<dyn Query>> {
    let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

    if !terms.is_empty() {
        let mut term_clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for term in terms {
            for field in [fields.search_text, fields.ifsc, fields.micr] {
                let query = TermQuery::new(
                    Term::from_field_text(field, term),
                    IndexRecordOption::Basic,
                );
                term_clauses.push((Occur::Should, Box::new(query)));
            }
        }

        let mut disjunction = BooleanQuery::new(term_clauses);
        disjunction.set_minimum_number_should_match(1);
        clauses.push((Occur::Must, Box::new(disjunction)));
    }

    if let Some(abbreviation) = abbreviation {
        let query = TermQuery::new(
            Term::from_field_text(fields.abbreviation, abbreviation),
            IndexRecordOption::Basic,
        );
        clauses.push((Occur::Must, Box::new(query)));
    }

    if clauses.is_empty() {
        return None;
    }

    Some(Box::new(BooleanQuery::new(clauses)))
}
