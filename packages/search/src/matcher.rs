//! Scored bank abbreviation matching.
//!
//! Decides whether a normalized query confidently refers to one bank.
//! Every token of matchable length votes for the abbreviations it hits
//! (by abbreviation prefix or by canonical-name substring); a unique
//! highest scorer wins and its contributing tokens are consumed from the
//! free-text stream. A tie means the query is ambiguous and no
//! abbreviation is reported — a deliberate conservative policy, so
//! "state" alone never picks between State Bank of India and State Bank
//! of Travancore.

use std::collections::{BTreeMap, BTreeSet};

use crate::normalize;
use crate::registry::AbbreviationRegistry;

/// A confidently identified abbreviation and the query tokens that
/// voted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbbreviationMatch {
    /// The winning abbreviation, lowercased to line up with the
    /// `abbreviation` field analyzer.
    pub abbreviation: String,
    /// Indices (into the normalized token sequence) of the tokens that
    /// contributed to the winner's score.
    pub consumed: Vec<usize>,
}

/// A fully interpreted query: free-text terms plus an optional
/// abbreviation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpretedQuery {
    /// Free-text terms after matcher consumption and short-token merging.
    pub terms: Vec<String>,
    /// Confidently identified bank abbreviation, if any.
    pub abbreviation: Option<String>,
}

/// Scores registry entries against the normalized tokens and returns the
/// unique best match, if one exists.
///
/// Tokens shorter than [`normalize::MIN_MATCH_TOKEN_LEN`] never vote. A
/// token contributes at most one point per abbreviation even when it hits
/// both by prefix and by substring.
#[must_use]
pub fn find_abbreviation(
    registry: &AbbreviationRegistry,
    tokens: &[String],
) -> Option<AbbreviationMatch> {
    let mut votes: BTreeMap<&str, Vec<usize>> = BTreeMap::new();

    for (i, token) in tokens.iter().enumerate() {
        if token.chars().count() < normalize::MIN_MATCH_TOKEN_LEN {
            continue;
        }

        let mut hits: BTreeSet<&str> = registry.prefix_matches(token).collect();
        hits.extend(registry.substring_matches(token));

        for abbreviation in hits {
            votes.entry(abbreviation).or_default().push(i);
        }
    }

    let best = votes.values().map(Vec::len).max()?;
    let mut winners = votes.iter().filter(|(_, contributors)| contributors.len() == best);

    let (abbreviation, consumed) = winners.next()?;
    if winners.next().is_some() {
        // Ambiguous: two or more abbreviations tie at the top score.
        return None;
    }

    Some(AbbreviationMatch {
        abbreviation: (*abbreviation).to_string(),
        consumed: consumed.clone(),
    })
}

/// Runs the full interpretation pipeline on a raw query: normalize,
/// match, consume the winner's tokens, then merge adjacent short tokens
/// in what remains.
///
/// Merged pairs are built after matching, so they are never registry
/// candidates themselves.
#[must_use]
pub fn interpret(registry: &AbbreviationRegistry, raw: &str) -> InterpretedQuery {
    let tokens = normalize::tokenize(raw);

    let (abbreviation, consumed) = match find_abbreviation(registry, &tokens) {
        Some(matched) => (Some(matched.abbreviation), matched.consumed),
        None => (None, Vec::new()),
    };

    let free: Vec<String> = tokens
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !consumed.contains(i))
        .map(|(_, token)| token)
        .collect();

    InterpretedQuery {
        terms: normalize::merge_short_tokens(&free),
        abbreviation,
    }
}
