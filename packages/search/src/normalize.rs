//! Query normalization for bank branch searches.
//!
//! A deterministic pipeline applied to every raw query before matching and
//! query building: whitespace split, lowercasing, removal of noise words
//! that appear in nearly every bank name, and a short-token merge pass so
//! that split-up place names ("jp nagar") line up with how people write
//! them in addresses ("jpnagar").

/// Words dropped from queries outright. These carry no signal for branch
/// lookup ("bank of india" should search for "india").
pub const EXCLUDED_WORDS: &[&str] = &["of", "bank", "and", "limited", "ltd"];

/// Tokens shorter than this are too ambiguous to match against the
/// abbreviation registry and are candidates for the merge pass instead.
pub const MIN_MATCH_TOKEN_LEN: usize = 3;

/// Splits a raw query into lowercase tokens, dropping excluded words.
///
/// Token order follows the input left to right. The caller is expected to
/// have validated the overall query length already.
#[must_use]
pub fn tokenize(raw: &str) -> Vec<String> {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| !is_excluded_word(token))
        .collect()
}

/// Returns `true` if the word is in the fixed exclude set.
#[must_use]
pub fn is_excluded_word(word: &str) -> bool {
    EXCLUDED_WORDS.contains(&word)
}

/// Merges adjacent short tokens, left to right with a single lookahead.
///
/// A token shorter than [`MIN_MATCH_TOKEN_LEN`] followed by another token
/// is concatenated with it (no separator) and the pass advances past both,
/// so merges never chain: `"jp nagar"` becomes `"jpnagar"`, while
/// `"a b c"` becomes `"ab", "c"`. A trailing short token is kept as-is.
#[must_use]
pub fn merge_short_tokens(tokens: &[String]) -> Vec<String> {
    let mut merged = Vec::with_capacity(tokens.len());

    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token.chars().count() < MIN_MATCH_TOKEN_LEN && i + 1 < tokens.len() {
            merged.push(format!("{token}{}", tokens[i + 1]));
            i += 2;
        } else {
            merged.push(token.clone());
            i += 1;
        }
    }

    merged
}
