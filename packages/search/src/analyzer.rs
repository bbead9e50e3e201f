//! Analyzer pipelines for the bank branch index.
//!
//! Two analyzers are registered under stable names and referenced by both
//! the schema (index time) and the query builder (query time). They are
//! defined in exactly one place so the two sides can never drift apart:
//!
//! - [`TEXT_ANALYZER`] — free-text fields. Whitespace tokens, stripped to
//!   ASCII letters, lowercased, English stop words and the word "bank"
//!   removed, then expanded with 2-3 token shingles and 3-15 char edge
//!   n-grams.
//! - [`CODE_ANALYZER`] — code fields (IFSC, abbreviation). Whitespace
//!   tokens, lowercased, shingled and edge-n-grammed without any character
//!   stripping so alphanumeric codes survive intact.
//!
//! Shingles let multi-word place names ("jp nagar") match as a single
//! term; edge n-grams give prefix/typeahead matching; the stop and exclude
//! lists keep near-universal words ("bank") from dominating relevance.
//!
//! Tantivy ships no shingle or edge-n-gram token *filters*, so both are
//! implemented here on top of [`tantivy::tokenizer::TokenFilter`].

use std::collections::VecDeque;

use tantivy::Index;
use tantivy::tokenizer::{
    Language, LowerCaser, StopWordFilter, TextAnalyzer, Token, TokenFilter, TokenStream,
    Tokenizer, WhitespaceTokenizer,
};

/// Analyzer name for free-text fields (name, branch, address, city,
/// district, state via the composite `search_text` field).
pub const TEXT_ANALYZER: &str = "bank_text";

/// Analyzer name for code fields (IFSC, abbreviation).
pub const CODE_ANALYZER: &str = "bank_code";

/// Words excluded from the free-text index in addition to the English
/// stop word list. These appear in nearly every record.
const EXCLUDED_INDEX_WORDS: &[&str] = &["bank"];

/// Minimum and maximum shingle window in tokens.
const SHINGLE_MIN: usize = 2;
const SHINGLE_MAX: usize = 3;

/// Minimum and maximum edge n-gram length in characters.
const EDGE_NGRAM_MIN: usize = 3;
const EDGE_NGRAM_MAX: usize = 15;

/// Registers both analyzers on the given index.
///
/// Must be called on every open or create path before any indexing or
/// querying; the analyzers are referenced by name from the schema.
pub fn register_analyzers(index: &Index) {
    index.tokenizers().register(TEXT_ANALYZER, text_analyzer());
    index.tokenizers().register(CODE_ANALYZER, code_analyzer());
}

fn text_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(WhitespaceTokenizer::default())
        .filter(AlphaCharsFilter)
        .filter(LowerCaser)
        .filter(english_stop_words())
        .filter(StopWordFilter::remove(
            EXCLUDED_INDEX_WORDS.iter().map(|w| (*w).to_string()),
        ))
        .filter(ShingleFilter::new(SHINGLE_MIN, SHINGLE_MAX))
        .filter(EdgeNgramFilter::new(EDGE_NGRAM_MIN, EDGE_NGRAM_MAX))
        .build()
}

fn code_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(WhitespaceTokenizer::default())
        .filter(LowerCaser)
        .filter(ShingleFilter::new(SHINGLE_MIN, SHINGLE_MAX))
        .filter(EdgeNgramFilter::new(EDGE_NGRAM_MIN, EDGE_NGRAM_MAX))
        .build()
}

fn english_stop_words() -> StopWordFilter {
    StopWordFilter::new(Language::English).expect("built-in English stop word list")
}

// ── AlphaCharsFilter ────────────────────────────────────────────────

/// Token filter that strips every character outside `[A-Za-z]` from each
/// token and drops tokens that end up empty.
///
/// Because the stripped characters are removed rather than replaced with
/// whitespace, this is equivalent to running a `[^A-Za-z ]` character
/// filter before whitespace tokenization: no new token boundaries can
/// appear either way ("jp-nagar" becomes "jpnagar", not two tokens).
#[derive(Clone)]
pub struct AlphaCharsFilter;

impl TokenFilter for AlphaCharsFilter {
    type Tokenizer<T: Tokenizer> = AlphaCharsFilterWrapper<T>;

    fn transform<T: Tokenizer>(self, tokenizer: T) -> Self::Tokenizer<T> {
        AlphaCharsFilterWrapper(tokenizer)
    }
}

#[derive(Clone)]
pub struct AlphaCharsFilterWrapper<T>(T);

impl<T: Tokenizer> Tokenizer for AlphaCharsFilterWrapper<T> {
    type TokenStream<'a> = AlphaCharsTokenStream<T::TokenStream<'a>>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        AlphaCharsTokenStream {
            inner: self.0.token_stream(text),
        }
    }
}

pub struct AlphaCharsTokenStream<S> {
    inner: S,
}

impl<S: TokenStream> TokenStream for AlphaCharsTokenStream<S> {
    fn advance(&mut self) -> bool {
        while self.inner.advance() {
            let text = &mut self.inner.token_mut().text;
            text.retain(|c| c.is_ascii_alphabetic());
            if !text.is_empty() {
                return true;
            }
        }
        false
    }

    fn token(&self) -> &Token {
        self.inner.token()
    }

    fn token_mut(&mut self) -> &mut Token {
        self.inner.token_mut()
    }
}

// ── ShingleFilter ───────────────────────────────────────────────────

/// Token filter that emits adjacent-token n-grams alongside the original
/// tokens.
///
/// For each incoming token the original is emitted first, followed by
/// every shingle of `min..=max` tokens ending at it, concatenated with no
/// separator. With `min = 2`, `max = 3` the stream `a b c` becomes
/// `a, b, ab, c, bc, abc`.
#[derive(Clone)]
pub struct ShingleFilter {
    min: usize,
    max: usize,
}

impl ShingleFilter {
    /// Creates a shingle filter over windows of `min..=max` tokens.
    ///
    /// # Panics
    ///
    /// Panics if `min < 2` or `max < min`.
    #[must_use]
    pub fn new(min: usize, max: usize) -> Self {
        assert!(min >= 2, "shingles need at least two tokens");
        assert!(max >= min, "max shingle size below min");
        Self { min, max }
    }
}

impl TokenFilter for ShingleFilter {
    type Tokenizer<T: Tokenizer> = ShingleFilterWrapper<T>;

    fn transform<T: Tokenizer>(self, tokenizer: T) -> Self::Tokenizer<T> {
        ShingleFilterWrapper {
            inner: tokenizer,
            min: self.min,
            max: self.max,
        }
    }
}

#[derive(Clone)]
pub struct ShingleFilterWrapper<T> {
    inner: T,
    min: usize,
    max: usize,
}

impl<T: Tokenizer> Tokenizer for ShingleFilterWrapper<T> {
    type TokenStream<'a> = ShingleTokenStream<T::TokenStream<'a>>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        ShingleTokenStream {
            inner: self.inner.token_stream(text),
            min: self.min,
            max: self.max,
            window: VecDeque::with_capacity(self.max),
            pending: VecDeque::new(),
            current: Token::default(),
        }
    }
}

pub struct ShingleTokenStream<S> {
    inner: S,
    min: usize,
    max: usize,
    /// Up to `max - 1` preceding original tokens, oldest first.
    window: VecDeque<Token>,
    /// Tokens queued for emission before the next inner advance.
    pending: VecDeque<Token>,
    current: Token,
}

impl<S: TokenStream> TokenStream for ShingleTokenStream<S> {
    fn advance(&mut self) -> bool {
        if let Some(token) = self.pending.pop_front() {
            self.current = token;
            return true;
        }

        if !self.inner.advance() {
            return false;
        }

        let token = self.inner.token().clone();
        self.pending.push_back(token.clone());

        for size in self.min..=self.max {
            let preceding = size - 1;
            if preceding > self.window.len() {
                break;
            }

            let start = self.window.len() - preceding;
            let mut shingle = token.clone();
            let mut text = String::new();
            for (i, prev) in self.window.iter().enumerate().skip(start) {
                if i == start {
                    shingle.offset_from = prev.offset_from;
                }
                text.push_str(&prev.text);
            }
            text.push_str(&token.text);
            shingle.text = text;
            self.pending.push_back(shingle);
        }

        self.window.push_back(token);
        if self.window.len() >= self.max {
            self.window.pop_front();
        }

        self.current = self.pending.pop_front().expect("original token queued");
        true
    }

    fn token(&self) -> &Token {
        &self.current
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.current
    }
}

// ── EdgeNgramFilter ─────────────────────────────────────────────────

/// Token filter that replaces each token with its front-edge n-grams.
///
/// Emits every prefix of `min..=max` characters, shortest first. A token
/// of `min` or more characters therefore also survives as itself whenever
/// it is no longer than `max`; tokens shorter than `min` are dropped.
#[derive(Clone)]
pub struct EdgeNgramFilter {
    min: usize,
    max: usize,
}

impl EdgeNgramFilter {
    /// Creates an edge n-gram filter emitting prefixes of `min..=max`
    /// characters.
    ///
    /// # Panics
    ///
    /// Panics if `min` is zero or `max < min`.
    #[must_use]
    pub fn new(min: usize, max: usize) -> Self {
        assert!(min > 0, "edge n-grams need a positive minimum length");
        assert!(max >= min, "max n-gram length below min");
        Self { min, max }
    }
}

impl TokenFilter for EdgeNgramFilter {
    type Tokenizer<T: Tokenizer> = EdgeNgramFilterWrapper<T>;

    fn transform<T: Tokenizer>(self, tokenizer: T) -> Self::Tokenizer<T> {
        EdgeNgramFilterWrapper {
            inner: tokenizer,
            min: self.min,
            max: self.max,
        }
    }
}

#[derive(Clone)]
pub struct EdgeNgramFilterWrapper<T> {
    inner: T,
    min: usize,
    max: usize,
}

impl<T: Tokenizer> Tokenizer for EdgeNgramFilterWrapper<T> {
    type TokenStream<'a> = EdgeNgramTokenStream<T::TokenStream<'a>>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        EdgeNgramTokenStream {
            inner: self.inner.token_stream(text),
            min: self.min,
            max: self.max,
            pending: VecDeque::new(),
            current: Token::default(),
        }
    }
}

pub struct EdgeNgramTokenStream<S> {
    inner: S,
    min: usize,
    max: usize,
    pending: VecDeque<Token>,
    current: Token,
}

impl<S: TokenStream> TokenStream for EdgeNgramTokenStream<S> {
    fn advance(&mut self) -> bool {
        loop {
            if let Some(token) = self.pending.pop_front() {
                self.current = token;
                return true;
            }

            if !self.inner.advance() {
                return false;
            }

            let token = self.inner.token();
            let char_count = token.text.chars().count();
            if char_count < self.min {
                continue;
            }

            let limit = char_count.min(self.max);
            for len in self.min..=limit {
                let end = token
                    .text
                    .char_indices()
                    .nth(len)
                    .map_or(token.text.len(), |(i, _)| i);
                let mut gram = token.clone();
                gram.text.truncate(end);
                self.pending.push_back(gram);
            }
        }
    }

    fn token(&self) -> &Token {
        &self.current
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.current
    }
}
