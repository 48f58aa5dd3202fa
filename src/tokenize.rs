//! Splitting raw queries into bounded, folded search tokens.
//!
//! Queries are split on whitespace only. Punctuation inside a word (`/`,
//! `-`, `.`) stays part of the word and is removed later by strict folding,
//! so `m6/20` and `m6-20` both produce the token `m620`.

use crate::normalize::{normalize, transliterate};
use crate::options::SearchOptions;

/// Split `raw` on whitespace and apply the token count and length caps.
///
/// Words beyond `max_tokens` are dropped and each word is cut to
/// `max_token_len` characters. The returned slices borrow from `raw` and
/// keep their original spelling; they feed both tokenization and highlight
/// pattern construction.
pub fn raw_tokens<'a>(raw: &'a str, options: &SearchOptions) -> Vec<&'a str> {
    raw.split_whitespace()
        .take(options.max_tokens)
        .map(|word| truncate_chars(word, options.max_token_len))
        .collect()
}

/// Longest prefix of `s` holding at most `max` characters.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// Fold `words` strictly, drop empties and remove duplicates keeping the
/// first occurrence.
fn fold_unique<I>(words: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut tokens: Vec<String> = Vec::new();
    for word in words {
        let token = normalize(&word);
        if !token.is_empty() && !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens
}

/// Tokenize a raw query into its primary token set.
///
/// # Examples
///
/// ```
/// use pricesearch::{SearchOptions, tokenize::tokenize};
///
/// let opts = SearchOptions::default();
/// assert_eq!(tokenize("Bolt  M6 bolt", &opts), vec!["bolt", "m6"]);
/// assert!(tokenize("  -- ", &opts).is_empty());
/// ```
pub fn tokenize(raw: &str, options: &SearchOptions) -> Vec<String> {
    fold_unique(raw_tokens(raw, options).into_iter().map(str::to_owned))
}

/// One complete set of tokens that must all match for a record to qualify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    tokens: Vec<String>,
}

impl TokenSet {
    /// Tokens in first-occurrence order, without duplicates.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// All tokens concatenated, the folded form of the whole query.
    pub fn joined(&self) -> String {
        self.tokens.concat()
    }

    /// The first token, used for the positional tie-break.
    pub fn first(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }
}

/// A parsed query: the token variants to match with and the raw words to
/// highlight.
///
/// The primary variant comes from the query as typed. When transliterating
/// the capped words changes any of them, a second variant built from the
/// transliterated words follows, so a name typed in the wrong script still
/// matches.
#[derive(Debug, Clone)]
pub struct Query {
    raw: String,
    has_letters: bool,
    variants: Vec<TokenSet>,
    highlight_words: Vec<String>,
}

impl Query {
    /// Parse `raw` under the caps in `options`. Never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricesearch::{Query, SearchOptions};
    ///
    /// let q = Query::parse("болт", &SearchOptions::default());
    /// assert!(q.has_letters());
    /// assert_eq!(q.variants().len(), 2);
    /// assert_eq!(q.variants()[1].tokens(), ["bolt"]);
    /// ```
    pub fn parse(raw: &str, options: &SearchOptions) -> Self {
        let trimmed = raw.trim();
        let words = raw_tokens(trimmed, options);

        let mut variants = Vec::with_capacity(2);
        let primary = fold_unique(words.iter().map(|w| (*w).to_owned()));
        if !primary.is_empty() {
            variants.push(TokenSet { tokens: primary });

            let lowered: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
            let translit: Vec<String> = words.iter().map(|w| transliterate(w)).collect();
            if translit != lowered {
                let alternate = fold_unique(
                    translit
                        .iter()
                        .map(|w| truncate_chars(w, options.max_token_len).to_owned()),
                );
                if !alternate.is_empty() && variants.iter().all(|v| v.tokens != alternate) {
                    variants.push(TokenSet { tokens: alternate });
                }
            }
        }

        Self {
            raw: trimmed.to_owned(),
            has_letters: trimmed.chars().any(char::is_alphabetic),
            variants,
            highlight_words: words.into_iter().map(str::to_owned).collect(),
        }
    }

    /// The trimmed query text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the query was blank.
    pub fn is_blank(&self) -> bool {
        self.raw.is_empty()
    }

    /// Whether no usable token survived folding. Such a query matches nothing.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Whether the query contains any letter. Letter queries match on the
    /// name only; letterless queries also match article codes.
    pub fn has_letters(&self) -> bool {
        self.has_letters
    }

    /// Token variants, primary first.
    pub fn variants(&self) -> &[TokenSet] {
        &self.variants
    }

    /// The capped raw words in typed order, for highlighting.
    pub fn highlight_words(&self) -> &[String] {
        &self.highlight_words
    }
}
