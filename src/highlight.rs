//! Homoglyph-aware highlight patterns for presenting results.
//!
//! Query words become regular expressions in which each confusable letter
//! is replaced by a class matching both scripts and every other character
//! is escaped. All patterns are joined into one alternation so a single
//! pass wraps matches without re-matching inside inserted markup.
//!
//! The summed pattern length is capped. Over the cap no highlighting is
//! done for the query; this keeps user-controlled input from producing
//! expensive expressions.

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::normalize::{HOMOGLYPH_CLASSES, canonical_homoglyph};
use crate::record::Record;

/// Markup inserted before a highlighted match.
pub const MARK_OPEN: &str = "<span class=\"highlight\">";

/// Markup inserted after a highlighted match.
pub const MARK_CLOSE: &str = "</span>";

/// Compiled program size limit for the combined expression.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Escape `&`, `<`, `>`, `"` and `'` for inclusion in HTML text.
///
/// # Examples
///
/// ```
/// use pricesearch::highlight::escape_html;
///
/// assert_eq!(escape_html("a<b & 'c'"), "a&lt;b &amp; &#39;c&#39;");
/// assert_eq!(escape_html("plain"), "plain");
/// ```
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Build the pattern for one query word.
///
/// Confusable letters become a two-member class (`a` → `[aа]`); all other
/// characters are lowercased and regex-escaped. Matching is intended to be
/// case-insensitive.
///
/// # Examples
///
/// ```
/// use pricesearch::highlight::token_pattern;
///
/// assert_eq!(token_pattern("Ж5"), "ж5");
/// assert_eq!(token_pattern("M.6"), "[mм]\\.6");
/// ```
pub fn token_pattern(token: &str) -> String {
    let mut out = String::with_capacity(token.len() * 4);
    for raw in token.chars() {
        for lower in raw.to_lowercase() {
            let canon = canonical_homoglyph(lower);
            match HOMOGLYPH_CLASSES.iter().find(|&&(latin, _)| latin == canon) {
                Some(&(latin, cyr)) => {
                    out.push('[');
                    out.push(latin);
                    out.push(cyr);
                    out.push(']');
                }
                None => out.push_str(&regex::escape(lower.encode_utf8(&mut [0; 4]))),
            }
        }
    }
    out
}

/// Build one pattern per distinct word, longest word first.
///
/// The budget is checked over every word as given, repeats included:
/// when the summed pattern length, in characters, exceeds `max_total` the
/// result is empty.
///
/// # Examples
///
/// ```
/// use pricesearch::highlight::build_patterns;
///
/// assert_eq!(
///     build_patterns(&["m6", "bolt"], 2000),
///     vec!["[bв][oо]l[tт]", "[mм]6"],
/// );
///
/// let huge: Vec<String> = (0..40).map(|_| "a".repeat(64)).collect();
/// assert!(build_patterns(&huge, 2000).is_empty());
/// ```
pub fn build_patterns<S: AsRef<str>>(tokens: &[S], max_total: usize) -> Vec<String> {
    let mut words: Vec<(&str, String)> = Vec::with_capacity(tokens.len());
    let mut total = 0usize;
    for token in tokens {
        let token = token.as_ref();
        if token.is_empty() {
            continue;
        }
        let pattern = token_pattern(token);
        total += pattern.chars().count();
        if !words.iter().any(|(w, _)| *w == token) {
            words.push((token, pattern));
        }
    }
    if total > max_total {
        debug!(total, max_total, "highlight patterns over budget, highlighting disabled");
        return Vec::new();
    }

    // Stable, so equal-length words keep their typed order.
    words.sort_by_key(|(w, _)| std::cmp::Reverse(w.chars().count()));
    words.into_iter().map(|(_, p)| p).collect()
}

/// Compiled highlighter for one query.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    patterns: Vec<String>,
    regex: Option<Regex>,
}

impl Highlighter {
    /// Build patterns for `tokens` and compile them into one
    /// case-insensitive alternation.
    ///
    /// A compile failure disables highlighting rather than failing the
    /// query.
    pub fn new<S: AsRef<str>>(tokens: &[S], max_total: usize) -> Self {
        let patterns = build_patterns(tokens, max_total);
        if patterns.is_empty() {
            return Self::default();
        }
        let alternation = format!("(?:{})", patterns.join("|"));
        let regex = match RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .size_limit(REGEX_SIZE_LIMIT)
            .build()
        {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(error = %e, "failed to compile highlight pattern, highlighting disabled");
                None
            }
        };
        Self { patterns, regex }
    }

    /// The per-word patterns, longest word first. Empty when disabled.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether highlighting will change any text.
    pub fn is_active(&self) -> bool {
        self.regex.is_some()
    }

    /// Wrap matches in already-escaped HTML text with [`MARK_OPEN`] and
    /// [`MARK_CLOSE`].
    ///
    /// Character references such as `&amp;` or `&#39;` are copied through
    /// untouched and never matched, so highlighting cannot corrupt them.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricesearch::highlight::{Highlighter, escape_html};
    ///
    /// let h = Highlighter::new(&["amp"], 2000);
    /// let text = escape_html("Amp & clamp");
    /// assert_eq!(
    ///     h.highlight(&text),
    ///     "<span class=\"highlight\">Amp</span> &amp; cl<span class=\"highlight\">amp</span>",
    /// );
    /// ```
    pub fn highlight<'t>(&self, escaped: &'t str) -> Cow<'t, str> {
        let Some(regex) = &self.regex else {
            return Cow::Borrowed(escaped);
        };
        if escaped.is_empty() {
            return Cow::Borrowed(escaped);
        }

        let mut out = String::with_capacity(escaped.len() + 32);
        let mut rest = escaped;
        while !rest.is_empty() {
            let (text, entity, tail) = split_at_entity(rest);
            mark_matches(regex, text, &mut out);
            out.push_str(entity);
            rest = tail;
        }
        Cow::Owned(out)
    }
}

/// Render one result row as an HTML table row.
///
/// Name and article are escaped, then highlighted when a highlighter is
/// given. Documents become links in a fourth cell.
///
/// # Examples
///
/// ```
/// use pricesearch::Record;
/// use pricesearch::highlight::row_html;
///
/// let r = Record::new("A<B", "7", Some(1500.0), Vec::new());
/// assert_eq!(
///     row_html(&r, None),
///     "<tr><td class=\"copyable\">A&lt;B</td><td>7</td>\
///      <td class=\"text-price\">1\u{a0}500,00</td><td></td></tr>",
/// );
/// ```
pub fn row_html(record: &Record, highlighter: Option<&Highlighter>) -> String {
    let cell = |text: &str| {
        let escaped = escape_html(text);
        match highlighter {
            Some(h) => h.highlight(&escaped).into_owned(),
            None => escaped.into_owned(),
        }
    };
    let links: Vec<String> = record
        .documents
        .iter()
        .map(|d| {
            format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
                escape_html(&d.url),
                escape_html(&d.title)
            )
        })
        .collect();
    format!(
        "<tr><td class=\"copyable\">{}</td><td>{}</td><td class=\"text-price\">{}</td><td>{}</td></tr>",
        cell(&record.name),
        cell(&record.article),
        escape_html(record.formatted_price()),
        links.join("<br>")
    )
}

/// Append `text` to `out` with every match of `regex` wrapped in markup.
fn mark_matches(regex: &Regex, text: &str, out: &mut String) {
    let mut last = 0;
    for m in regex.find_iter(text) {
        if m.is_empty() {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        out.push_str(MARK_OPEN);
        out.push_str(m.as_str());
        out.push_str(MARK_CLOSE);
        last = m.end();
    }
    out.push_str(&text[last..]);
}

/// Split `s` into the text before the first character reference, the
/// reference itself, and the remainder.
///
/// A reference is `&` followed by up to eight ASCII alphanumerics or `#`
/// and a terminating `;`. A lone `&` counts as text.
fn split_at_entity(s: &str) -> (&str, &str, &str) {
    let bytes = s.as_bytes();
    let mut from = 0;
    while let Some(offset) = memchr::memchr(b'&', &bytes[from..]) {
        let start = from + offset;
        let body = bytes[start + 1..]
            .iter()
            .take(9)
            .position(|&b| !(b.is_ascii_alphanumeric() || b == b'#'));
        if let Some(len) = body {
            let semi = start + 1 + len;
            if len > 0 && bytes.get(semi) == Some(&b';') {
                return (&s[..start], &s[start..=semi], &s[semi + 1..]);
            }
        }
        from = start + 1;
    }
    (s, "", "")
}
