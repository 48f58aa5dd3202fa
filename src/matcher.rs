//! AND-semantics substring filtering of records.
//!
//! # Field policy
//!
//! | Query contains a letter | Token must be a substring of            |
//! |-------------------------|-----------------------------------------|
//! | yes (`bolt`, `5v`)      | the normalized name                     |
//! | no (`12345`, `12-34`)   | the normalized name or normalized article |
//!
//! Letter queries never match through article codes, so a word query does
//! not pick up rows whose article happens to contain the same digits, and a
//! numeric lookup still finds rows by article.

use memchr::memmem::Finder;

use crate::record::{Dataset, Record};
use crate::tokenize::{Query, TokenSet};

/// Which record fields a query's tokens are matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Name only. Chosen when the query contains a letter.
    NameOnly,
    /// Name or article, decided per token. Chosen for letterless queries.
    NameOrArticle,
}

impl FieldPolicy {
    /// The policy that applies to `query`.
    pub fn for_query(query: &Query) -> Self {
        if query.has_letters() {
            FieldPolicy::NameOnly
        } else {
            FieldPolicy::NameOrArticle
        }
    }
}

/// A record that passed the filter, with the token variants it satisfied.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// The matching record.
    pub record: &'a Record,
    /// Position of the record in load order.
    pub index: usize,
    /// Bit `i` is set when variant `i` of the query matched.
    matched: u8,
}

impl Candidate<'_> {
    /// Whether the query variant at `variant` matched this record.
    pub fn matched(&self, variant: usize) -> bool {
        variant < 8 && self.matched & (1 << variant) != 0
    }
}

/// Substring searchers for one token variant, built once per query.
struct VariantFinders<'q> {
    finders: Vec<Finder<'q>>,
}

impl<'q> VariantFinders<'q> {
    fn new(set: &'q TokenSet) -> Self {
        Self {
            finders: set
                .tokens()
                .iter()
                .map(|t| Finder::new(t.as_bytes()))
                .collect(),
        }
    }

    fn matches(&self, record: &Record, policy: FieldPolicy) -> bool {
        let name = record.normalized_name().as_bytes();
        let article = record.normalized_article().as_bytes();
        self.finders.iter().all(|f| match policy {
            FieldPolicy::NameOnly => f.find(name).is_some(),
            FieldPolicy::NameOrArticle => f.find(name).is_some() || f.find(article).is_some(),
        })
    }
}

/// Whether every token of `set` occurs in the fields `policy` selects.
///
/// # Examples
///
/// ```
/// use pricesearch::{Query, Record, SearchOptions};
/// use pricesearch::matcher::{FieldPolicy, matches};
///
/// let rec = Record::new("Bolt M6", "12345", None, Vec::new());
/// let q = Query::parse("m6 bolt", &SearchOptions::default());
/// assert!(matches(&rec, &q.variants()[0], FieldPolicy::NameOnly));
/// ```
pub fn matches(record: &Record, set: &TokenSet, policy: FieldPolicy) -> bool {
    VariantFinders::new(set).matches(record, policy)
}

/// Keep the records that satisfy at least one variant of `query`, in load
/// order.
///
/// A blank query, or one whose tokens all folded away, yields no
/// candidates. Each record's fields were normalized at load time; this pass
/// only runs substring searches.
pub fn filter<'a>(dataset: &'a Dataset, query: &Query) -> Vec<Candidate<'a>> {
    if query.is_empty() {
        return Vec::new();
    }
    let policy = FieldPolicy::for_query(query);
    let variants: Vec<VariantFinders<'_>> = query
        .variants()
        .iter()
        .take(8)
        .map(VariantFinders::new)
        .collect();

    dataset
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let matched = variants
                .iter()
                .enumerate()
                .filter(|(_, v)| v.matches(record, policy))
                .fold(0u8, |mask, (i, _)| mask | (1 << i));
            (matched != 0).then_some(Candidate {
                record,
                index,
                matched,
            })
        })
        .collect()
}
