//! Relevance scoring for matched records.
//!
//! A record's score for one token variant is the sum of two parts:
//!
//! | Part              | Value                                               |
//! |-------------------|-----------------------------------------------------|
//! | Character overlap | multiset intersection of query and target characters |
//! | Article bonus     | [`ARTICLE_BONUS`] per token found in the delimited article (letterless queries only) |
//! | Name bonus        | [`NAME_BONUS`] per token found in the delimited name |
//!
//! Bonuses dwarf the overlap score, so contiguous matches always outrank
//! scattered character overlap. Records are then ordered by the comparator
//! in [`crate::sort`].

use std::collections::HashMap;

use crate::matcher::{Candidate, FieldPolicy};
use crate::record::Record;
use crate::sort::compare_ranked;
use crate::tokenize::{Query, TokenSet};

/// Added for each token that occurs in the delimiter-preserving article.
pub const ARTICLE_BONUS: u32 = 1000;

/// Added for each token that occurs in the delimiter-preserving name.
pub const NAME_BONUS: u32 = 600;

/// Relevance of one record for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    /// Overlap plus bonuses. Higher is better.
    pub total: u32,
    /// Character index of the first query token in the relevant delimited
    /// field, or `None` when it does not occur there.
    pub position: Option<usize>,
}

impl Score {
    /// Whether `self` beats `other` when choosing between token variants:
    /// higher total first, then the earlier position.
    fn beats(&self, other: &Score) -> bool {
        match self.total.cmp(&other.total) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => match (self.position, other.position) {
                (Some(a), Some(b)) => a < b,
                (Some(_), None) => true,
                _ => false,
            },
        }
    }
}

/// A record placed in the result order.
#[derive(Debug, Clone, Copy)]
pub struct RankedRecord<'a> {
    /// The record.
    pub record: &'a Record,
    /// Position of the record in load order. The final tie-breaker.
    pub index: usize,
    /// The record's relevance.
    pub score: Score,
}

/// Count characters of `query` that can each consume a distinct occurrence
/// of the same character in `target`.
///
/// Order is ignored and multiplicity counts: `"aab"` against `"abc"` scores
/// 2 because only one `a` is available.
///
/// # Examples
///
/// ```
/// use pricesearch::ranking::overlap_score;
///
/// assert_eq!(overlap_score("abc", "aab"), 2);
/// assert_eq!(overlap_score("boltm6", "m6bolt"), 6);
/// assert_eq!(overlap_score("", "abc"), 0);
/// ```
pub fn overlap_score(target: &str, query: &str) -> u32 {
    // ASCII occurrences are counted in a flat table, the rest in a map.
    let mut ascii = [0u32; 128];
    let mut other: HashMap<char, u32> = HashMap::new();
    for c in target.chars() {
        if c.is_ascii() {
            ascii[c as usize] += 1;
        } else {
            *other.entry(c).or_insert(0) += 1;
        }
    }

    let mut score = 0;
    for c in query.chars() {
        let slot = if c.is_ascii() {
            Some(&mut ascii[c as usize])
        } else {
            other.get_mut(&c)
        };
        if let Some(count) = slot.filter(|n| **n > 0) {
            *count -= 1;
            score += 1;
        }
    }
    score
}

/// Character index of the first occurrence of `needle` in `haystack`.
fn char_position(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .find(needle)
        .map(|byte_idx| haystack[..byte_idx].chars().count())
}

/// Score `record` against one token variant.
///
/// The overlap target is the normalized name for letter queries and the
/// normalized article followed by the normalized name otherwise. The
/// position is looked up in the delimited name or delimited article
/// respectively.
///
/// # Examples
///
/// ```
/// use pricesearch::{Query, Record, SearchOptions};
/// use pricesearch::matcher::FieldPolicy;
/// use pricesearch::ranking::{NAME_BONUS, score_variant};
///
/// let rec = Record::new("Bolt M6", "001", None, Vec::new());
/// let q = Query::parse("bolt", &SearchOptions::default());
/// let score = score_variant(&rec, &q.variants()[0], FieldPolicy::NameOnly);
/// assert_eq!(score.total, 4 + NAME_BONUS);
/// assert_eq!(score.position, Some(0));
/// ```
pub fn score_variant(record: &Record, set: &TokenSet, policy: FieldPolicy) -> Score {
    let query = set.joined();
    let overlap = match policy {
        FieldPolicy::NameOnly => overlap_score(record.normalized_name(), &query),
        FieldPolicy::NameOrArticle => {
            let target = format!("{}{}", record.normalized_article(), record.normalized_name());
            overlap_score(&target, &query)
        }
    };

    let mut bonus = 0;
    for token in set.tokens() {
        if policy == FieldPolicy::NameOrArticle
            && record.delimited_article().contains(token.as_str())
        {
            bonus += ARTICLE_BONUS;
        }
        if record.delimited_name().contains(token.as_str()) {
            bonus += NAME_BONUS;
        }
    }

    let field = match policy {
        FieldPolicy::NameOnly => record.delimited_name(),
        FieldPolicy::NameOrArticle => record.delimited_article(),
    };
    let position = set.first().and_then(|first| char_position(field, first));

    Score {
        total: overlap + bonus,
        position,
    }
}

/// Score a filtered candidate: the best score among the query variants it
/// matched.
pub fn score_candidate(candidate: &Candidate<'_>, query: &Query) -> Score {
    let policy = FieldPolicy::for_query(query);
    let mut best: Option<Score> = None;
    for (i, set) in query.variants().iter().enumerate() {
        if !candidate.matched(i) {
            continue;
        }
        let score = score_variant(candidate.record, set, policy);
        if best.as_ref().is_none_or(|b| score.beats(b)) {
            best = Some(score);
        }
    }
    best.unwrap_or(Score {
        total: 0,
        position: None,
    })
}

/// Score every candidate and order them best first.
///
/// The order is total: score, then match position, then normalized name
/// length, then load order. Identical inputs always give identical output.
pub fn rank<'a>(candidates: Vec<Candidate<'a>>, query: &Query) -> Vec<RankedRecord<'a>> {
    let mut ranked: Vec<RankedRecord<'a>> = candidates
        .into_iter()
        .map(|c| RankedRecord {
            record: c.record,
            index: c.index,
            score: score_candidate(&c, query),
        })
        .collect();
    ranked.sort_by(compare_ranked);
    ranked
}
