//! Dataset rows and their precomputed search fields.

use std::ops::Index;

use serde::Serialize;

use crate::error::LoadError;
use crate::normalize::{normalize, normalize_delimited};

/// A document link attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Display title; `Document N` when the source gave none.
    pub title: String,
    /// Absolute `http(s)` URL.
    pub url: String,
}

/// One dataset row.
///
/// The source fields are public. The derived search fields are computed once
/// in [`Record::new`] and are read-only afterwards; they are a pure function
/// of `name`, `article` and `price`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Product name as loaded.
    pub name: String,
    /// Article code as loaded.
    pub article: String,
    /// Price, when the source had a numeric value.
    pub price: Option<f64>,
    /// Document links in source order.
    pub documents: Vec<Document>,
    #[serde(skip)]
    normalized_name: String,
    #[serde(skip)]
    normalized_article: String,
    #[serde(skip)]
    delimited_name: String,
    #[serde(skip)]
    delimited_article: String,
    formatted_price: String,
}

impl Record {
    /// Build a record and precompute its search fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use pricesearch::Record;
    ///
    /// let r = Record::new("Болт М6", "001", Some(12.5), Vec::new());
    /// assert_eq!(r.normalized_name(), "бoлtm6");
    /// assert_eq!(r.formatted_price(), "12,50");
    /// ```
    pub fn new(
        name: impl Into<String>,
        article: impl Into<String>,
        price: Option<f64>,
        documents: Vec<Document>,
    ) -> Self {
        let name = name.into();
        let article = article.into();
        Self {
            normalized_name: normalize(&name),
            normalized_article: normalize(&article),
            delimited_name: normalize_delimited(&name),
            delimited_article: normalize_delimited(&article),
            formatted_price: format_price(price),
            name,
            article,
            price,
            documents,
        }
    }

    /// Strictly folded name, used for matching.
    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    /// Strictly folded article code, used for matching.
    pub fn normalized_article(&self) -> &str {
        &self.normalized_article
    }

    /// Folded name with delimiters kept, used for bonuses and tie-breaks.
    pub fn delimited_name(&self) -> &str {
        &self.delimited_name
    }

    /// Folded article code with delimiters kept.
    pub fn delimited_article(&self) -> &str {
        &self.delimited_article
    }

    /// Price formatted for display.
    pub fn formatted_price(&self) -> &str {
        &self.formatted_price
    }

    /// `name<TAB>article`, the text placed on the clipboard when a row is copied.
    pub fn clipboard_text(&self) -> String {
        format!("{}\t{}", self.name, self.article)
    }
}

/// Format a price with two decimals, a decimal comma and no-break-space
/// thousand groups. Missing and non-finite prices format as `0,00`.
///
/// # Examples
///
/// ```
/// use pricesearch::record::format_price;
///
/// assert_eq!(format_price(Some(1234.5)), "1\u{a0}234,50");
/// assert_eq!(format_price(Some(-0.004)), "0,00");
/// assert_eq!(format_price(None), "0,00");
/// ```
pub fn format_price(price: Option<f64>) -> String {
    let value = price.filter(|p| p.is_finite()).unwrap_or(0.0);
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 * 2);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('\u{a0}');
        }
        grouped.push(digit);
    }

    // Values that round to zero lose their sign.
    let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{frac_part}")
}

/// An ordered, immutable collection of records.
///
/// Construction enforces the row cap; there is no way to add or modify rows
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Wrap `records`, rejecting empty input and more than `max_rows` rows.
    ///
    /// # Errors
    ///
    /// [`LoadError::Empty`] or [`LoadError::TooManyRows`].
    pub fn new(records: Vec<Record>, max_rows: usize) -> Result<Self, LoadError> {
        if records.is_empty() {
            return Err(LoadError::Empty);
        }
        if records.len() > max_rows {
            return Err(LoadError::TooManyRows {
                count: records.len(),
                max: max_rows,
            });
        }
        Ok(Self { records })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows. Only true for `Dataset::default()`.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row at `index` in load order.
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Rows in load order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterate rows in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl Index<usize> for Dataset {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.records[index]
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- derived fields ---

    #[test]
    fn derived_fields_are_deterministic() {
        let a = Record::new("Кабель ВВГ 3x2.5", "12-345", Some(99.0), Vec::new());
        let b = Record::new("Кабель ВВГ 3x2.5", "12-345", Some(99.0), Vec::new());
        assert_eq!(a, b);
        assert_eq!(a.normalized_article(), "12345");
        assert_eq!(a.delimited_article(), "12-345");
    }

    #[test]
    fn clipboard_text_is_tab_separated() {
        let r = Record::new("Bolt", "001", None, Vec::new());
        assert_eq!(r.clipboard_text(), "Bolt\t001");
    }

    // --- format_price ---

    #[test]
    fn price_groups_thousands() {
        assert_eq!(format_price(Some(1_234_567.891)), "1\u{a0}234\u{a0}567,89");
    }

    #[test]
    fn price_small_values() {
        assert_eq!(format_price(Some(0.5)), "0,50");
        assert_eq!(format_price(Some(999.999)), "1\u{a0}000,00");
    }

    #[test]
    fn price_negative() {
        assert_eq!(format_price(Some(-1500.0)), "-1\u{a0}500,00");
    }

    #[test]
    fn price_missing_or_nan() {
        assert_eq!(format_price(None), "0,00");
        assert_eq!(format_price(Some(f64::NAN)), "0,00");
    }

    // --- Dataset ---

    #[test]
    fn dataset_rejects_empty() {
        assert!(matches!(Dataset::new(Vec::new(), 10), Err(LoadError::Empty)));
    }

    #[test]
    fn dataset_rejects_over_cap() {
        let rows = vec![Record::new("a", "1", None, Vec::new()); 3];
        let err = Dataset::new(rows, 2).unwrap_err();
        assert!(matches!(err, LoadError::TooManyRows { count: 3, max: 2 }));
    }

    #[test]
    fn dataset_keeps_load_order() {
        let rows = vec![
            Record::new("first", "1", None, Vec::new()),
            Record::new("second", "2", None, Vec::new()),
        ];
        let ds = Dataset::new(rows, 10).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds[1].name, "second");
        assert_eq!(ds.iter().next().map(|r| r.name.as_str()), Some("first"));
    }
}
