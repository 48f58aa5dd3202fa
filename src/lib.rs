#![warn(missing_docs)]

//! Homoglyph-tolerant search over a product price list.
//!
//! `pricesearch` loads a table of records (name, article code, price,
//! document links), folds every searchable field so that Latin and Cyrillic
//! look-alike letters compare equal, and ranks the records matching a typed
//! query. Queries typed in the wrong keyboard script also match through a
//! transliterated alternate.
//!
//! # Examples
//!
//! ```
//! use pricesearch::{Dataset, Query, Record, SearchOptions, search};
//!
//! let opts = SearchOptions::default();
//! let dataset = Dataset::new(
//!     vec![
//!         Record::new("Bolt M6x20", "001", Some(10.0), Vec::new()),
//!         Record::new("Bolt M6", "002", Some(8.0), Vec::new()),
//!         Record::new("Nut M6", "003", Some(2.0), Vec::new()),
//!     ],
//!     opts.max_rows,
//! )
//! .unwrap();
//!
//! let query = Query::parse("bolt", &opts);
//! let names: Vec<&str> = search(&dataset, &query)
//!     .iter()
//!     .map(|r| r.record.name.as_str())
//!     .collect();
//! assert_eq!(names, ["Bolt M6", "Bolt M6x20"]);
//! ```

use tracing::debug;

/// Debouncing of typed input.
pub mod debounce;

/// Load and configuration errors.
pub mod error;

/// Highlight pattern construction and HTML markup.
pub mod highlight;

/// Dataset sources and payload parsing.
pub mod loader;

/// Record filtering by query tokens.
pub mod matcher;

/// Text folding and transliteration.
pub mod normalize;

/// Configuration options for loading and searching.
pub mod options;

/// Relevance scoring of matched records.
pub mod ranking;

/// Records and the dataset that holds them.
pub mod record;

/// Query state and result windows.
pub mod session;

/// Result ordering.
pub mod sort;

/// Query tokenization.
pub mod tokenize;

pub use debounce::Debouncer;
pub use error::{ConfigError, LoadError};
pub use highlight::Highlighter;
pub use loader::{DatasetSource, FileSource};
pub use options::SearchOptions;
pub use ranking::{RankedRecord, Score};
pub use record::{Dataset, Document, Record};
pub use session::{Presenter, ResultsView, SearchSession, SearchState};
pub use tokenize::Query;

/// Filter `dataset` by `query` and rank the matches best first.
///
/// A blank or punctuation-only query yields no results.
pub fn search<'a>(dataset: &'a Dataset, query: &Query) -> Vec<RankedRecord<'a>> {
    let candidates = matcher::filter(dataset, query);
    let matched = candidates.len();
    let ranked = ranking::rank(candidates, query);
    debug!(
        query = query.raw(),
        variants = query.variants().len(),
        matched,
        "search complete"
    );
    ranked
}
