//! Configuration options for loading and searching.
//!
//! [`SearchOptions`] carries every limit the engine enforces: token caps,
//! the highlight pattern budget, dataset size limits and page geometry.
//! Defaults reproduce the limits the search surface ships with; a JSON file
//! can override any subset of them.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Global options that control loading, matching and presentation.
///
/// # Defaults
///
/// - `max_tokens`: 6
/// - `max_token_len`: 64 characters
/// - `max_pattern_total`: 2000 characters of highlight pattern
/// - `max_rows`: 200 000
/// - `max_payload_bytes`: 15 MiB
/// - `page_size`: 200
/// - `debounce`: 200 ms
/// - `highlight_row_limit`: 5000
///
/// # Examples
///
/// ```
/// use pricesearch::SearchOptions;
///
/// let opts = SearchOptions::default();
/// assert_eq!(opts.max_tokens, 6);
///
/// let opts = SearchOptions { page_size: 50, ..Default::default() };
/// assert_eq!(opts.page_size, 50);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Query words beyond this count are ignored.
    pub max_tokens: usize,
    /// Each query word is truncated to this many characters before folding.
    pub max_token_len: usize,
    /// Upper bound on the summed length of all highlight patterns. Above it,
    /// highlighting is skipped for the query.
    pub max_pattern_total: usize,
    /// Datasets with more rows are rejected at load time.
    pub max_rows: usize,
    /// Payloads larger than this many bytes are rejected at load time.
    pub max_payload_bytes: u64,
    /// Rows added to the visible window by each "show more".
    pub page_size: usize,
    /// Quiet period before a pending query is executed.
    #[serde(with = "millis")]
    pub debounce: Duration,
    /// Result sets larger than this are presented without highlighting.
    pub highlight_row_limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_tokens: 6,
            max_token_len: 64,
            max_pattern_total: 2000,
            max_rows: 200_000,
            max_payload_bytes: 15 * 1024 * 1024,
            page_size: 200,
            debounce: Duration::from_millis(200),
            highlight_row_limit: 5000,
        }
    }
}

impl SearchOptions {
    /// Read options from a JSON file. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, is not valid
    /// JSON for this struct, or sets a limit that would make the engine
    /// unusable (see [`SearchOptions::validate`]).
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let opts: SearchOptions = serde_json::from_str(&text)?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject zero token, token-length and page-size limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = [
            ("max_tokens", self.max_tokens),
            ("max_token_len", self.max_token_len),
            ("page_size", self.page_size),
        ];
        for (field, value) in zero {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{field} must be at least 1")));
            }
        }
        Ok(())
    }
}

/// Durations are written as integer milliseconds in config files.
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let opts = SearchOptions::default();
        assert_eq!(opts.max_tokens, 6);
        assert_eq!(opts.max_token_len, 64);
        assert_eq!(opts.max_pattern_total, 2000);
        assert_eq!(opts.max_rows, 200_000);
        assert_eq!(opts.page_size, 200);
        assert_eq!(opts.debounce, Duration::from_millis(200));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let opts: SearchOptions =
            serde_json::from_str(r#"{"page_size": 25, "debounce": 50}"#).unwrap();
        assert_eq!(opts.page_size, 25);
        assert_eq!(opts.debounce, Duration::from_millis(50));
        assert_eq!(opts.max_tokens, 6);
    }

    #[test]
    fn zero_page_size_is_invalid() {
        let opts = SearchOptions {
            page_size: 0,
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn from_json_file_reads_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.json");
        std::fs::write(&path, r#"{"max_rows": 10}"#).unwrap();
        let opts = SearchOptions::from_json_file(&path).unwrap();
        assert_eq!(opts.max_rows, 10);
    }

    #[test]
    fn from_json_file_missing_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SearchOptions::from_json_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
