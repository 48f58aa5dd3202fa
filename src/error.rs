//! Error types for dataset loading and configuration.
//!
//! Query processing has no error type: tokenizing, matching, scoring and
//! highlight construction accept any input string.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce a dataset. Fatal to the session until a reload.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source could not be read.
    #[error("failed to read dataset from {}: {source}", path.display())]
    Fetch {
        /// Location the source tried to read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// A source that speaks a status protocol answered with a failure.
    #[error("dataset request failed with status {code} {reason}")]
    Status {
        /// Status code reported by the source.
        code: u16,
        /// Human-readable reason phrase.
        reason: String,
    },

    /// The payload exceeds the configured byte limit.
    #[error("dataset is too large ({size} bytes, limit {max} bytes)")]
    PayloadTooLarge {
        /// Observed size in bytes.
        size: u64,
        /// Configured limit in bytes.
        max: u64,
    },

    /// The payload is not valid JSON.
    #[error("dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The payload is valid JSON but not a collection of rows.
    #[error("dataset has an unsupported format: {0}")]
    InvalidFormat(String),

    /// The payload contains no data rows.
    #[error("dataset is empty")]
    Empty,

    /// The payload has more rows than the configured cap.
    #[error("too many rows ({count}, limit {max})")]
    TooManyRows {
        /// Number of data rows in the payload.
        count: usize,
        /// Configured row cap.
        max: usize,
    },

    /// Required columns are absent from the first row.
    #[error("missing required columns: {}", missing.join(", "))]
    MissingColumns {
        /// Accepted aliases of each missing field, joined with `/`.
        missing: Vec<String>,
    },
}

/// Failure to read or validate a [`SearchOptions`](crate::SearchOptions) file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// The config file is not valid JSON for the options struct.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A limit has an unusable value.
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_message_lists_aliases() {
        let err = LoadError::MissingColumns {
            missing: vec!["article/Артикул".to_owned()],
        };
        assert_eq!(err.to_string(), "missing required columns: article/Артикул");
    }

    #[test]
    fn too_many_rows_message() {
        let err = LoadError::TooManyRows {
            count: 200_001,
            max: 200_000,
        };
        assert_eq!(err.to_string(), "too many rows (200001, limit 200000)");
    }
}
