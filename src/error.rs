//! Error types for the netbank export library.

use std::path::PathBuf;

use chrono::NaiveDate;

/// All errors that can occur while retrieving or exporting account history.
#[derive(Debug, thiserror::Error)]
pub enum NetbankError {
    /// No account matched the user-supplied name or number pattern.
    #[error("cannot find account matching pattern '{pattern}'")]
    AccountNotFound {
        /// The pattern that was searched for.
        pattern: String,
    },

    /// The requested export format is not one of the known formats.
    #[error(
        "unsupported export format '{0}' (expected one of: json, csv, qif, aus.qif, us.qif, ofx)"
    )]
    UnsupportedFormat(String),

    /// A record could not be encoded into the target format.
    ///
    /// The whole export fails; no partial document is ever produced.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The export payload could not be written to disk.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// Destination path of the export.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// A date range whose start lies after its end.
    #[error("invalid date range: {from} is after {to}")]
    InvalidRange {
        /// Range start.
        from: NaiveDate,
        /// Range end.
        to: NaiveDate,
    },

    /// A configuration value could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The bank session collaborator failed.
    #[error("session error: {0}")]
    Session(Box<dyn core::error::Error + Send + Sync>),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, NetbankError>;
