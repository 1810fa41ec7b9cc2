//! Error types for the tickstats system.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Batch-level error type.
///
/// Only configuration problems and source/sink unavailability abort a run.
/// Row-level problems are reported through [`RowError`] and never escape
/// the ingestion pass.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input could not be opened or read.
    #[error("Source unavailable ({origin}): {source}")]
    SourceUnavailable {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    /// Output could not be created or written.
    #[error("Sink unavailable ({origin}): {source}")]
    SinkUnavailable {
        origin: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a source unavailable error.
    pub fn source_unavailable(origin: impl Into<String>, source: std::io::Error) -> Self {
        Error::SourceUnavailable {
            origin: origin.into(),
            source,
        }
    }

    /// Create a sink unavailable error.
    pub fn sink_unavailable(origin: impl Into<String>, source: std::io::Error) -> Self {
        Error::SinkUnavailable {
            origin: origin.into(),
            source,
        }
    }

    /// Whether this error came from the input side.
    pub fn is_source_error(&self) -> bool {
        matches!(self, Error::SourceUnavailable { .. })
    }

    /// Whether this error came from the output side.
    pub fn is_sink_error(&self) -> bool {
        matches!(self, Error::SinkUnavailable { .. })
    }
}

/// Per-row outcome that is recovered locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    /// A numeric field was empty or unparseable. The caller substitutes a default.
    #[error("Malformed field in column {column}: {raw:?}")]
    MalformedField { column: usize, raw: String },

    /// The row has fewer columns than the schema needs, even after padding.
    #[error("Structurally invalid row: {found} columns, {required} required")]
    StructurallyInvalidRow { found: usize, required: usize },
}
