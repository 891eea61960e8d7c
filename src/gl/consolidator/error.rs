use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool loads ledger exports, consolidates them, or emits the result.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading input files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when an input is not a well-formed workbook or does not follow
    /// the fixed A–Z journal layout. The whole input is rejected.
    #[error("failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    /// Raised when a row cannot be placed into a consolidation group.
    #[error("aggregation error: {0}")]
    Aggregation(String),

    /// Raised when the consolidated workbook cannot be produced or saved.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    /// Raised when JSON serialization of the report fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl ToolError {
    pub(crate) fn parse(source_name: &str, reason: impl Into<String>) -> Self {
        ToolError::Parse {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }
}
