// ⚠️ Boundary Errors
// Row-level problems never land here; they are RowOutcome values in the joiner.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Header row lacks a column the conversion needs (headers are case-sensitive)
    #[error("{table} CSV is missing required column '{column}'")]
    MissingColumn { table: &'static str, column: &'static str },

    /// Config file parse or diagnostics report rendering
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown declared type '{0}' (expected BOOL, INT or FLOAT)")]
    UnknownType(String),

    /// Output exists but must not be delivered until every address resolves
    #[error("delivery blocked: {} address(es) missing from documentation: {}", .0.len(), .0.join(", "))]
    DeliveryBlocked(Vec<String>),

    #[error("no conversion has been recorded in this session")]
    NothingRecorded,
}
