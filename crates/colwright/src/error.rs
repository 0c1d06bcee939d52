//! Error types for the colwright library.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for colwright operations.
#[derive(Debug, Error)]
pub enum ColwrightError {
    /// Invalid operation parameters detected before any computation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// One or more referenced columns do not exist.
    #[error("Columns not found: {}", .0.join(", "))]
    ColumnNotFound(Vec<String>),

    /// An output column would collide with an existing column.
    #[error("Column already exists: '{0}'")]
    ColumnExists(String),

    /// A single value could not be converted under the `raise` policy.
    #[error("Cannot convert value '{value}' in column '{column}' (row {row}) to {target}")]
    Conversion {
        column: String,
        row: usize,
        value: String,
        target: String,
    },

    /// Unexpected failure while computing a transformation.
    #[error("Transformation failed: {0}")]
    Structural(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing CSV/TSV data.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to transform.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Saving or loading an operation log failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse failure classification recorded on failed operation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rejected before computation (missing columns, bad parameters).
    Validation,
    /// A value could not be coerced under the `raise` policy.
    Conversion,
    /// Anything else that went wrong mid-computation.
    Structural,
}

impl ColwrightError {
    /// Map this error onto the failure taxonomy used in operation results.
    pub fn kind(&self) -> FailureKind {
        match self {
            ColwrightError::Validation(_)
            | ColwrightError::ColumnNotFound(_)
            | ColwrightError::ColumnExists(_)
            | ColwrightError::Config(_) => FailureKind::Validation,
            ColwrightError::Conversion { .. } => FailureKind::Conversion,
            _ => FailureKind::Structural,
        }
    }
}

/// Result type alias for colwright operations.
pub type Result<T> = std::result::Result<T, ColwrightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ColwrightError::ColumnNotFound(vec!["a".into()]).kind(),
            FailureKind::Validation
        );
        assert_eq!(
            ColwrightError::Conversion {
                column: "x".into(),
                row: 0,
                value: "abc".into(),
                target: "integer".into(),
            }
            .kind(),
            FailureKind::Conversion
        );
        assert_eq!(
            ColwrightError::Structural("boom".into()).kind(),
            FailureKind::Structural
        );
    }

    #[test]
    fn test_column_not_found_message() {
        let err = ColwrightError::ColumnNotFound(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Columns not found: a, b");
    }
}
