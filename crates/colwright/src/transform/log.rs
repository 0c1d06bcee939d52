//! Operation results and the append-only operation log.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ColwrightError, FailureKind, Result};

use super::operations::{Applied, OperationKind, TransformOperation};

/// Outcome of one transformation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult {
    /// Whether the operation completed.
    pub success: bool,

    /// Kind of operation.
    pub operation: OperationKind,

    /// Human-readable description of what was requested.
    pub description: String,

    /// Columns read by the operation.
    pub source_columns: Vec<String>,

    /// Columns created by the operation.
    #[serde(default)]
    pub new_columns: Vec<String>,

    /// Rows in the input dataset.
    pub rows_before: usize,

    /// Rows in the output dataset.
    pub rows_after: usize,

    /// Non-null output cells (merge) or rows processed (other operations).
    #[serde(default)]
    pub rows_affected: usize,

    /// Null output cells.
    #[serde(default)]
    pub null_count: usize,

    /// Non-null cells after a conversion.
    #[serde(default)]
    pub successful_conversions: usize,

    /// Values a conversion turned into Null.
    #[serde(default)]
    pub failed_conversions: usize,

    /// Failure classification when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,

    /// Failure message when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the result was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl OperationResult {
    pub(crate) fn succeeded(operation: &TransformOperation, rows_before: usize, applied: &Applied) -> Self {
        Self {
            success: true,
            operation: operation.kind(),
            description: operation.description(),
            source_columns: operation.source_columns(),
            new_columns: applied.new_columns.clone(),
            rows_before,
            rows_after: applied.dataset.row_count(),
            rows_affected: applied.rows_affected,
            null_count: applied.null_count,
            successful_conversions: applied.successful_conversions,
            failed_conversions: applied.failed_conversions,
            error_kind: None,
            error: None,
            recorded_at: Utc::now(),
        }
    }

    pub(crate) fn failed(operation: &TransformOperation, rows_before: usize, error: &ColwrightError) -> Self {
        Self {
            success: false,
            operation: operation.kind(),
            description: operation.description(),
            source_columns: operation.source_columns(),
            new_columns: Vec::new(),
            rows_before,
            rows_after: rows_before,
            rows_affected: 0,
            null_count: 0,
            successful_conversions: 0,
            failed_conversions: 0,
            error_kind: Some(error.kind()),
            error: Some(error.to_string()),
            recorded_at: Utc::now(),
        }
    }

    /// One-line summary for display.
    pub fn summary(&self) -> String {
        if !self.success {
            return format!(
                "{} failed: {}",
                self.operation.label(),
                self.error.as_deref().unwrap_or("unknown error")
            );
        }
        match self.operation {
            OperationKind::Merge => format!(
                "{}: {} values, {} nulls",
                self.description, self.rows_affected, self.null_count
            ),
            OperationKind::ConvertDtype => format!(
                "{}: {} converted, {} failed",
                self.description, self.successful_conversions, self.failed_conversions
            ),
            _ => format!(
                "{}: {} new column(s), {} rows",
                self.description,
                self.new_columns.len(),
                self.rows_after
            ),
        }
    }
}

/// Append-only record of successfully applied operations.
///
/// The log belongs to whoever owns the dataset being transformed; the engine
/// only ever appends to the log it is handed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationLog {
    entries: Vec<OperationResult>,
}

impl OperationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result.
    pub fn push(&mut self, result: OperationResult) {
        self.entries.push(result);
    }

    /// All recorded results, oldest first.
    pub fn entries(&self) -> &[OperationResult] {
        &self.entries
    }

    /// The most recent result.
    pub fn last(&self) -> Option<&OperationResult> {
        self.entries.last()
    }

    /// Number of recorded results.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every recorded result.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Save the log to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    ColwrightError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            ColwrightError::Persistence(format!(
                "Failed to create file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|e| {
            ColwrightError::Persistence(format!("Failed to serialize operation log: {}", e))
        })?;

        Ok(())
    }

    /// Load a log from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            ColwrightError::Persistence(format!(
                "Failed to open file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let reader = BufReader::new(file);
        let log: OperationLog = serde_json::from_reader(reader).map_err(|e| {
            ColwrightError::Persistence(format!(
                "Failed to parse operation log '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(log)
    }
}
