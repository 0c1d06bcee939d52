//! Pre-flight checks for merge and split requests.
//!
//! These never fail; problems are reported as errors and warnings so a
//! caller can show them before committing to an operation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::inference::TypeInferenceEngine;
use crate::schema::{Dataset, SemanticType};

use super::split::split_value;

/// Name fragments that mark a column as holding a date or time component.
const DATE_NAME_HINTS: [&str; 8] = ["year", "month", "day", "hour", "minute", "second", "date", "time"];

/// Outcome of [`validate_merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeValidation {
    pub valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    /// Resolved semantic type of every column that exists.
    pub dtype_info: IndexMap<String, SemanticType>,
}

/// Outcome of [`validate_split`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitValidation {
    pub valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    /// Split parts of the first few sampled values.
    pub preview: Vec<Vec<String>>,
    /// Widest part count seen in the sample.
    pub estimated_columns: usize,
}

/// Check that `columns` can be merged and flag likely surprises.
pub fn validate_merge(
    dataset: &Dataset,
    columns: &[String],
    datetime_mode: bool,
    config: &EngineConfig,
) -> MergeValidation {
    let inference = TypeInferenceEngine::new();
    let mut report = MergeValidation {
        valid: true,
        ..Default::default()
    };

    for name in columns {
        let Some(column) = dataset.column(name) else {
            report.errors.push(format!("Column '{}' not found", name));
            report.valid = false;
            continue;
        };
        report.dtype_info.insert(name.clone(), inference.resolve(column));

        if column.is_empty() {
            continue;
        }
        let missing = column.null_count() as f64 / column.len() as f64 * 100.0;
        if missing > config.missing_warning_percent {
            report
                .warnings
                .push(format!("Column '{}' has {:.1}% missing values", name, missing));
        }
    }

    if datetime_mode {
        let has_date_column = columns.iter().any(|name| {
            let lower = name.to_lowercase();
            DATE_NAME_HINTS.iter().any(|hint| lower.contains(hint))
        });
        if !has_date_column {
            report.warnings.push(
                "Selected columns don't appear to contain date/time components; \
                 values will be parsed as full datetimes"
                    .to_string(),
            );
        }
    }

    report
}

/// Sample `column` and estimate what splitting it on `separator` produces.
pub fn validate_split(dataset: &Dataset, column: &str, separator: &str, config: &EngineConfig) -> SplitValidation {
    let mut report = SplitValidation {
        valid: true,
        ..Default::default()
    };

    let Some(source) = dataset.column(column) else {
        report.errors.push(format!("Column '{}' not found", column));
        report.valid = false;
        return report;
    };

    if separator.is_empty() {
        report
            .warnings
            .push("No separator provided; values will be split on whitespace".to_string());
    }

    let parts: Vec<Vec<String>> = source
        .non_null()
        .take(config.split_sample_rows)
        .map(|cell| split_value(&cell.to_string(), separator, None))
        .collect();

    let min = parts.iter().map(Vec::len).min().unwrap_or(0);
    let max = parts.iter().map(Vec::len).max().unwrap_or(0);
    report.estimated_columns = max;
    if min != max {
        report.warnings.push(format!(
            "Inconsistent split counts detected (range: {} to {} parts)",
            min, max
        ));
    }
    report.preview = parts.into_iter().take(config.split_preview_rows).collect();

    report
}
