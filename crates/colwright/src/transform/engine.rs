//! Transformation engine: the single entry point for every operation.

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::inference::TypeInferenceEngine;
use crate::schema::{Column, Dataset, SemanticType};

use super::convert::convert_column;
use super::json::{self, JsonColumnInfo};
use super::log::{OperationLog, OperationResult};
use super::merge::{ComponentClassifier, classify_component, merge_columns};
use super::operations::{
    Applied, CollapseOptions, ConvertOptions, ExpandOptions, MergeOptions, SplitOptions, TransformOperation,
};
use super::split::split_column;
use super::validate::{self, MergeValidation, SplitValidation};

/// Engine for applying transformations to datasets.
///
/// Every operation takes the input dataset by reference and returns a new
/// dataset together with an [`OperationResult`]. Failures never escape as
/// errors: the input is returned unchanged and the result carries the error.
/// Only successful results are appended to the log.
#[derive(Debug, Clone)]
pub struct TransformEngine {
    config: EngineConfig,
    classifier: ComponentClassifier,
    inference: TypeInferenceEngine,
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            classifier: classify_component,
            inference: TypeInferenceEngine::new(),
        }
    }
}

impl TransformEngine {
    /// Create a new transform engine with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Replace the column-name classifier used by datetime merges.
    pub fn with_classifier(mut self, classifier: ComponentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply one operation, appending the result to `log` on success.
    pub fn apply(
        &self,
        dataset: &Dataset,
        operation: &TransformOperation,
        log: &mut OperationLog,
    ) -> (Dataset, OperationResult) {
        let rows_before = dataset.row_count();
        debug!(operation = %operation.description(), rows = rows_before, "applying operation");

        match self.execute(dataset, operation) {
            Ok(applied) => {
                let result = OperationResult::succeeded(operation, rows_before, &applied);
                info!(
                    operation = operation.kind().label(),
                    new_columns = ?result.new_columns,
                    rows_after = result.rows_after,
                    "{}",
                    result.summary()
                );
                log.push(result.clone());
                (applied.dataset, result)
            }
            Err(e) => {
                warn!(operation = operation.kind().label(), error = %e, "operation rejected");
                (dataset.clone(), OperationResult::failed(operation, rows_before, &e))
            }
        }
    }

    fn execute(&self, dataset: &Dataset, operation: &TransformOperation) -> Result<Applied> {
        match operation {
            TransformOperation::Merge(options) => merge_columns(dataset, options, &self.config, self.classifier),
            TransformOperation::Split(options) => split_column(dataset, options),
            TransformOperation::ExpandJson(options) => json::expand(dataset, options),
            TransformOperation::CollapseJson(options) => json::collapse(dataset, options),
            TransformOperation::Convert(options) => convert_column(dataset, options),
        }
    }

    /// Merge several columns into a new one.
    pub fn merge(
        &self,
        dataset: &Dataset,
        options: &MergeOptions,
        log: &mut OperationLog,
    ) -> (Dataset, OperationResult) {
        self.apply(dataset, &TransformOperation::Merge(options.clone()), log)
    }

    /// Split one column into several new ones.
    pub fn split(
        &self,
        dataset: &Dataset,
        options: &SplitOptions,
        log: &mut OperationLog,
    ) -> (Dataset, OperationResult) {
        self.apply(dataset, &TransformOperation::Split(options.clone()), log)
    }

    /// Extract keys from a JSON column.
    pub fn expand_json(
        &self,
        dataset: &Dataset,
        options: &ExpandOptions,
        log: &mut OperationLog,
    ) -> (Dataset, OperationResult) {
        self.apply(dataset, &TransformOperation::ExpandJson(options.clone()), log)
    }

    /// Pack columns into a JSON column.
    pub fn collapse_json(
        &self,
        dataset: &Dataset,
        options: &CollapseOptions,
        log: &mut OperationLog,
    ) -> (Dataset, OperationResult) {
        self.apply(dataset, &TransformOperation::CollapseJson(options.clone()), log)
    }

    /// Convert a column to another semantic type.
    pub fn convert(
        &self,
        dataset: &Dataset,
        options: &ConvertOptions,
        log: &mut OperationLog,
    ) -> (Dataset, OperationResult) {
        self.apply(dataset, &TransformOperation::Convert(options.clone()), log)
    }

    /// Find columns holding JSON lists or objects.
    pub fn detect_json(&self, dataset: &Dataset) -> Vec<JsonColumnInfo> {
        json::detect(dataset, &self.config)
    }

    /// Resolve the semantic type of one column.
    pub fn infer(&self, column: &Column) -> SemanticType {
        self.inference.resolve(column)
    }

    /// Resolve the semantic type of every column.
    pub fn infer_dataset(&self, dataset: &Dataset) -> indexmap::IndexMap<String, SemanticType> {
        self.inference.infer_dataset(dataset)
    }

    /// Check a merge request without running it.
    pub fn validate_merge(&self, dataset: &Dataset, columns: &[String], datetime_mode: bool) -> MergeValidation {
        validate::validate_merge(dataset, columns, datetime_mode, &self.config)
    }

    /// Check a split request without running it.
    pub fn validate_split(&self, dataset: &Dataset, column: &str, separator: &str) -> SplitValidation {
        validate::validate_split(dataset, column, separator, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::schema::Cell;
    use crate::transform::merge::ComponentKind;
    use crate::transform::operations::{MissingPolicy, OnError, OperationKind};

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::from_values("first", ["Ada", "Grace"]),
            Column::new("last", vec![Cell::text("Lovelace"), Cell::Null]),
            Column::from_values("score", ["10", "x"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_successful_operation_is_logged() {
        let engine = TransformEngine::new();
        let mut log = OperationLog::new();
        let options = MergeOptions::new(["first", "last"], " ", "full").with_missing_policy(MissingPolicy::Fail);
        let (out, result) = engine.merge(&sample(), &options, &mut log);

        assert!(result.success);
        assert_eq!(result.operation, OperationKind::Merge);
        assert_eq!(result.new_columns, vec!["full"]);
        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.null_count, 1);
        assert_eq!(out.column_names(), vec!["first", "last", "score", "full"]);
        assert_eq!(log.len(), 1);
        assert_eq!(log.last(), Some(&result));
    }

    #[test]
    fn test_failed_operation_leaves_dataset_untouched() {
        let engine = TransformEngine::new();
        let mut log = OperationLog::new();
        let input = sample();
        let options = ConvertOptions::new("score", SemanticType::Integer).on_error(OnError::Raise);
        let (out, result) = engine.convert(&input, &options, &mut log);

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(FailureKind::Conversion));
        assert_eq!(out, input);
        assert!(log.is_empty());
    }

    #[test]
    fn test_missing_column_is_validation_failure() {
        let engine = TransformEngine::new();
        let mut log = OperationLog::new();
        let (_, result) = engine.split(&sample(), &SplitOptions::new("ghost", ","), &mut log);
        assert_eq!(result.error_kind, Some(FailureKind::Validation));
        assert_eq!(result.error.as_deref(), Some("Columns not found: ghost"));
    }

    #[test]
    fn test_convert_counts() {
        let engine = TransformEngine::new();
        let mut log = OperationLog::new();
        let (out, result) = engine.convert(&sample(), &ConvertOptions::new("score", SemanticType::Integer), &mut log);
        assert!(result.success);
        assert_eq!(result.successful_conversions, 1);
        assert_eq!(result.failed_conversions, 1);
        assert_eq!(out.get(0, "score"), Some(&Cell::Integer(10)));
        assert_eq!(engine.infer(out.column("score").unwrap()), SemanticType::Integer);
    }

    #[test]
    fn test_custom_classifier() {
        fn nothing_is_a_component(_: &str) -> Option<ComponentKind> {
            None
        }
        let ds = Dataset::new(vec![
            Column::from_values("year", ["2024-01-02"]),
            Column::from_values("other", ["2020-05-06 07:08:09"]),
        ])
        .unwrap();
        let engine = TransformEngine::new().with_classifier(nothing_is_a_component);
        let mut log = OperationLog::new();
        let options = MergeOptions::new(["year", "other"], " ", "ts")
            .datetime()
            .with_output_format("%Y-%m-%d %H:%M:%S");
        let (out, result) = engine.merge(&ds, &options, &mut log);
        assert!(result.success);
        assert_eq!(out.get(0, "ts"), Some(&Cell::text("2024-01-02 07:08:09")));
    }

    #[test]
    fn test_pipeline_through_apply() {
        let engine = TransformEngine::with_config(EngineConfig {
            null_marker: "?".to_string(),
            ..EngineConfig::default()
        });
        let mut log = OperationLog::new();
        let ops: Vec<TransformOperation> = vec![
            MergeOptions::new(["first", "last"], "|", "full")
                .with_missing_policy(MissingPolicy::NullString)
                .into(),
            SplitOptions::new("full", "|").with_prefix("part").into(),
        ];

        let mut current = sample();
        for op in &ops {
            let (next, result) = engine.apply(&current, op, &mut log);
            assert!(result.success, "{}", result.summary());
            current = next;
        }
        assert_eq!(current.get(1, "full"), Some(&Cell::text("Grace|?")));
        assert_eq!(current.get(1, "part_2"), Some(&Cell::text("?")));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_detect_and_validate() {
        let engine = TransformEngine::new();
        let ds = Dataset::new(vec![Column::from_values("tags", ["[1, 2]", "[3]"])]).unwrap();
        assert_eq!(engine.detect_json(&ds).len(), 1);
        assert_eq!(engine.infer_dataset(&ds).get("tags"), Some(&SemanticType::List));
        assert!(engine.validate_split(&ds, "tags", ",").valid);
        assert!(!engine.validate_merge(&ds, &["tags".to_string(), "x".to_string()], false).valid);
    }
}
