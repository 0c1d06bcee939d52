//! Transformation operations and their parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColwrightError;
use crate::schema::{Dataset, SemanticType};

/// How a generic merge treats missing source values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Leave the value out of the join; an all-missing row stays Null.
    #[default]
    Skip,
    /// Join an empty string in its place.
    Empty,
    /// Join the configured null marker (`"NULL"` by default).
    NullString,
    /// Make the whole merged cell Null.
    Fail,
}

impl FromStr for MissingPolicy {
    type Err = ColwrightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "skip" => Ok(MissingPolicy::Skip),
            "empty" => Ok(MissingPolicy::Empty),
            "null_string" | "null" => Ok(MissingPolicy::NullString),
            "fail" => Ok(MissingPolicy::Fail),
            other => Err(ColwrightError::Validation(format!(
                "Unknown missing-value policy '{}'. Use skip, empty, null_string or fail.",
                other
            ))),
        }
    }
}

/// What a conversion does with a value it cannot convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    /// Replace the value with Null and keep going.
    #[default]
    Coerce,
    /// Abort the whole conversion.
    Raise,
}

impl FromStr for OnError {
    type Err = ColwrightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coerce" => Ok(OnError::Coerce),
            "raise" => Ok(OnError::Raise),
            other => Err(ColwrightError::Validation(format!(
                "Unknown error policy '{}'. Use coerce or raise.",
                other
            ))),
        }
    }
}

/// A component that can be projected out of a datetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateComponent {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    /// Day of week, Monday = 0.
    Weekday,
    /// ISO week number.
    Week,
    Quarter,
    #[serde(rename = "dayofyear", alias = "day_of_year")]
    DayOfYear,
    Date,
    Time,
}

impl DateComponent {
    /// Components projected when the caller does not pick any.
    pub const DEFAULT: [DateComponent; 3] = [DateComponent::Year, DateComponent::Month, DateComponent::Day];

    /// Name of the column produced for this component.
    pub fn as_str(&self) -> &'static str {
        match self {
            DateComponent::Year => "year",
            DateComponent::Month => "month",
            DateComponent::Day => "day",
            DateComponent::Hour => "hour",
            DateComponent::Minute => "minute",
            DateComponent::Second => "second",
            DateComponent::Weekday => "weekday",
            DateComponent::Week => "week",
            DateComponent::Quarter => "quarter",
            DateComponent::DayOfYear => "dayofyear",
            DateComponent::Date => "date",
            DateComponent::Time => "time",
        }
    }
}

impl fmt::Display for DateComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateComponent {
    type Err = ColwrightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "year" => Ok(DateComponent::Year),
            "month" => Ok(DateComponent::Month),
            "day" => Ok(DateComponent::Day),
            "hour" => Ok(DateComponent::Hour),
            "minute" => Ok(DateComponent::Minute),
            "second" => Ok(DateComponent::Second),
            "weekday" => Ok(DateComponent::Weekday),
            "week" => Ok(DateComponent::Week),
            "quarter" => Ok(DateComponent::Quarter),
            "dayofyear" => Ok(DateComponent::DayOfYear),
            "date" => Ok(DateComponent::Date),
            "time" => Ok(DateComponent::Time),
            other => Err(ColwrightError::Validation(format!(
                "Unknown datetime component '{}'",
                other
            ))),
        }
    }
}

/// Parameters for merging several columns into one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Source columns, in join order (at least two).
    pub columns: Vec<String>,
    /// One separator per gap, or a single separator used for every gap.
    pub separators: Vec<String>,
    /// Name of the merged column.
    pub new_column: String,
    /// Treatment of missing values in generic mode.
    #[serde(default)]
    pub missing_policy: MissingPolicy,
    /// Build datetimes from component columns instead of joining text.
    #[serde(default)]
    pub datetime_mode: bool,
    /// Render merged datetimes to text with this strftime pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

impl MergeOptions {
    /// Generic merge of `columns` joined by `separator`.
    pub fn new<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        separator: impl Into<String>,
        new_column: impl Into<String>,
    ) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            separators: vec![separator.into()],
            new_column: new_column.into(),
            missing_policy: MissingPolicy::default(),
            datetime_mode: false,
            output_format: None,
        }
    }

    /// Use one separator per gap.
    pub fn with_separators<S: Into<String>>(mut self, separators: impl IntoIterator<Item = S>) -> Self {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Set the missing-value policy.
    pub fn with_missing_policy(mut self, policy: MissingPolicy) -> Self {
        self.missing_policy = policy;
        self
    }

    /// Switch to datetime-aware merging.
    pub fn datetime(mut self) -> Self {
        self.datetime_mode = true;
        self
    }

    /// Render the merged datetime with a strftime pattern.
    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = Some(format.into());
        self
    }
}

/// Parameters for splitting one column into several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    /// Source column.
    pub column: String,
    /// Separator; empty splits on runs of whitespace.
    #[serde(default)]
    pub separator: String,
    /// Prefix for generated columns (default `<column>_part`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Maximum number of cuts; zero or negative means unlimited.
    #[serde(default = "unlimited_splits")]
    pub max_splits: i64,
    /// Project datetime components instead of splitting text.
    #[serde(default)]
    pub datetime_mode: bool,
    /// Components to project in datetime mode (default year, month, day).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<DateComponent>>,
}

fn unlimited_splits() -> i64 {
    -1
}

impl SplitOptions {
    /// Generic split of `column` on `separator`.
    pub fn new(column: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            separator: separator.into(),
            prefix: None,
            max_splits: unlimited_splits(),
            datetime_mode: false,
            components: None,
        }
    }

    /// Datetime split projecting `components`.
    pub fn datetime(column: impl Into<String>, components: impl IntoIterator<Item = DateComponent>) -> Self {
        Self {
            datetime_mode: true,
            components: Some(components.into_iter().collect()),
            ..Self::new(column, "")
        }
    }

    /// Set the prefix for generated columns.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Limit the number of cuts per value.
    pub fn with_max_splits(mut self, max_splits: i64) -> Self {
        self.max_splits = max_splits;
        self
    }

    /// The cut limit, `None` when unlimited.
    pub fn split_limit(&self) -> Option<usize> {
        usize::try_from(self.max_splits).ok().filter(|&n| n > 0)
    }
}

/// Parameters for extracting keys out of a JSON column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandOptions {
    /// Column holding JSON values.
    pub column: String,
    /// Keys to extract, one new column each.
    pub keys: Vec<String>,
    /// Turn list values into one row per element.
    #[serde(default)]
    pub explode_arrays: bool,
    /// Prefix for generated columns (default the column name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl ExpandOptions {
    /// Extract `keys` from `column` without exploding.
    pub fn new<S: Into<String>>(column: impl Into<String>, keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            column: column.into(),
            keys: keys.into_iter().map(Into::into).collect(),
            explode_arrays: false,
            prefix: None,
        }
    }

    /// Explode list values into rows.
    pub fn exploding(mut self) -> Self {
        self.explode_arrays = true;
        self
    }

    /// Set the prefix for generated columns.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// Parameters for packing columns into a JSON column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollapseOptions {
    /// Columns packed into each object.
    pub columns: Vec<String>,
    /// Name of the JSON column.
    pub new_column: String,
    /// Aggregate rows sharing this column's value into one array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    /// Wrap each row's object in a singleton array.
    #[serde(default)]
    pub as_array: bool,
}

impl CollapseOptions {
    /// Pack `columns` row by row into `new_column`.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>, new_column: impl Into<String>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            new_column: new_column.into(),
            group_by: None,
            as_array: false,
        }
    }

    /// Aggregate by the values of `column`.
    pub fn grouped_by(mut self, column: impl Into<String>) -> Self {
        self.group_by = Some(column.into());
        self
    }

    /// Wrap row objects in arrays.
    pub fn as_array(mut self) -> Self {
        self.as_array = true;
        self
    }
}

/// Parameters for converting a column to another semantic type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Column to convert in place.
    pub column: String,
    /// Target semantic type.
    pub target: SemanticType,
    /// Explicit strftime pattern for temporal targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime_format: Option<String>,
    /// Policy for values that cannot be converted.
    #[serde(default)]
    pub on_error: OnError,
}

impl ConvertOptions {
    /// Convert `column` to `target`, coercing failures to Null.
    pub fn new(column: impl Into<String>, target: SemanticType) -> Self {
        Self {
            column: column.into(),
            target,
            datetime_format: None,
            on_error: OnError::default(),
        }
    }

    /// Parse temporal text with an explicit pattern.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = Some(format.into());
        self
    }

    /// Set the error policy.
    pub fn on_error(mut self, on_error: OnError) -> Self {
        self.on_error = on_error;
        self
    }
}

/// Kind of operation recorded in a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Merge,
    Split,
    ExpandJson,
    CollapseJson,
    ConvertDtype,
}

impl OperationKind {
    /// Get a human-readable label for the operation kind.
    pub fn label(&self) -> &'static str {
        match self {
            OperationKind::Merge => "Merge",
            OperationKind::Split => "Split",
            OperationKind::ExpandJson => "Expand JSON",
            OperationKind::CollapseJson => "Columns to JSON",
            OperationKind::ConvertDtype => "Convert type",
        }
    }
}

/// A transformation to apply to a dataset.
///
/// This is also the serialized form of operation pipelines, so field names
/// are part of the configuration format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum TransformOperation {
    Merge(MergeOptions),
    Split(SplitOptions),
    ExpandJson(ExpandOptions),
    CollapseJson(CollapseOptions),
    Convert(ConvertOptions),
}

impl TransformOperation {
    /// The kind recorded in results.
    pub fn kind(&self) -> OperationKind {
        match self {
            TransformOperation::Merge(_) => OperationKind::Merge,
            TransformOperation::Split(_) => OperationKind::Split,
            TransformOperation::ExpandJson(_) => OperationKind::ExpandJson,
            TransformOperation::CollapseJson(_) => OperationKind::CollapseJson,
            TransformOperation::Convert(_) => OperationKind::ConvertDtype,
        }
    }

    /// Columns the operation reads.
    pub fn source_columns(&self) -> Vec<String> {
        match self {
            TransformOperation::Merge(o) => o.columns.clone(),
            TransformOperation::Split(o) => vec![o.column.clone()],
            TransformOperation::ExpandJson(o) => vec![o.column.clone()],
            TransformOperation::CollapseJson(o) => {
                let mut cols = o.columns.clone();
                if let Some(group) = &o.group_by {
                    if !cols.contains(group) {
                        cols.push(group.clone());
                    }
                }
                cols
            }
            TransformOperation::Convert(o) => vec![o.column.clone()],
        }
    }

    /// Get a human-readable description of the operation.
    pub fn description(&self) -> String {
        match self {
            TransformOperation::Merge(o) => {
                let mode = if o.datetime_mode { " as datetime" } else { "" };
                format!("Merge {:?} into '{}'{}", o.columns, o.new_column, mode)
            }
            TransformOperation::Split(o) => {
                if o.datetime_mode {
                    let components: Vec<&str> = o
                        .components
                        .as_deref()
                        .unwrap_or(&DateComponent::DEFAULT)
                        .iter()
                        .map(DateComponent::as_str)
                        .collect();
                    format!("Split datetime '{}' into {:?}", o.column, components)
                } else if o.separator.is_empty() {
                    format!("Split '{}' on whitespace", o.column)
                } else {
                    format!("Split '{}' on '{}'", o.column, o.separator)
                }
            }
            TransformOperation::ExpandJson(o) => {
                let explode = if o.explode_arrays { " (exploding arrays)" } else { "" };
                format!("Expand keys {:?} from '{}'{}", o.keys, o.column, explode)
            }
            TransformOperation::CollapseJson(o) => match &o.group_by {
                Some(group) => format!(
                    "Collapse {:?} into '{}' grouped by '{}'",
                    o.columns, o.new_column, group
                ),
                None => format!("Collapse {:?} into '{}'", o.columns, o.new_column),
            },
            TransformOperation::Convert(o) => {
                format!("Convert '{}' to {}", o.column, o.target)
            }
        }
    }
}

impl From<MergeOptions> for TransformOperation {
    fn from(options: MergeOptions) -> Self {
        TransformOperation::Merge(options)
    }
}

impl From<SplitOptions> for TransformOperation {
    fn from(options: SplitOptions) -> Self {
        TransformOperation::Split(options)
    }
}

impl From<ExpandOptions> for TransformOperation {
    fn from(options: ExpandOptions) -> Self {
        TransformOperation::ExpandJson(options)
    }
}

impl From<CollapseOptions> for TransformOperation {
    fn from(options: CollapseOptions) -> Self {
        TransformOperation::CollapseJson(options)
    }
}

impl From<ConvertOptions> for TransformOperation {
    fn from(options: ConvertOptions) -> Self {
        TransformOperation::Convert(options)
    }
}

/// Output of a successful transformation, before it becomes a result record.
#[derive(Debug, Clone)]
pub(crate) struct Applied {
    pub dataset: Dataset,
    pub new_columns: Vec<String>,
    pub rows_affected: usize,
    pub null_count: usize,
    pub successful_conversions: usize,
    pub failed_conversions: usize,
}

impl Applied {
    pub fn new(dataset: Dataset, new_columns: Vec<String>) -> Self {
        let rows_affected = dataset.row_count();
        Self {
            dataset,
            new_columns,
            rows_affected,
            null_count: 0,
            successful_conversions: 0,
            failed_conversions: 0,
        }
    }
}
