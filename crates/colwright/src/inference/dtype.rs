//! Semantic type inference for whole columns.

use indexmap::IndexMap;

use crate::literal::{is_json_like, parse_structured};
use crate::schema::{Cell, Column, Dataset, SemanticType, Storage};
use crate::temporal::looks_like_temporal;

/// Classifies columns into semantic types.
///
/// Typed storage maps straight to its semantic type. Generic storage is
/// decided by the first non-null value alone; later rows are never consulted,
/// so a column that starts with a date string and continues with free text is
/// reported as `datetime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeInferenceEngine;

impl TypeInferenceEngine {
    /// Create a new inference engine.
    pub fn new() -> Self {
        Self
    }

    /// Infer the semantic type of a column, ignoring any caller override.
    pub fn infer(&self, column: &Column) -> SemanticType {
        let Some(first) = column.first_non_null() else {
            return SemanticType::Object;
        };

        match column.storage() {
            Storage::Boolean => SemanticType::Boolean,
            Storage::Integer => SemanticType::Integer,
            Storage::Float => SemanticType::Float,
            Storage::Categorical => SemanticType::Categorical,
            Storage::DateTime => SemanticType::DateTime,
            Storage::Date => SemanticType::Date,
            Storage::Time => SemanticType::Time,
            Storage::Generic => self.infer_from_sample(first),
        }
    }

    /// The caller override when present, otherwise the inferred type.
    pub fn resolve(&self, column: &Column) -> SemanticType {
        column
            .semantic_override()
            .unwrap_or_else(|| self.infer(column))
    }

    /// Resolve every column of a dataset, in column order.
    pub fn infer_dataset(&self, dataset: &Dataset) -> IndexMap<String, SemanticType> {
        dataset
            .columns()
            .iter()
            .map(|c| (c.name.clone(), self.resolve(c)))
            .collect()
    }

    /// Classify a single value from a generic-storage column.
    fn infer_from_sample(&self, sample: &Cell) -> SemanticType {
        match sample {
            Cell::List(_) => SemanticType::List,
            Cell::Map(_) => SemanticType::Dictionary,
            Cell::Text(text) => {
                if is_json_like(text) {
                    match parse_structured(text) {
                        Some(Cell::List(_)) => return SemanticType::List,
                        Some(Cell::Map(_)) => return SemanticType::Dictionary,
                        _ => {}
                    }
                }
                if looks_like_temporal(text) {
                    SemanticType::DateTime
                } else {
                    SemanticType::String
                }
            }
            _ => SemanticType::String,
        }
    }
}
