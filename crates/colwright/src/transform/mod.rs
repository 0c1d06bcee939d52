//! Structural transformations: merge, split, JSON expand/collapse and type
//! conversion, all applied through [`TransformEngine`].

mod convert;
mod engine;
mod json;
mod log;
mod merge;
mod operations;
mod split;
mod validate;

pub use convert::convert_cell;
pub use engine::TransformEngine;
pub use json::JsonColumnInfo;
pub use log::{OperationLog, OperationResult};
pub use merge::{ComponentClassifier, ComponentKind, classify_component};
pub use operations::{
    CollapseOptions, ConvertOptions, DateComponent, ExpandOptions, MergeOptions, MissingPolicy, OnError,
    OperationKind, SplitOptions, TransformOperation,
};
pub use split::{project, split_value};
pub use validate::{MergeValidation, SplitValidation};
