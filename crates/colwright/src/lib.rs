//! colwright: column type inference and structural transformations for
//! tabular datasets.
//!
//! colwright decides what each column of a dataset holds and reshapes
//! columns on request: merging several into one, splitting one into several,
//! pulling keys out of JSON-like values and packing columns back into JSON,
//! and converting columns between semantic types.
//!
//! # Core Principles
//!
//! - **Non-destructive**: every operation returns a new dataset
//! - **Contained failures**: a rejected operation returns its input unchanged
//!   together with a failed [`OperationResult`]
//! - **Auditable**: successful operations are recorded in an [`OperationLog`]
//!
//! # Example
//!
//! ```
//! use colwright::{Cell, Column, Dataset, MergeOptions, OperationLog, TransformEngine};
//!
//! let dataset = Dataset::new(vec![
//!     Column::from_values("first", ["Ada"]),
//!     Column::from_values("last", ["Lovelace"]),
//! ])
//! .unwrap();
//!
//! let engine = TransformEngine::new();
//! let mut log = OperationLog::new();
//! let (merged, result) = engine.merge(
//!     &dataset,
//!     &MergeOptions::new(["first", "last"], " ", "name"),
//!     &mut log,
//! );
//!
//! assert!(result.success);
//! assert_eq!(merged.get(0, "name"), Some(&Cell::text("Ada Lovelace")));
//! ```

pub mod config;
pub mod error;
pub mod inference;
pub mod input;
pub mod literal;
pub mod output;
pub mod schema;
pub mod temporal;
pub mod transform;

mod session;

pub use config::EngineConfig;
pub use error::{ColwrightError, FailureKind, Result};
pub use inference::TypeInferenceEngine;
pub use input::{Parser, ParserConfig, SourceMetadata};
pub use output::OutputFormat;
pub use schema::{Cell, Column, Dataset, SemanticType, Storage};
pub use session::{Session, load_pipeline};
pub use transform::{
    CollapseOptions, ComponentKind, ConvertOptions, DateComponent, ExpandOptions, JsonColumnInfo, MergeOptions,
    MergeValidation, MissingPolicy, OnError, OperationKind, OperationLog, OperationResult, SplitOptions,
    SplitValidation, TransformEngine, TransformOperation,
};
