//! Column semantic type inference.

mod dtype;

pub use dtype::TypeInferenceEngine;
