//! Input parsing and data source handling.

mod parser;
mod source;

pub use parser::{Parser, ParserConfig, detect_delimiter};
pub use source::{SourceMetadata, is_null_value, typed_column};
