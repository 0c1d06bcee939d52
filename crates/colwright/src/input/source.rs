//! Source metadata and per-column typing of imported text.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{Cell, Column};

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Delimiter used to read the file.
    pub delimiter: char,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been loaded.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        delimiter: u8,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            delimiter: char::from(delimiter),
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}

/// Check if a value represents a missing/null value.
pub fn is_null_value(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nil")
        || trimmed == "."
        || trimmed == "-"
}

fn parse_bool(value: &str) -> Option<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn integer_cell(value: &str) -> Cell {
    value.trim().parse::<i64>().map_or(Cell::Null, Cell::Integer)
}

fn float_cell(value: &str) -> Cell {
    value.trim().parse::<f64>().map_or(Cell::Null, Cell::Float)
}

fn boolean_cell(value: &str) -> Cell {
    parse_bool(value).map_or(Cell::Null, Cell::Boolean)
}

fn text_cell(value: &str) -> Cell {
    Cell::Text(value.to_string())
}

/// Build a column from raw text values, picking the narrowest scalar type
/// every non-null value fits: integer, then float, then boolean, then text.
///
/// Dates and JSON stay text; recognising them is left to inference and
/// conversion.
pub fn typed_column(name: impl Into<String>, values: Vec<String>) -> Column {
    let present: Vec<&str> = values
        .iter()
        .map(String::as_str)
        .filter(|v| !is_null_value(v))
        .collect();

    let all = |f: fn(&str) -> bool| !present.is_empty() && present.iter().all(|&v| f(v));

    let convert: fn(&str) -> Cell = if all(|v| v.trim().parse::<i64>().is_ok()) {
        integer_cell
    } else if all(|v| v.trim().parse::<f64>().is_ok()) {
        float_cell
    } else if all(|v| parse_bool(v).is_some()) {
        boolean_cell
    } else {
        text_cell
    };

    let cells = values
        .iter()
        .map(|v| if is_null_value(v) { Cell::Null } else { convert(v) })
        .collect();
    Column::new(name, cells)
}
