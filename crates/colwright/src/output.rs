//! Writing datasets back out as CSV, TSV or JSON.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{ColwrightError, Result};
use crate::schema::Dataset;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    /// Array of row objects.
    Json,
}

impl OutputFormat {
    /// Guess the format from a file extension, defaulting to CSV.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("tsv") | Some("tab") => OutputFormat::Tsv,
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Csv,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Tsv => write!(f, "tsv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ColwrightError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" | "tab" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            other => Err(ColwrightError::Validation(format!(
                "Unknown output format '{}'. Use csv, tsv or json.",
                other
            ))),
        }
    }
}

/// Write a dataset to `path` in the given format.
pub fn write_file(dataset: &Dataset, path: impl AsRef<Path>, format: OutputFormat) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| ColwrightError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    write_to(dataset, &mut writer, format)?;
    writer.flush().map_err(|e| ColwrightError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write a dataset to any writer.
pub fn write_to<W: Write>(dataset: &Dataset, writer: W, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => write_delimited(dataset, writer, b','),
        OutputFormat::Tsv => write_delimited(dataset, writer, b'\t'),
        OutputFormat::Json => write_json(dataset, writer),
    }
}

/// Write a header row and one record per row. Nulls are empty fields and
/// lists or maps are written as compact JSON.
pub fn write_delimited<W: Write>(dataset: &Dataset, writer: W, delimiter: u8) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().delimiter(delimiter).from_writer(writer);
    csv_writer.write_record(dataset.column_names())?;
    for row in 0..dataset.row_count() {
        let record: Vec<String> = dataset
            .columns()
            .iter()
            .map(|c| c.cells[row].to_string())
            .collect();
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush().map_err(|e| ColwrightError::Csv(e.into()))?;
    Ok(())
}

/// Write the dataset as a pretty-printed JSON array of row objects.
pub fn write_json<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let rows: Vec<Value> = (0..dataset.row_count())
        .map(|row| {
            let mut object = Map::with_capacity(dataset.column_count());
            for column in dataset.columns() {
                object.insert(column.name.clone(), column.cells[row].to_json());
            }
            Value::Object(object)
        })
        .collect();
    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}
