//! CSV/TSV parser with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{ColwrightError, Result};
use crate::schema::Dataset;

use super::source::{SourceMetadata, typed_column};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Reads delimited text files into typed datasets.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the dataset and its source metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();
        let io_err = |e| ColwrightError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        let mut file = File::open(path).map_err(io_err)?;
        let size_bytes = file.metadata().map_err(io_err)?.len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(io_err)?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let dataset = self.parse_bytes(&contents, delimiter)?;
        debug!(
            path = %path.display(),
            delimiter = %char::from(delimiter).escape_default(),
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "parsed file"
        );

        let source = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            delimiter,
            dataset.row_count(),
            dataset.column_count(),
        );

        Ok((dataset, source))
    }

    /// Parse in-memory text, detecting the delimiter unless configured.
    pub fn parse_str(&self, text: &str) -> Result<Dataset> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(text.as_bytes())?,
        };
        self.parse_bytes(text.as_bytes(), delimiter)
    }

    fn reader<'a>(&self, bytes: &'a [u8], delimiter: u8) -> csv::Reader<&'a [u8]> {
        csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes)
    }

    fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = self.reader(bytes, delimiter);

        let headers: Vec<String> = if self.config.has_header {
            reader
                .headers()?
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    let h = h.trim();
                    if h.is_empty() {
                        format!("column_{}", i + 1)
                    } else {
                        h.to_string()
                    }
                })
                .collect()
        } else {
            match reader.records().next() {
                Some(Ok(record)) => (0..record.len()).map(|i| format!("column_{}", i + 1)).collect(),
                Some(Err(e)) => return Err(e.into()),
                None => return Err(ColwrightError::EmptyData("No data rows found".to_string())),
            }
        };

        if headers.is_empty() {
            return Err(ColwrightError::EmptyData("No columns found".to_string()));
        }

        // Re-read from the start; the header-less branch consumed a record.
        let mut reader = self.reader(bytes, delimiter);
        let expected_cols = headers.len();
        let mut values: Vec<Vec<String>> = vec![Vec::new(); expected_cols];
        let mut row_count = 0;

        for (row_idx, result) in reader.records().enumerate() {
            if self.config.max_rows.is_some_and(|max| row_idx >= max) {
                break;
            }
            let record = result?;
            for (col, column_values) in values.iter_mut().enumerate() {
                column_values.push(record.get(col).unwrap_or("").to_string());
            }
            row_count += 1;
        }

        if row_count == 0 {
            return Err(ColwrightError::EmptyData("No data rows found".to_string()));
        }

        let columns = headers
            .into_iter()
            .zip(values)
            .map(|(name, raw)| typed_column(name, raw))
            .collect();
        Dataset::new(columns)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the delimiter by analyzing the first few lines.
pub fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(ColwrightError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tabs get a small bonus.
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Cell;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_ignores_quoted_delimiters() {
        let data = b"name;tags\n\"x\";\"a,b,c\"\n\"y\";\"d\"";
        assert_eq!(detect_delimiter(data).unwrap(), b';');
    }

    #[test]
    fn test_parse_str_types_columns() {
        let parser = Parser::new();
        let ds = parser.parse_str("name,age,score\nAlice,30,1.5\nBob,,2").unwrap();

        assert_eq!(ds.column_names(), vec!["name", "age", "score"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.get(0, "name"), Some(&Cell::text("Alice")));
        assert_eq!(ds.get(0, "age"), Some(&Cell::Integer(30)));
        assert_eq!(ds.get(1, "age"), Some(&Cell::Null));
        assert_eq!(ds.get(1, "score"), Some(&Cell::Float(2.0)));
    }

    #[test]
    fn test_parse_pads_short_rows() {
        let ds = Parser::new().parse_str("a,b,c\n1,2\n3,4,5").unwrap();
        assert_eq!(ds.get(0, "c"), Some(&Cell::Null));
        assert_eq!(ds.get(1, "c"), Some(&Cell::Integer(5)));
    }

    #[test]
    fn test_parse_without_header() {
        let parser = Parser::with_config(ParserConfig {
            has_header: false,
            delimiter: Some(b','),
            ..ParserConfig::default()
        });
        let ds = parser.parse_str("x,1\ny,2").unwrap();
        assert_eq!(ds.column_names(), vec!["column_1", "column_2"]);
        assert_eq!(ds.row_count(), 2);
    }

    #[test]
    fn test_max_rows() {
        let parser = Parser::with_config(ParserConfig {
            max_rows: Some(1),
            ..ParserConfig::default()
        });
        let ds = parser.parse_str("a,b\n1,2\n3,4").unwrap();
        assert_eq!(ds.row_count(), 1);
    }

    #[test]
    fn test_header_only_is_empty() {
        let result = Parser::new().parse_str("a,b\n");
        assert!(matches!(result, Err(ColwrightError::EmptyData(_))));
    }
}
