//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use colwright::{DateComponent, MissingPolicy, OnError, OutputFormat, SemanticType};
use std::path::PathBuf;

/// colwright: column type inference and structural transformations
#[derive(Parser)]
#[command(name = "colwright")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Options for reading the input file.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Path to the data file (CSV/TSV)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Field delimiter (default: auto-detect)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Engine configuration file (JSON)
    #[arg(long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

/// Options shared by every command that writes a transformed file.
#[derive(Args, Debug, Clone)]
pub struct IoArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output path (default: <file>_transformed.<ext>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format: csv, tsv or json (default: from output path or input)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Print the first N transformed rows instead of writing a file
    #[arg(long, value_name = "N")]
    pub preview: Option<usize>,

    /// Save the operation history to this JSON file
    #[arg(long, value_name = "PATH")]
    pub history: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Infer the semantic type of every column
    Infer {
        #[command(flatten)]
        input: InputArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find columns holding JSON-like values
    DetectJson {
        #[command(flatten)]
        input: InputArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Merge several columns into one
    Merge {
        #[command(flatten)]
        io: IoArgs,

        /// Columns to merge, in order (comma-separated)
        #[arg(short, long, required = true, value_delimiter = ',')]
        columns: Vec<String>,

        /// Name of the merged column
        #[arg(short = 'n', long)]
        new_column: String,

        /// Separator; repeat to give one per gap (default: single space)
        #[arg(short, long = "separator")]
        separators: Vec<String>,

        /// Missing-value policy: skip, empty, null_string or fail
        #[arg(long, default_value = "skip")]
        missing: MissingPolicy,

        /// Build datetimes from date-part columns
        #[arg(long)]
        datetime: bool,

        /// strftime pattern for rendering merged datetimes
        #[arg(long, requires = "datetime")]
        output_format: Option<String>,

        /// Only report merge validation, do not transform
        #[arg(long)]
        check: bool,
    },

    /// Split one column into several
    Split {
        #[command(flatten)]
        io: IoArgs,

        /// Column to split
        #[arg(short, long)]
        column: String,

        /// Separator (default: runs of whitespace)
        #[arg(short, long, default_value = "")]
        separator: String,

        /// Prefix for new columns (default: <column>_part)
        #[arg(long)]
        prefix: Option<String>,

        /// Maximum cuts per value (0 = unlimited)
        #[arg(long, default_value = "0")]
        max_splits: i64,

        /// Project datetime components instead of splitting text
        #[arg(long)]
        datetime: bool,

        /// Components to project in datetime mode (comma-separated)
        #[arg(long, value_delimiter = ',', requires = "datetime")]
        components: Vec<DateComponent>,

        /// Only report split validation, do not transform
        #[arg(long)]
        check: bool,
    },

    /// Extract keys from a JSON column into new columns
    Expand {
        #[command(flatten)]
        io: IoArgs,

        /// JSON column to expand
        #[arg(short, long)]
        column: String,

        /// Keys to extract (comma-separated, default: all detected keys)
        #[arg(short, long, value_delimiter = ',')]
        keys: Vec<String>,

        /// One row per element of list values
        #[arg(long)]
        explode: bool,

        /// Prefix for new columns (default: the column name)
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Pack columns into a JSON column
    Collapse {
        #[command(flatten)]
        io: IoArgs,

        /// Columns to pack (comma-separated)
        #[arg(short, long, required = true, value_delimiter = ',')]
        columns: Vec<String>,

        /// Name of the JSON column
        #[arg(short = 'n', long)]
        new_column: String,

        /// Aggregate rows sharing this column's value into one array
        #[arg(long)]
        group_by: Option<String>,

        /// Wrap each row's object in an array
        #[arg(long, conflicts_with = "group_by")]
        as_array: bool,
    },

    /// Convert a column to another semantic type
    Convert {
        #[command(flatten)]
        io: IoArgs,

        /// Column to convert
        #[arg(short, long)]
        column: String,

        /// Target type (int, float, string, bool, datetime, date, time, category, list, dict)
        #[arg(short, long)]
        to: SemanticType,

        /// strftime pattern for temporal targets
        #[arg(long)]
        datetime_format: Option<String>,

        /// Error policy: coerce or raise
        #[arg(long, default_value = "coerce")]
        on_error: OnError,
    },

    /// Apply a pipeline of operations from a JSON file
    Apply {
        #[command(flatten)]
        io: IoArgs,

        /// Pipeline file (JSON array of operations)
        #[arg(short, long, value_name = "PIPELINE")]
        pipeline: PathBuf,
    },
}

/// Parse a single-byte delimiter, accepting `\t` and `tab` for tabs.
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" | "\t" => Ok(b'\t'),
        _ => {
            let bytes = s.as_bytes();
            if bytes.len() == 1 && bytes[0].is_ascii() {
                Ok(bytes[0])
            } else {
                Err(format!("Delimiter must be a single ASCII character, got '{}'", s))
            }
        }
    }
}
