//! CLI command implementations and the helpers they share.

pub mod apply;
pub mod collapse;
pub mod convert;
pub mod detect_json;
pub mod expand;
pub mod infer;
pub mod merge;
pub mod split;

use std::path::{Path, PathBuf};

use colored::Colorize;
use colwright::output::{self, OutputFormat};
use colwright::{EngineConfig, OperationResult, ParserConfig, Session, TransformEngine, TransformOperation};

use crate::cli::{InputArgs, IoArgs};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load the input file into a session configured from the command line.
pub fn open_session(input: &InputArgs) -> Result<Session, Box<dyn std::error::Error>> {
    if !input.file.exists() {
        return Err(format!("File not found: {}", input.file.display()).into());
    }

    let engine = match &input.config {
        Some(path) => TransformEngine::with_config(EngineConfig::load(path)?),
        None => TransformEngine::new(),
    };
    let parser = ParserConfig {
        delimiter: input.delimiter,
        ..ParserConfig::default()
    };

    Ok(Session::open(&input.file, parser, engine)?)
}

/// Print the banner for a freshly loaded file.
pub fn print_loaded(file: &Path, session: &Session) {
    println!(
        "{} {} ({} rows, {} columns)",
        "Loaded".cyan().bold(),
        file.display().to_string().white(),
        session.dataset().row_count(),
        session.dataset().column_count()
    );
}

/// Apply `operations` in order, then preview or write the result.
///
/// Stops at the first failed operation; nothing is written in that case.
pub fn execute(io: &IoArgs, operations: &[TransformOperation]) -> CommandResult {
    let mut session = open_session(&io.input)?;
    print_loaded(&io.input.file, &session);

    if let Some(rows) = io.preview {
        let engine = session.engine().clone();
        session = Session::with_engine(session.dataset().head(rows), engine);
    }

    for result in session.apply_all(operations) {
        report(&result)?;
    }

    if let Some(path) = &io.history {
        session.log().save(path)?;
        println!(
            "{} {}",
            "History saved to".green().bold(),
            path.display().to_string().white()
        );
    }

    if io.preview.is_some() {
        println!();
        let format = io.format.unwrap_or(OutputFormat::Tsv);
        output::write_to(session.dataset(), std::io::stdout().lock(), format)?;
        return Ok(());
    }

    let source_format = session.source().map(|s| s.format.clone());
    let (path, format) = output_target(
        &io.input.file,
        io.output.as_deref(),
        io.format,
        source_format.as_deref(),
    );
    output::write_file(session.dataset(), &path, format)?;

    println!();
    println!(
        "{} {} ({})",
        "Saved to".green().bold(),
        path.display().to_string().white(),
        format
    );
    Ok(())
}

/// Print one operation result, turning a failure into an error.
pub fn report(result: &OperationResult) -> CommandResult {
    if !result.success {
        return Err(result.summary().into());
    }

    println!("{} {}", "Applied".green().bold(), result.summary());
    if !result.new_columns.is_empty() {
        println!("  new columns: {}", result.new_columns.join(", ").cyan());
    }
    if result.rows_after != result.rows_before {
        println!("  rows: {} -> {}", result.rows_before, result.rows_after);
    }
    if result.failed_conversions > 0 {
        println!(
            "  {} values could not be converted and are now null",
            result.failed_conversions.to_string().yellow()
        );
    }
    Ok(())
}

/// Resolve the output path and format.
///
/// An explicit format wins, then the output path's extension, then the
/// input's own format. Without an output path the file lands next to the
/// input as `<stem>_transformed.<ext>`.
pub fn output_target(
    input: &Path,
    output: Option<&Path>,
    format: Option<OutputFormat>,
    source_format: Option<&str>,
) -> (PathBuf, OutputFormat) {
    let source_format = match source_format {
        Some("tsv") => OutputFormat::Tsv,
        _ => OutputFormat::Csv,
    };

    match output {
        Some(path) => {
            let format = format.unwrap_or_else(|| {
                if path.extension().is_some() {
                    OutputFormat::from_path(path)
                } else {
                    source_format
                }
            });
            (path.to_path_buf(), format)
        }
        None => {
            let format = format.unwrap_or(source_format);
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            let path = input.with_file_name(format!("{}_transformed.{}", stem, format));
            (path, format)
        }
    }
}

/// Print validation warnings and errors in a uniform layout.
pub fn print_findings(warnings: &[String], errors: &[String]) {
    for error in errors {
        println!("  {} {}", "error:".red().bold(), error);
    }
    for warning in warnings {
        println!("  {} {}", "warning:".yellow().bold(), warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn test_default_output_keeps_input_format() {
        let (path, format) = output_target(Path::new("/data/visits.tsv"), None, None, Some("tsv"));
        assert_eq!(path, PathBuf::from("/data/visits_transformed.tsv"));
        assert_eq!(format, OutputFormat::Tsv);
    }

    #[test]
    fn test_explicit_format_wins() {
        let (path, format) = output_target(
            Path::new("/data/visits.csv"),
            Some(Path::new("/tmp/out.tsv")),
            Some(OutputFormat::Json),
            Some("csv"),
        );
        assert_eq!(path, PathBuf::from("/tmp/out.tsv"));
        assert_eq!(format, OutputFormat::Json);

        let (path, format) = output_target(Path::new("/data/visits.csv"), None, Some(OutputFormat::Json), None);
        assert_eq!(path, PathBuf::from("/data/visits_transformed.json"));
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn test_output_extension_sets_format() {
        let (_, format) = output_target(Path::new("a.csv"), Some(Path::new("b.json")), None, Some("csv"));
        assert_eq!(format, OutputFormat::Json);

        let (_, format) = output_target(Path::new("a.tsv"), Some(Path::new("b")), None, Some("tsv"));
        assert_eq!(format, OutputFormat::Tsv);
    }

    #[test]
    fn test_missing_file_is_error() {
        let input = InputArgs {
            file: PathBuf::from("/nonexistent/data.csv"),
            delimiter: None,
            config: None,
        };
        assert!(open_session(&input).is_err());
    }

    #[test]
    fn test_execute_writes_transformed_file() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        file.write_all(b"first,last\nAda,Lovelace\n").unwrap();
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let history = dir.path().join("history.json");

        let io = IoArgs {
            input: InputArgs {
                file: file.path().to_path_buf(),
                delimiter: None,
                config: None,
            },
            output: Some(out.clone()),
            format: None,
            preview: None,
            history: Some(history.clone()),
        };
        let op: TransformOperation = colwright::MergeOptions::new(["first", "last"], " ", "name").into();
        execute(&io, &[op]).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert!(written.starts_with("first,last,name"));
        assert!(written.contains("Ada Lovelace"));
        assert_eq!(colwright::OperationLog::load(&history).unwrap().len(), 1);
    }

    #[test]
    fn test_execute_stops_on_failure() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        file.write_all(b"a\n1\n").unwrap();
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.csv");

        let io = IoArgs {
            input: InputArgs {
                file: file.path().to_path_buf(),
                delimiter: None,
                config: None,
            },
            output: Some(out.clone()),
            format: None,
            preview: None,
            history: None,
        };
        let op: TransformOperation = colwright::SplitOptions::new("missing", ",").into();
        let err = execute(&io, &[op]).unwrap_err();
        assert!(err.to_string().contains("missing"));
        assert!(!out.exists());
    }
}
