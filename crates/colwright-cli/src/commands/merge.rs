//! Merge command - combine several columns into one.

use colored::Colorize;
use colwright::{MergeOptions, MissingPolicy};

use super::{CommandResult, execute, open_session, print_findings, print_loaded};
use crate::cli::IoArgs;

/// Merge parameters collected from the command line.
pub struct MergeArgs {
    pub columns: Vec<String>,
    pub new_column: String,
    pub separators: Vec<String>,
    pub missing: MissingPolicy,
    pub datetime: bool,
    pub output_format: Option<String>,
}

impl MergeArgs {
    fn into_options(self) -> MergeOptions {
        let separators = if self.separators.is_empty() {
            vec![" ".to_string()]
        } else {
            self.separators
        };
        let mut options = MergeOptions::new(self.columns, " ", self.new_column)
            .with_separators(separators)
            .with_missing_policy(self.missing);
        if self.datetime {
            options = options.datetime();
        }
        if let Some(format) = self.output_format {
            options = options.with_output_format(format);
        }
        options
    }
}

pub fn run(io: IoArgs, args: MergeArgs, check: bool) -> CommandResult {
    if check {
        return run_check(&io, &args);
    }
    execute(&io, &[args.into_options().into()])
}

fn run_check(io: &IoArgs, args: &MergeArgs) -> CommandResult {
    let session = open_session(&io.input)?;
    print_loaded(&io.input.file, &session);

    let validation = session
        .engine()
        .validate_merge(session.dataset(), &args.columns, args.datetime);

    println!();
    for (column, dtype) in &validation.dtype_info {
        println!("  {:24} {}", column, dtype.as_str().cyan());
    }
    print_findings(&validation.warnings, &validation.errors);

    println!();
    if validation.valid {
        println!("{}", "Merge looks valid.".green().bold());
        Ok(())
    } else {
        Err("Merge validation failed".into())
    }
}
