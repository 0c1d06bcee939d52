//! Split command - break one column into several.

use colored::Colorize;
use colwright::{DateComponent, SplitOptions};

use super::{CommandResult, execute, open_session, print_findings, print_loaded};
use crate::cli::IoArgs;

/// Split parameters collected from the command line.
pub struct SplitArgs {
    pub column: String,
    pub separator: String,
    pub prefix: Option<String>,
    pub max_splits: i64,
    pub datetime: bool,
    pub components: Vec<DateComponent>,
}

impl SplitArgs {
    fn into_options(self) -> SplitOptions {
        let mut options = if self.datetime {
            let components = if self.components.is_empty() {
                DateComponent::DEFAULT.to_vec()
            } else {
                self.components
            };
            SplitOptions::datetime(self.column, components)
        } else {
            SplitOptions::new(self.column, self.separator).with_max_splits(self.max_splits)
        };
        if let Some(prefix) = self.prefix {
            options = options.with_prefix(prefix);
        }
        options
    }
}

pub fn run(io: IoArgs, args: SplitArgs, check: bool) -> CommandResult {
    if check {
        return run_check(&io, &args);
    }
    execute(&io, &[args.into_options().into()])
}

fn run_check(io: &IoArgs, args: &SplitArgs) -> CommandResult {
    let session = open_session(&io.input)?;
    print_loaded(&io.input.file, &session);

    let validation = session
        .engine()
        .validate_split(session.dataset(), &args.column, &args.separator);

    println!();
    if !validation.preview.is_empty() {
        println!("{}", "Preview:".yellow().bold());
        for parts in &validation.preview {
            println!("  {}", parts.join(" | "));
        }
        println!(
            "Estimated columns: {}",
            validation.estimated_columns.to_string().white().bold()
        );
    }
    print_findings(&validation.warnings, &validation.errors);

    println!();
    if validation.valid {
        println!("{}", "Split looks valid.".green().bold());
        Ok(())
    } else {
        Err("Split validation failed".into())
    }
}
