//! Apply command - run a pipeline of operations from a JSON file.

use std::path::PathBuf;

use colored::Colorize;
use colwright::load_pipeline;

use super::{CommandResult, execute};
use crate::cli::IoArgs;

pub fn run(io: IoArgs, pipeline: PathBuf) -> CommandResult {
    if !pipeline.exists() {
        return Err(format!("Pipeline file not found: {}", pipeline.display()).into());
    }

    let operations = load_pipeline(&pipeline)?;
    if operations.is_empty() {
        println!("{} Pipeline has no operations.", "Warning:".yellow().bold());
        return Ok(());
    }

    println!(
        "{} {} operation(s) from {}",
        "Applying".cyan().bold(),
        operations.len().to_string().white().bold(),
        pipeline.display()
    );
    for (i, operation) in operations.iter().enumerate() {
        tracing::debug!(step = i + 1, operation = %operation.description(), "Pipeline step");
    }

    execute(&io, &operations)
}
