//! Detect-json command - find columns holding JSON-like values.

use colored::Colorize;

use super::{CommandResult, open_session, print_loaded};
use crate::cli::InputArgs;

pub fn run(input: InputArgs, json_output: bool) -> CommandResult {
    let session = open_session(&input)?;
    let detected = session.engine().detect_json(session.dataset());

    if json_output {
        println!("{}", serde_json::to_string_pretty(&detected)?);
        return Ok(());
    }

    print_loaded(&input.file, &session);
    println!();

    if detected.is_empty() {
        println!("{}", "No JSON columns found.".yellow());
        return Ok(());
    }

    println!(
        "Found {} JSON column(s)",
        detected.len().to_string().white().bold()
    );
    for info in &detected {
        let mut shape = Vec::new();
        if info.is_array {
            shape.push("array");
        }
        if info.is_nested {
            shape.push("nested");
        }
        println!();
        println!(
            "  {} {:.0}% of {} sampled values{}",
            info.column.cyan().bold(),
            info.json_percentage,
            info.sample_count,
            if shape.is_empty() {
                String::new()
            } else {
                format!(" ({})", shape.join(", "))
            }
        );
        if !info.keys.is_empty() {
            println!("    keys: {}", info.keys.join(", "));
        }
    }

    println!();
    if let Some(first) = detected.iter().find(|info| !info.keys.is_empty()) {
        println!(
            "Run {} to extract keys",
            format!("colwright expand {} -c {}", input.file.display(), first.column)
                .cyan()
                .bold()
        );
    }

    Ok(())
}
