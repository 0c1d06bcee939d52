//! Infer command - report the semantic type of every column.

use colored::Colorize;
use colwright::{SemanticType, Storage};
use serde::Serialize;

use super::{CommandResult, open_session, print_loaded};
use crate::cli::InputArgs;

#[derive(Serialize)]
struct ColumnReport<'a> {
    column: &'a str,
    semantic_type: SemanticType,
    storage: Storage,
    null_count: usize,
}

pub fn run(input: InputArgs, json_output: bool) -> CommandResult {
    let session = open_session(&input)?;
    let dataset = session.dataset();
    let types = session.engine().infer_dataset(dataset);

    let reports: Vec<ColumnReport<'_>> = dataset
        .columns()
        .iter()
        .filter_map(|column| {
            types.get(&column.name).map(|&semantic_type| ColumnReport {
                column: &column.name,
                semantic_type,
                storage: column.storage(),
                null_count: column.null_count(),
            })
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    print_loaded(&input.file, &session);
    println!();
    println!(
        "  {:24} {:12} {:12} {}",
        "column".bold(),
        "type".bold(),
        "storage".bold(),
        "nulls".bold()
    );
    for report in &reports {
        println!(
            "  {:24} {:12} {:12} {}",
            report.column,
            report.semantic_type.as_str().cyan(),
            format!("{:?}", report.storage).to_lowercase(),
            report.null_count
        );
    }

    Ok(())
}
