//! Collapse command - pack columns into a JSON column.

use colwright::CollapseOptions;

use super::{CommandResult, execute};
use crate::cli::IoArgs;

pub fn run(
    io: IoArgs,
    columns: Vec<String>,
    new_column: String,
    group_by: Option<String>,
    as_array: bool,
) -> CommandResult {
    let mut options = CollapseOptions::new(columns, new_column);
    if let Some(group) = group_by {
        options = options.grouped_by(group);
    }
    if as_array {
        options = options.as_array();
    }
    execute(&io, &[options.into()])
}
