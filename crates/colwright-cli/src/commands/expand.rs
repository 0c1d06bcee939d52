//! Expand command - pull keys out of a JSON column.

use colwright::{ExpandOptions, TransformOperation};

use super::{CommandResult, execute, open_session};
use crate::cli::IoArgs;

pub fn run(
    io: IoArgs,
    column: String,
    keys: Vec<String>,
    explode: bool,
    prefix: Option<String>,
) -> CommandResult {
    // Without explicit keys, take every key detection found in the column.
    let keys = if keys.is_empty() {
        detected_keys(&io, &column)?
    } else {
        keys
    };

    let mut options = ExpandOptions::new(column, keys);
    if explode {
        options = options.exploding();
    }
    if let Some(prefix) = prefix {
        options = options.with_prefix(prefix);
    }

    let operation: TransformOperation = options.into();
    execute(&io, &[operation])
}

fn detected_keys(io: &IoArgs, column: &str) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let session = open_session(&io.input)?;
    let detected = session.engine().detect_json(session.dataset());
    match detected.into_iter().find(|info| info.column == column) {
        Some(info) if !info.keys.is_empty() => Ok(info.keys),
        Some(_) => Err(format!("No object keys found in column '{}'; pass --keys", column).into()),
        None => Err(format!("Column '{}' does not look like JSON; pass --keys", column).into()),
    }
}
