//! Convert command - change a column's semantic type.

use colwright::{ConvertOptions, OnError, SemanticType};

use super::{CommandResult, execute};
use crate::cli::IoArgs;

pub fn run(
    io: IoArgs,
    column: String,
    target: SemanticType,
    datetime_format: Option<String>,
    on_error: OnError,
) -> CommandResult {
    let mut options = ConvertOptions::new(column, target).on_error(on_error);
    if let Some(format) = datetime_format {
        options = options.with_format(format);
    }
    execute(&io, &[options.into()])
}
