//! colwright CLI - column type inference and structural transformations.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Infer { input, json } => commands::infer::run(input, json),

        Commands::DetectJson { input, json } => commands::detect_json::run(input, json),

        Commands::Merge {
            io,
            columns,
            new_column,
            separators,
            missing,
            datetime,
            output_format,
            check,
        } => commands::merge::run(
            io,
            commands::merge::MergeArgs {
                columns,
                new_column,
                separators,
                missing,
                datetime,
                output_format,
            },
            check,
        ),

        Commands::Split {
            io,
            column,
            separator,
            prefix,
            max_splits,
            datetime,
            components,
            check,
        } => commands::split::run(
            io,
            commands::split::SplitArgs {
                column,
                separator,
                prefix,
                max_splits,
                datetime,
                components,
            },
            check,
        ),

        Commands::Expand {
            io,
            column,
            keys,
            explode,
            prefix,
        } => commands::expand::run(io, column, keys, explode, prefix),

        Commands::Collapse {
            io,
            columns,
            new_column,
            group_by,
            as_array,
        } => commands::collapse::run(io, columns, new_column, group_by, as_array),

        Commands::Convert {
            io,
            column,
            to,
            datetime_format,
            on_error,
        } => commands::convert::run(io, column, to, datetime_format, on_error),

        Commands::Apply { io, pipeline } => commands::apply::run(io, pipeline),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
