//! geoqa CLI library.
//!
//! Argument types, command handlers and output formatting behind the `geoqa`
//! binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

use cli::{Cli, Commands};

/// Dispatch a parsed [`Cli`] to the matching command handler.
pub fn run(cli: Cli) -> error::CliResult<()> {
    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Profile { path, name, format } => {
            commands::profile::run(&path, name.as_deref(), format, &config)
        }
        Commands::Checks { path, format } => commands::checks::run(&path, format, &config),
        Commands::Report {
            path,
            name,
            output,
            geometry_stats,
        } => commands::report::run(
            &path,
            name.as_deref(),
            output.as_deref(),
            geometry_stats,
            &config,
        ),
        Commands::Fix { path, output } => commands::fix::run(&path, &output, &config),
    }
}
