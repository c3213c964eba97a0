use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "geoqa",
    about = "Geospatial vector dataset quality checks",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to a TOML config file with a [checks] table
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Profile a dataset and display a summary with the quality score
    Profile {
        /// Dataset file (.json document, .geojson, or .wkt/.txt with one WKT per line)
        path: PathBuf,

        /// Display name for the dataset
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Run quality checks and display the check table
    Checks {
        /// Dataset file
        path: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Write the full check record as JSON
    Report {
        /// Dataset file
        path: PathBuf,

        /// Display name for the dataset
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Output file (stdout when omitted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Include per-feature area, length and centroid rows
        #[arg(long)]
        geometry_stats: bool,
    },

    /// Repair invalid geometries and write the dataset as JSON
    Fix {
        /// Dataset file
        path: PathBuf,

        /// Output file for the repaired dataset
        #[arg(long, short = 'o')]
        output: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}
