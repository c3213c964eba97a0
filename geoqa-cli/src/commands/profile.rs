use super::load_profile;
use crate::cli::OutputFormat;
use crate::config::GeoqaConfig;
use crate::error::CliResult;
use std::path::Path;

pub fn run(
    path: &Path,
    name: Option<&str>,
    format: OutputFormat,
    config: &GeoqaConfig,
) -> CliResult<()> {
    let profile = load_profile(path, name, config)?;
    let summary = profile.summary();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Table => println!("{}", crate::output::format_summary_table(&summary)),
    }
    Ok(())
}
