use super::load_profile;
use crate::cli::OutputFormat;
use crate::config::GeoqaConfig;
use crate::error::CliResult;
use crate::output::{format_checks_table, format_score};
use geoqa_profile::round_score;
use serde_json::json;
use std::path::Path;

pub fn run(path: &Path, format: OutputFormat, config: &GeoqaConfig) -> CliResult<()> {
    let profile = load_profile(path, None, config)?;
    let checks = profile.quality_checks();
    let score = round_score(profile.quality_score());

    match format {
        OutputFormat::Json => {
            let doc = json!({
                "dataset": profile.name(),
                "checks": checks,
                "quality_score": score,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Table => {
            println!("{}", format_checks_table(&checks));
            println!();
            println!("Quality Score: {}", format_score(score));
        }
    }
    Ok(())
}
