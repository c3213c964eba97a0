use super::load_profile;
use crate::config::GeoqaConfig;
use crate::error::CliResult;
use colored::Colorize;
use std::fs;
use std::path::Path;

pub fn run(
    path: &Path,
    name: Option<&str>,
    output: Option<&Path>,
    with_geometry_stats: bool,
    config: &GeoqaConfig,
) -> CliResult<()> {
    let profile = load_profile(path, name, config)?;
    let mut record = profile.record().to_value()?;
    if with_geometry_stats {
        if let Some(map) = record.as_object_mut() {
            map.insert(
                "geometry_stats".to_string(),
                serde_json::to_value(profile.geometry_stats())?,
            );
        }
    }
    let json = serde_json::to_string_pretty(&record)?;

    match output {
        Some(out) => {
            fs::write(out, json)?;
            println!("{} {}", "Report saved to:".green(), out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
