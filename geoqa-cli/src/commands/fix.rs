use super::load_profile;
use crate::config::GeoqaConfig;
use crate::error::{CliError, CliResult};
use colored::Colorize;
use geoqa_profile::Profile;
use std::fs;
use std::path::Path;

fn same_file(a: &Path, b: &Path) -> bool {
    a == b || matches!((fs::canonicalize(a), fs::canonicalize(b)), (Ok(x), Ok(y)) if x == y)
}

pub fn run(path: &Path, output: &Path, config: &GeoqaConfig) -> CliResult<()> {
    if same_file(path, output) {
        return Err(CliError::Usage(format!(
            "--output {} would overwrite the input dataset",
            output.display()
        )));
    }
    let profile = load_profile(path, None, config)?;
    let before = profile.quality().geometry.validity.invalid_count;

    let fixed = profile.fix_invalid();
    fixed.write_json(output)?;

    let after = Profile::new(fixed, config.checks.clone())?
        .quality()
        .geometry
        .validity
        .invalid_count;
    tracing::info!(before, after, "Repair complete");

    println!(
        "{} {} of {} invalid geometries",
        "Repaired".green().bold(),
        before.saturating_sub(after),
        before
    );
    println!("Wrote {}", output.display());
    Ok(())
}
