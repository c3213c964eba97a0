pub mod checks;
pub mod fix;
pub mod profile;
pub mod report;

use crate::config::GeoqaConfig;
use crate::error::{CliError, CliResult};
use geoqa_profile::{Dataset, Profile};
use std::path::Path;

/// Load a dataset and run every check over it.
pub(crate) fn load_profile(
    path: &Path,
    name: Option<&str>,
    config: &GeoqaConfig,
) -> CliResult<Profile> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        return Err(CliError::Usage("--name cannot be empty".into()));
    }
    let mut dataset = Dataset::load(path)?;
    if let Some(name) = name {
        dataset = dataset.renamed(name);
    }
    let profile = Profile::new(dataset, config.checks.clone())?.with_weights(config.score);
    Ok(profile)
}
