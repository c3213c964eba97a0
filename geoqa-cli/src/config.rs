//! TOML configuration.
//!
//! ```toml
//! [checks]
//! max_features = 5000
//! sliver_threshold = 0.02
//!
//! [score]
//! validity = 50.0
//! ```
//!
//! Every key is optional; missing keys take the engine defaults.

use crate::error::{CliError, CliResult};
use geoqa_geometry::CheckConfig;
use geoqa_profile::ScoreWeights;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoqaConfig {
    pub checks: CheckConfig,
    pub score: ScoreWeights,
}

/// Load the config file, or defaults when no path is given.
pub fn load(path: Option<&Path>) -> CliResult<GeoqaConfig> {
    let Some(path) = path else {
        return Ok(GeoqaConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|e| {
        CliError::Config(format!("cannot read config {}: {e}", path.display()))
    })?;
    let config = parse(&text)
        .map_err(|e| CliError::Config(format!("invalid config {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "Loaded config");
    Ok(config)
}

fn parse(text: &str) -> Result<GeoqaConfig, String> {
    let config: GeoqaConfig = toml::from_str(text).map_err(|e| e.to_string())?;
    config.checks.validate().map_err(|e| e.to_string())?;
    Ok(config)
}
