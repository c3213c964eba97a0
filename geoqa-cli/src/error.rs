use colored::Colorize;
use geoqa_geometry::QualityError;
use geoqa_profile::ProfileError;
use std::fmt;
use std::process;

/// Exit codes for the CLI.
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Unified error type for CLI operations.
pub enum CliError {
    /// Error from the profiling layer.
    Profile(ProfileError),
    /// Config file issues.
    Config(String),
    /// Unreadable input or output.
    Input(String),
    /// Input file not found.
    NotFound(String),
    /// Argument values clap cannot reject on its own.
    Usage(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Profile(e) => write!(f, "{} {e}", "error:".red().bold()),
            CliError::Config(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::Input(msg) => write!(f, "{} {msg}", "error:".red().bold()),
            CliError::NotFound(msg) => write!(
                f,
                "{} {msg}\n  {} pass a .json dataset document, a .geojson file or a .wkt file",
                "error:".red().bold(),
                "help:".cyan().bold(),
            ),
            CliError::Usage(msg) => write!(f, "{} {msg}", "error:".red().bold()),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<ProfileError> for CliError {
    fn from(e: ProfileError) -> Self {
        match e {
            ProfileError::NotFound(path) => {
                CliError::NotFound(format!("file not found: {}", path.display()))
            }
            ProfileError::Quality(QualityError::Config(msg)) => CliError::Config(msg),
            other => CliError::Profile(other),
        }
    }
}

impl From<QualityError> for CliError {
    fn from(e: QualityError) -> Self {
        CliError::from(ProfileError::from(e))
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Input(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Input(format!("JSON error: {e}"))
    }
}

/// Print error and exit with the appropriate code.
pub fn exit_with_error(err: CliError) -> ! {
    eprintln!("{err}");
    process::exit(err.exit_code())
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => EXIT_USAGE,
            _ => EXIT_ERROR,
        }
    }
}

pub type CliResult<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Usage("bad".into()).exit_code(), EXIT_USAGE);
        assert_eq!(CliError::Config("bad".into()).exit_code(), EXIT_ERROR);
        let missing = CliError::from(ProfileError::NotFound("x.json".into()));
        assert!(matches!(missing, CliError::NotFound(_)));
        assert_eq!(missing.exit_code(), EXIT_ERROR);
    }
}
