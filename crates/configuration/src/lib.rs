use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Config, CurveSource, DisplaySettings, LoggingSettings, OutputFormat, ReportSettings,
    SeriesStyle, StyleRule, benchmark_label, strategy_label,
};

/// The file looked for in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tearsheet.toml";

/// Prefix of environment variables that override file settings, e.g.
/// `TEARSHEET__REPORT__PERIODS_PER_YEAR=12`.
pub const ENV_PREFIX: &str = "TEARSHEET";

/// Loads the report configuration.
///
/// With an explicit `path` the file must exist. Without one, `tearsheet.toml` in the working
/// directory is used if present. Environment variables are layered on top in both cases.
///
/// The result is not validated here, because command-line overrides are applied afterwards;
/// call [`Config::validate`] once they have been.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let settings = config::Config::builder()
        .add_source(file)
        .add_source(environment())
        .build()?;

    tracing::debug!(?path, "Configuration sources loaded");

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = settings.try_deserialize::<Config>()?;

    Ok(config)
}

/// Parses configuration from TOML text, with the same environment overrides as
/// [`load_config`].
pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(contents, config::FileFormat::Toml))
        .add_source(environment())
        .build()?;

    Ok(settings.try_deserialize::<Config>()?)
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
