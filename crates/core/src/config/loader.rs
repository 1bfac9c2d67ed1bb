use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "VODPIPE_";

/// Defaults, then the TOML file, then `<prefix>SECTION__KEY` variables.
fn layered(path: &Path, env_prefix: &str) -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(env_prefix).split("__"))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from file with environment variable overrides.
///
/// Nested keys use a double underscore, e.g. `VODPIPE_DOWNLOADER__CONNECTION_LIMIT=8`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(layered(path, ENV_PREFIX))
}

/// Load configuration from a TOML string, ignoring the environment.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    extract(Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(toml_str)))
}
