use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one outbound connection and one active job slot
/// - Scheduler tick interval is positive
/// - Resolver URL template references the video id
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.downloader.connection_limit == 0 {
        return Err(ConfigError::ValidationError(
            "downloader.connection_limit must be at least 1".to_string(),
        ));
    }

    if config.orchestrator.max_active_jobs == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.max_active_jobs must be at least 1".to_string(),
        ));
    }

    if config.orchestrator.tick_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.tick_interval_ms cannot be 0".to_string(),
        ));
    }

    if !config.resolver.playlists_url_template.contains("{id}") {
        return Err(ConfigError::ValidationError(
            "resolver.playlists_url_template must contain {id}".to_string(),
        ));
    }

    Ok(())
}
