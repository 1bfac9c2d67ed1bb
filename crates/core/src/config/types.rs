use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::converter::ConverterConfig;
use crate::fetcher::FetcherConfig;
use crate::orchestrator::OrchestratorConfig;
use crate::resolver::ResolverConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub downloader: DownloaderConfig,
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Segment download configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloaderConfig {
    /// Root under which every job gets its own `TL_<id>` directory.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Global outbound connection limit. Segment workers use one less.
    #[serde(default = "default_connection_limit")]
    pub connection_limit: usize,

    /// Retries per segment after the first failed attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between segment retries in seconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Timeout for a single HTTP request in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("vodpipe")
}

fn default_connection_limit() -> usize {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    20
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            connection_limit: default_connection_limit(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl DownloaderConfig {
    /// Fetcher settings derived from this section.
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig::from_connection_limit(self.connection_limit)
            .with_retries(self.max_retries, self.retry_delay_secs)
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub downloader: DownloaderConfig,
    pub converter: ConverterConfig,
    pub orchestrator: OrchestratorConfig,
    pub resolver: SanitizedResolverConfig,
}

/// Resolver config with the client id hidden.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedResolverConfig {
    pub playlists_url_template: String,
    pub client_id_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            downloader: config.downloader.clone(),
            converter: config.converter.clone(),
            orchestrator: config.orchestrator.clone(),
            resolver: SanitizedResolverConfig {
                playlists_url_template: config.resolver.playlists_url_template.clone(),
                client_id_configured: !config.resolver.client_id.is_empty(),
                timeout_secs: config.resolver.timeout_secs,
            },
        }
    }
}
