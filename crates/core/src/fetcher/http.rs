//! reqwest-based transport.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::trace;

use super::error::TransportError;
use super::traits::SegmentTransport;

/// Plain HTTP GET transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport whose requests time out after `timeout_secs`.
    pub fn new(timeout_secs: u64) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wraps an existing client (shares its connection pool).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn map_error(uri: &str, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                uri: uri.to_string(),
            }
        } else if let Some(status) = e.status() {
            TransportError::Status {
                uri: uri.to_string(),
                status: status.as_u16(),
            }
        } else {
            TransportError::request(uri, e.to_string())
        }
    }
}

#[async_trait]
impl SegmentTransport for HttpTransport {
    async fn fetch(&self, uri: &str) -> Result<Bytes, TransportError> {
        trace!(uri, "GET");

        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| Self::map_error(uri, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|e| Self::map_error(uri, e))
    }
}
