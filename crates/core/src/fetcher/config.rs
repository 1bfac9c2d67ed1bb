//! Configuration for the segment fetcher.

use std::time::Duration;

/// Parallelism and retry policy for segment downloads.
#[derive(Debug, Clone, PartialEq)]
pub struct FetcherConfig {
    /// Maximum number of segments downloaded at once.
    pub max_parallel: usize,
    /// Retries per segment after the first failed attempt.
    pub max_retries: u32,
    /// Delay between two attempts of the same segment.
    pub retry_delay: Duration,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(20)
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self::from_connection_limit(10)
    }
}

impl FetcherConfig {
    /// One worker less than the global connection limit, at least one.
    pub fn from_connection_limit(connection_limit: usize) -> Self {
        Self {
            max_parallel: connection_limit.saturating_sub(1).max(1),
            max_retries: default_max_retries(),
            retry_delay: default_retry_delay(),
        }
    }

    /// Sets the retry budget and the delay between retries.
    pub fn with_retries(mut self, max_retries: u32, retry_delay_secs: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = Duration::from_secs(retry_delay_secs);
        self
    }

    /// Sets the retry delay with sub-second precision.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Sets the number of parallel workers (at least one).
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }
}
