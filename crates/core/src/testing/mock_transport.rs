//! Mock segment transport for testing.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use crate::fetcher::{SegmentTransport, TransportError};

/// In-memory implementation of [`SegmentTransport`].
///
/// Unknown URIs answer with a 404. Failures can be injected per URI, either
/// for a fixed number of attempts or permanently.
///
/// # Example
///
/// ```rust,ignore
/// use vodpipe_core::testing::MockTransport;
///
/// let transport = MockTransport::new();
/// transport.set_response("http://cdn/0.ts", "data");
/// transport.fail_times("http://cdn/0.ts", 2);
///
/// // first two fetches fail, the third returns "data"
/// assert_eq!(transport.requests_for("http://cdn/0.ts"), 0);
/// ```
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, Bytes>>,
    remaining_failures: Mutex<HashMap<String, u32>>,
    always_fail: Mutex<HashSet<String>>,
    requests: Mutex<Vec<String>>,
    delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `body` for `uri`.
    pub fn set_response(&self, uri: impl Into<String>, body: impl Into<Bytes>) {
        self.responses.lock().insert(uri.into(), body.into());
    }

    /// Makes the next `times` requests for `uri` fail.
    pub fn fail_times(&self, uri: impl Into<String>, times: u32) {
        self.remaining_failures.lock().insert(uri.into(), times);
    }

    /// Makes every request for `uri` fail.
    pub fn fail_always(&self, uri: impl Into<String>) {
        self.always_fail.lock().insert(uri.into());
    }

    /// Delays every response.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    /// All requested URIs in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests_for(&self, uri: &str) -> usize {
        self.requests.lock().iter().filter(|u| *u == uri).count()
    }

    /// Highest number of concurrent requests observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn should_fail(&self, uri: &str) -> bool {
        if self.always_fail.lock().contains(uri) {
            return true;
        }
        let mut failures = self.remaining_failures.lock();
        match failures.get_mut(uri) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl SegmentTransport for MockTransport {
    async fn fetch(&self, uri: &str) -> Result<Bytes, TransportError> {
        self.requests.lock().push(uri.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.should_fail(uri) {
            return Err(TransportError::request(uri, "connection reset by mock"));
        }

        self.responses
            .lock()
            .get(uri)
            .cloned()
            .ok_or_else(|| TransportError::Status {
                uri: uri.to_string(),
                status: 404,
            })
    }
}
