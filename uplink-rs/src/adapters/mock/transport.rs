use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::models::errors::UplinkError;
use crate::ports::TransportPort;
use crate::utils::lock;

/// Records every submission instead of sending it.
#[derive(Debug, Default)]
pub struct MockTransport {
    submissions: Mutex<Vec<(String, String)>>,
    attempts: AtomicUsize,
    failing: AtomicBool,
    latency: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport that rejects every submission.
    pub fn failing() -> Self {
        let transport = Self::default();
        transport.set_failing(true);
        transport
    }

    /// Delays every submission by `latency`.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Accepted submissions as `(endpoint, payload)` pairs, in arrival order.
    pub fn submissions(&self) -> Vec<(String, String)> {
        lock(&self.submissions).clone()
    }

    /// Accepted payloads parsed as JSON. Unparsable payloads are skipped.
    pub fn payloads(&self) -> Vec<serde_json::Value> {
        lock(&self.submissions)
            .iter()
            .filter_map(|(_, payload)| serde_json::from_str(payload).ok())
            .collect()
    }

    /// Number of submit calls, accepted or not.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportPort for MockTransport {
    async fn submit(&self, endpoint: &str, payload: String) -> Result<(), UplinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(UplinkError::Submit("Mock transport failure".to_string()));
        }
        lock(&self.submissions).push((endpoint.to_string(), payload));
        Ok(())
    }
}
