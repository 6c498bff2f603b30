// Submission of serialized batches to an HTTP endpoint.

use async_trait::async_trait;
use std::time::Duration;

use crate::models::errors::UplinkError;
use crate::models::http_client::HttpClient;
use crate::ports::TransportPort;

/// Posts every batch as a JSON document to the endpoint.
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    /// Returns a ClientBuild error if the HTTP client cannot be created.
    pub fn new(request_timeout: Duration) -> Result<Self, UplinkError> {
        let client = HttpClient::new(request_timeout)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TransportPort for HttpTransport {
    async fn submit(&self, endpoint: &str, payload: String) -> Result<(), UplinkError> {
        self.client.post_json(endpoint, payload).await
    }
}
