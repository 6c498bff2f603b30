use reqwest::header::CONTENT_TYPE;
use reqwest::Client as ReqwestClient;
use std::time::Duration;

use crate::models::errors::UplinkError;

pub(crate) struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    pub(crate) fn new(timeout: Duration) -> Result<Self, UplinkError> {
        // Each worker thread runs its own runtime, so pooled connections
        // would outlive the runtime that opened them.
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| UplinkError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }

    /// POSTs `body` as JSON. Transport errors and non-2xx answers are `Submit` errors.
    pub(crate) async fn post_json(&self, url: &str, body: String) -> Result<(), UplinkError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header("charsets", "utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| UplinkError::Submit(e.to_string()))?;

        response
            .error_for_status()
            .map_err(|e| UplinkError::Submit(e.to_string()))?;
        Ok(())
    }
}
