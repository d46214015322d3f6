// reqwest-backed HTTP client for the device endpoint
use crate::application::fetcher::FetchError;
use crate::application::http_client::{HttpClient, HttpConnector, HttpResponse};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            // The body of a failed request is never inspected
            return Ok(HttpResponse::new(status.as_u16(), Bytes::new()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse::new(status.as_u16(), body))
    }
}

/// Builds a new `reqwest::Client` (and connection pool) per scheduler run.
#[derive(Debug, Clone)]
pub struct ReqwestConnector {
    timeout: Duration,
}

impl ReqwestConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl HttpConnector for ReqwestConnector {
    fn connect(&self) -> Result<Arc<dyn HttpClient>, FetchError> {
        let client = ReqwestHttpClient::new(self.timeout)
            .map_err(|e| FetchError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Arc::new(client))
    }
}
