// Fetcher - One GET against the configured device endpoint
use crate::application::http_client::HttpClient;
use bytes::Bytes;
use reqwest::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("API endpoint is not configured")]
    MissingEndpoint,

    #[error("API endpoint {0:?} is not a valid http(s) URL")]
    InvalidEndpoint(String),

    #[error("HTTP request failed with status {0}")]
    Status(u16),

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Empty response received from device")]
    EmptyResponse,
}

impl FetchError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            FetchError::MissingEndpoint => "config_missing",
            FetchError::InvalidEndpoint(_) => "config_invalid",
            FetchError::Status(_) => "http_status",
            FetchError::Transport(_) => "transport",
            FetchError::EmptyResponse => "empty_response",
        }
    }
}

/// Validate the endpoint without touching the network.
pub fn parse_endpoint(endpoint: Option<&str>) -> Result<Url, FetchError> {
    let endpoint = endpoint
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or(FetchError::MissingEndpoint)?;

    Url::parse(endpoint)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .ok_or_else(|| FetchError::InvalidEndpoint(endpoint.to_string()))
}

pub async fn fetch(client: &dyn HttpClient, endpoint: Option<&str>) -> Result<Bytes, FetchError> {
    let url = parse_endpoint(endpoint)?;

    let response = client.get(url.as_str()).await?;
    if response.status != 200 {
        return Err(FetchError::Status(response.status));
    }
    if response.body.is_empty() {
        return Err(FetchError::EmptyResponse);
    }

    Ok(response.body)
}
