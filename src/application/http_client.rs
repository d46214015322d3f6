// HTTP client capability injected into the fetcher
use crate::application::fetcher::FetchError;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a single GET. Transport failures map to `FetchError::Transport`;
    /// any HTTP status, including errors, is returned as a response.
    /// Dropping the future must abort the request.
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// Builds a fresh client for every scheduler run.
pub trait HttpConnector: Send + Sync {
    fn connect(&self) -> Result<Arc<dyn HttpClient>, FetchError>;
}
