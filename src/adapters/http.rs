use crate::core::dispatch::CapturedResponse;
use crate::core::request::BuiltRequest;
use crate::domain::ports::Dispatcher;
use crate::utils::error::{ReplayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends requests with reqwest. One request at a time; no retries.
#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: Client,
}

impl HttpDispatcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ReplayError::ConfigLoadError {
                field: "http_client".to_string(),
                message: format!("Cannot build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(&self, definition: &str, request: BuiltRequest) -> Result<CapturedResponse> {
        let transport = |source: reqwest::Error| ReplayError::TransportError {
            definition: definition.to_string(),
            source,
        };

        let mut builder = self
            .client
            .request(request.method.into(), request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        tracing::debug!("📡 {}: response status {}", definition, status);

        let body = response.bytes().await.map_err(transport)?;
        Ok(CapturedResponse::new(status, version, &headers, body.to_vec()))
    }
}
