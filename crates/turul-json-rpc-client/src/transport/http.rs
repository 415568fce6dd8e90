//! HTTP transport for the JSON-RPC client

use async_trait::async_trait;
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::error::{JsonRpcClientResult, TransportError};
use crate::transport::{Transport, TransportStatistics};

/// Posts bodies to a single JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// HTTP client
    client: Client,
    /// Server endpoint URL
    endpoint: Url,
    /// Statistics
    stats: Arc<parking_lot::Mutex<TransportStatistics>>,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(endpoint: &str) -> JsonRpcClientResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("turul-json-rpc-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Self::with_client(endpoint, client)
    }

    /// Create HTTP transport with custom client
    pub fn with_client(endpoint: &str, client: Client) -> JsonRpcClientResult<Self> {
        let url = Url::parse(endpoint)
            .map_err(|e| TransportError::ConnectionFailed(format!("Invalid URL: {}", e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::ConnectionFailed(format!(
                "Invalid scheme for HTTP transport: {}",
                url.scheme()
            ))
            .into());
        }

        Ok(Self {
            client,
            endpoint: url,
            stats: Arc::new(parking_lot::Mutex::new(TransportStatistics::default())),
        })
    }

    pub fn statistics(&self) -> TransportStatistics {
        self.stats.lock().clone()
    }

    fn update_stats<F>(&self, update_fn: F)
    where
        F: FnOnce(&mut TransportStatistics),
    {
        let mut stats = self.stats.lock();
        update_fn(&mut stats);
    }

    async fn post(&self, body: Vec<u8>) -> JsonRpcClientResult<Response> {
        self.update_stats(|stats| stats.requests_sent += 1);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                self.record_error(format!("Failed to send request: {}", e));
                TransportError::Http(format!("Failed to send request: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "HTTP request rejected");
            self.record_error(format!("HTTP {}: {}", status, body));
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(response)
    }

    fn record_error(&self, message: String) {
        self.update_stats(|stats| {
            stats.errors += 1;
            stats.last_error = Some(message);
        });
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, body: Vec<u8>) -> JsonRpcClientResult<Vec<u8>> {
        let start_time = Instant::now();
        let response = self.post(body).await?;

        let bytes = response.bytes().await.map_err(|e| {
            self.record_error(format!("Failed to read response: {}", e));
            TransportError::Http(format!("Failed to read response: {}", e))
        })?;
        self.update_stats(|stats| stats.responses_received += 1);

        debug!(
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            bytes = bytes.len(),
            "HTTP request completed"
        );
        Ok(bytes.to_vec())
    }

    async fn notify(&self, body: Vec<u8>) -> JsonRpcClientResult<()> {
        self.post(body).await?;
        debug!("HTTP notification delivered");
        Ok(())
    }

    fn endpoint(&self) -> String {
        self.endpoint.to_string()
    }
}
