//! Transport layer for the JSON-RPC client
//!
//! A transport moves encoded bodies; it knows nothing about JSON-RPC beyond
//! whether a reply body is expected.

use async_trait::async_trait;

use crate::error::JsonRpcClientResult;

pub mod http;

pub use http::HttpTransport;

/// Transport statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportStatistics {
    /// Bodies sent, with or without a reply expected
    pub requests_sent: u64,
    /// Reply bodies received
    pub responses_received: u64,
    /// Failed sends
    pub errors: u64,
    /// Last error message
    pub last_error: Option<String>,
}

/// Core transport trait
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a body that expects a reply and return the reply body
    async fn send(&self, body: Vec<u8>) -> JsonRpcClientResult<Vec<u8>>;

    /// Send a body that expects no reply. Any reply body is ignored.
    async fn notify(&self, body: Vec<u8>) -> JsonRpcClientResult<()>;

    /// Endpoint description for logging
    fn endpoint(&self) -> String;
}
