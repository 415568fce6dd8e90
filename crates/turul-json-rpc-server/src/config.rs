//! Configuration types for the JSON-RPC server engine

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use turul_json_rpc_core::{DataConvention, StatusErrorMap};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Include `details` (debug rendering, source chain) in `error.data`.
    /// Off by default so internals are not leaked to callers.
    pub detailed_errors: bool,

    /// Payload convention for methods registered without their own
    pub data_convention: DataConvention,

    /// Status hint to error table used for `FailureKind::Status`
    pub status_errors: StatusErrorMap,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            detailed_errors: false,
            data_convention: DataConvention::SnakeCase,
            status_errors: StatusErrorMap::default(),
        }
    }
}

impl ServerConfig {
    pub fn detailed_errors(mut self, enable: bool) -> Self {
        self.detailed_errors = enable;
        self
    }

    pub fn data_convention(mut self, convention: DataConvention) -> Self {
        self.data_convention = convention;
        self
    }

    pub fn status_errors(mut self, status_errors: StatusErrorMap) -> Self {
        self.status_errors = status_errors;
        self
    }
}

/// Configuration for the HTTP binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpServerConfig {
    /// Address to bind to
    pub bind_address: SocketAddr,
    /// Path the endpoint is served on
    pub path: String,
    /// Maximum request body size
    pub max_body_size: usize,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 8000)),
            path: "/rpc".to_string(),
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl HttpServerConfig {
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }
}
