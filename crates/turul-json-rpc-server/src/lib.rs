//! # JSON-RPC 2.0 Server
//!
//! Server engine for JSON-RPC 2.0: turns one inbound body into at most one
//! outbound body. Methods are routed through a [`JsonRpcDispatcher`]; every
//! failure, malformed input and cancellation included, is answered with a
//! JSON-RPC error object rather than escaping the engine.
//!
//! ## Features
//! - Single calls and batches, processed sequentially in array order
//! - Notifications never produce output, even when they fail
//! - Per-method payload naming conventions
//! - Optional HTTP binding on hyper ([`HttpJsonRpcServer`])

pub mod config;
pub mod dispatcher;
pub mod handler;
pub mod http;
pub mod prelude;
pub mod server;

// Re-export main types
pub use config::{HttpServerConfig, ServerConfig};
pub use dispatcher::JsonRpcDispatcher;
pub use handler::{CallContext, FunctionHandler, JsonRpcHandler, TypedHandler};
pub use crate::http::HttpJsonRpcServer;
pub use server::{JsonRpcServer, JsonRpcServerBuilder};

// Re-export foundational types
pub use turul_json_rpc_core::*;

/// Result type for the HTTP binding
pub type Result<T> = std::result::Result<T, HttpServerError>;

/// HTTP binding errors
#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),
}
