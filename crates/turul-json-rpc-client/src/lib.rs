//! # JSON-RPC 2.0 Client
//!
//! Client engine for JSON-RPC 2.0 over a pluggable [`Transport`].
//!
//! ## Features
//!
//! - **Correlation**: single replies must carry the id that was sent; batch
//!   replies are matched by id and may not answer ids that were never sent
//! - **Typed results**: [`RpcResponse::result`] deserializes into any
//!   `DeserializeOwned` type and fails loudly on an error response
//! - **Payload conventions**: params and results are renamed per method
//! - **Timeouts**: every transport round trip is bounded
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use turul_json_rpc_client::JsonRpcClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = JsonRpcClient::builder()
//!         .with_url("http://localhost:8000/rpc")?
//!         .build()?;
//!
//!     let sum: i64 = client.call("add", [2, 3]).await?;
//!     println!("2 + 3 = {}", sum);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod prelude;
pub mod transport;

// Re-export main types
pub use client::{BatchCall, BatchResult, JsonRpcClient, JsonRpcClientBuilder, RpcResponse};
pub use config::{ClientConfig, TimeoutConfig};
pub use error::{JsonRpcClientError, JsonRpcClientResult, TransportError};
pub use transport::{HttpTransport, Transport, TransportStatistics};

// Re-export foundational types
pub use turul_json_rpc_core::{
    DataConvention, IdGenerator, JsonRpcErrorObject, MethodConventions, ProtocolError, RequestId,
    SequentialIdGenerator, UuidIdGenerator,
};
