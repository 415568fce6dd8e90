//! # JSON-RPC Client Prelude
//!
//! ```rust
//! use turul_json_rpc_client::prelude::*;
//! ```

pub use crate::client::{BatchCall, BatchResult, JsonRpcClient, JsonRpcClientBuilder, RpcResponse};
pub use crate::config::{ClientConfig, TimeoutConfig};
pub use crate::error::{JsonRpcClientError, JsonRpcClientResult, TransportError};
pub use crate::transport::{HttpTransport, Transport};

pub use turul_json_rpc_core::{
    DataConvention, IdGenerator, JsonRpcErrorObject, RequestId, SequentialIdGenerator,
    UuidIdGenerator,
};
