//! # JSON-RPC Server Prelude
//!
//! ```rust
//! use turul_json_rpc_server::prelude::*;
//! ```

pub use crate::config::{HttpServerConfig, ServerConfig};
pub use crate::dispatcher::JsonRpcDispatcher;
pub use crate::handler::{CallContext, FunctionHandler, JsonRpcHandler, TypedHandler};
pub use crate::http::HttpJsonRpcServer;
pub use crate::server::{JsonRpcServer, JsonRpcServerBuilder};

pub use turul_json_rpc_core::prelude::*;
