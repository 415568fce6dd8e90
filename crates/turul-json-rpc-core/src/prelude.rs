//! # JSON-RPC Core Prelude
//!
//! ```rust
//! use turul_json_rpc_core::prelude::*;
//! ```

pub use crate::error::{JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject, ProtocolError};
pub use crate::failure::{Failure, FailureKind};
pub use crate::id::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use crate::message::{JsonRpcCall, RequestWrapper, ResponseWrapper};
pub use crate::naming::{DataConvention, KeyCollision, MethodConventions};
pub use crate::notification::JsonRpcNotification;
pub use crate::request::{JsonRpcRequest, RequestParams};
pub use crate::response::{JsonRpcMessage, JsonRpcResponse};
pub use crate::types::{JsonRpcVersion, RequestId};

// Standard error codes
pub use crate::error_codes::*;
