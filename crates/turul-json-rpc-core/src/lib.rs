//! # JSON-RPC 2.0 Protocol Core
//!
//! Transport-agnostic building blocks shared by the client and server engines:
//! the message model, the error catalogue, the rules for classifying inbound
//! payloads, payload naming conventions and request id generation.
//!
//! ## Features
//! - `null` vs absent distinctions kept exactly as the wire has them
//! - Result/error exclusivity enforced when reading untrusted responses
//! - Reserved error-code ranges enforced at construction time
//! - Status hints mapped through a replaceable table

pub mod error;
pub mod failure;
pub mod id;
pub mod message;
pub mod naming;
pub mod notification;
pub mod prelude;
pub mod request;
pub mod response;
pub mod status;
pub mod types;

// Re-export main types
pub use error::{
    ErrorCodeRangeError, JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject, ProtocolError,
    is_reserved_code,
};
pub use failure::{Failure, FailureKind};
pub use id::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use message::{JsonRpcCall, RequestWrapper, ResponseWrapper, encode_batch};
pub use naming::{DataConvention, KeyCollision, MethodConventions};
pub use notification::JsonRpcNotification;
pub use request::{JsonRpcRequest, RequestParams};
pub use response::{JsonRpcMessage, JsonRpcResponse};
pub use status::{StatusError, StatusErrorMap};
pub use types::{JsonRpcVersion, RequestId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Server error range: -32099 to -32000
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;

    // Whole range applications may not assign themselves
    pub const RESERVED_START: i64 = -32768;
    pub const RESERVED_END: i64 = -32000;

    pub const GENERIC_EXCEPTION: i64 = -32000;
    pub const INTERNAL_EXCEPTION: i64 = -32001;
    pub const NOT_FOUND: i64 = -32004;
}
