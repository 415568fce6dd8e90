//! Error types for JSON-RPC client operations

use thiserror::Error;
use turul_json_rpc_core::{JsonRpcErrorObject, KeyCollision, ProtocolError, RequestId};

/// Result type for JSON-RPC client operations
pub type JsonRpcClientResult<T> = Result<T, JsonRpcClientError>;

/// Error type for JSON-RPC client operations
#[derive(Error, Debug)]
pub enum JsonRpcClientError {
    /// Transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The reply violated JSON-RPC 2.0
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Params or results did not (de)serialize
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Params serialized to something other than an object, array or null
    #[error("Params must serialize to an object or an array, got {0}")]
    InvalidParams(serde_json::Value),

    /// Two payload keys renamed to the same name under the method's convention
    #[error("Payload naming error: {0}")]
    KeyCollision(#[from] KeyCollision),

    #[error("Operation timed out")]
    Timeout,

    #[error("Response id {actual} does not match request id {expected}")]
    IdMismatch {
        expected: RequestId,
        actual: RequestId,
        /// Error object carried by the mismatched reply, if it was an error
        error: Option<JsonRpcErrorObject>,
    },

    #[error("Expected a single response, got a batch")]
    UnexpectedBatch,

    /// The server could not recognise the batch at all
    #[error("Batch rejected (code {}): {}", .0.code, .0.message)]
    BatchRejected(JsonRpcErrorObject),

    #[error("Expected a batch reply, got a single successful response")]
    UnexpectedSingle,

    #[error("Expected a reply body, got none")]
    EmptyReply,

    #[error("Cannot send an empty batch")]
    EmptyBatch,

    #[error("Duplicate request id {0} in batch")]
    DuplicateId(RequestId),

    /// A batch reply answered an id that was never sent
    #[error("Response for id {0} was never requested")]
    UnexpectedResponseId(RequestId),

    #[error("Duplicate response for id {0}")]
    DuplicateResponse(RequestId),

    /// The server did not answer a request it received
    #[error("No response for request id {0}")]
    MissingResponse(RequestId),

    /// A result was extracted from an error response
    #[error("Server error (code {}): {}", .0.code, .0.message)]
    Rpc(JsonRpcErrorObject),

    /// An error was extracted from a successful response
    #[error("Response is a success and carries no error")]
    NotAnError,
}

/// Transport-specific errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP transport error: {0}")]
    Http(String),

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Transport closed unexpectedly")]
    Closed,
}

impl JsonRpcClientError {
    /// Whether the reply broke JSON-RPC rules rather than the call failing
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            JsonRpcClientError::Protocol(_)
                | JsonRpcClientError::IdMismatch { .. }
                | JsonRpcClientError::UnexpectedBatch
                | JsonRpcClientError::UnexpectedSingle
                | JsonRpcClientError::EmptyReply
                | JsonRpcClientError::UnexpectedResponseId(_)
                | JsonRpcClientError::DuplicateResponse(_)
                | JsonRpcClientError::MissingResponse(_)
        )
    }

    /// The JSON-RPC error object, when the server answered with one
    pub fn error_object(&self) -> Option<&JsonRpcErrorObject> {
        match self {
            JsonRpcClientError::Rpc(error) | JsonRpcClientError::BatchRejected(error) => {
                Some(error)
            }
            JsonRpcClientError::IdMismatch { error, .. } => error.as_ref(),
            _ => None,
        }
    }
}
