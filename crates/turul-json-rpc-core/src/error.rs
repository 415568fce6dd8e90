use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::error_codes::*;
use crate::types::{JsonRpcVersion, RequestId};

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerError(i64), // -32099 to -32000
    Application(i64),
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => INTERNAL_ERROR,
            JsonRpcErrorCode::ServerError(code) => *code,
            JsonRpcErrorCode::Application(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
            JsonRpcErrorCode::ServerError(INTERNAL_EXCEPTION) => "Internal exception",
            JsonRpcErrorCode::ServerError(NOT_FOUND) => "Not found",
            JsonRpcErrorCode::ServerError(_) => "Server error",
            JsonRpcErrorCode::Application(_) => "Application error",
        }
    }

    /// Classify a raw code read off the wire.
    pub fn from_code(code: i64) -> Self {
        match code {
            PARSE_ERROR => JsonRpcErrorCode::ParseError,
            INVALID_REQUEST => JsonRpcErrorCode::InvalidRequest,
            METHOD_NOT_FOUND => JsonRpcErrorCode::MethodNotFound,
            INVALID_PARAMS => JsonRpcErrorCode::InvalidParams,
            INTERNAL_ERROR => JsonRpcErrorCode::InternalError,
            SERVER_ERROR_START..=SERVER_ERROR_END => JsonRpcErrorCode::ServerError(code),
            _ => JsonRpcErrorCode::Application(code),
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// Whether `code` falls inside the range the protocol reserves for itself.
pub fn is_reserved_code(code: i64) -> bool {
    (RESERVED_START..=RESERVED_END).contains(&code)
}

/// Raised when an error object is built with a code outside the range its
/// factory permits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorCodeRangeError {
    #[error("server error code {0} is outside -32099..=-32000")]
    NotServerCode(i64),

    #[error("application error code {0} falls in the reserved range -32768..=-32000")]
    ReservedCode(i64),
}

/// JSON-RPC Error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorObject {
    fn new(code: JsonRpcErrorCode, data: Option<Value>) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_string(),
            data,
        }
    }

    pub fn parse_error(data: Option<Value>) -> Self {
        Self::new(JsonRpcErrorCode::ParseError, data)
    }

    pub fn invalid_request(data: Option<Value>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidRequest, data)
    }

    pub fn method_not_found(data: Option<Value>) -> Self {
        Self::new(JsonRpcErrorCode::MethodNotFound, data)
    }

    pub fn invalid_params(data: Option<Value>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidParams, data)
    }

    pub fn internal_error(data: Option<Value>) -> Self {
        Self::new(JsonRpcErrorCode::InternalError, data)
    }

    /// Server-defined error. Only codes in `-32099..=-32000` are accepted.
    pub fn server_error(code: i64, data: Option<Value>) -> Result<Self, ErrorCodeRangeError> {
        if !(SERVER_ERROR_START..=SERVER_ERROR_END).contains(&code) {
            return Err(ErrorCodeRangeError::NotServerCode(code));
        }
        Ok(Self::new(JsonRpcErrorCode::ServerError(code), data))
    }

    /// Error raised when a method fails with something unexpected.
    pub fn generic_exception(data: Option<Value>) -> Self {
        Self::new(JsonRpcErrorCode::ServerError(GENERIC_EXCEPTION), data)
    }

    pub fn internal_exception(data: Option<Value>) -> Self {
        Self::new(JsonRpcErrorCode::ServerError(INTERNAL_EXCEPTION), data)
    }

    pub fn not_found(data: Option<Value>) -> Self {
        Self::new(JsonRpcErrorCode::ServerError(NOT_FOUND), data)
    }

    /// Application-defined error. Codes inside the reserved range are rejected.
    pub fn error(
        code: i64,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Result<Self, ErrorCodeRangeError> {
        if is_reserved_code(code) {
            return Err(ErrorCodeRangeError::ReservedCode(code));
        }
        Ok(Self {
            code,
            message: message.into(),
            data,
        })
    }

    pub fn kind(&self) -> JsonRpcErrorCode {
        JsonRpcErrorCode::from_code(self.code)
    }

    /// Parse an `error` member received from a peer.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(ProtocolError::InvalidErrorObject(format!(
                    "expected an object, got {}",
                    other
                )));
            }
        };

        let code = object
            .get("code")
            .and_then(Value::as_i64)
            .ok_or_else(|| ProtocolError::InvalidErrorObject("missing integer code".into()))?;
        let message = object
            .get("message")
            .and_then(Value::as_str)
            .ok_or_else(|| ProtocolError::InvalidErrorObject("missing string message".into()))?
            .to_string();
        let data = object.get("data").cloned();

        Ok(Self {
            code,
            message,
            data,
        })
    }
}

impl fmt::Display for JsonRpcErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// JSON-RPC Error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub id: RequestId,
    pub error: JsonRpcErrorObject,
}

impl JsonRpcError {
    pub fn new(id: RequestId, error: JsonRpcErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            error,
        }
    }

    pub fn parse_error(data: Option<Value>) -> Self {
        Self::new(RequestId::Null, JsonRpcErrorObject::parse_error(data))
    }

    pub fn invalid_request(id: Option<RequestId>, data: Option<Value>) -> Self {
        Self::new(
            id.unwrap_or(RequestId::Null),
            JsonRpcErrorObject::invalid_request(data),
        )
    }

    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::new(
            id,
            JsonRpcErrorObject::method_not_found(Some(Value::String(method.to_string()))),
        )
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JSON-RPC Error {} (id {}): {}",
            self.error.code, self.id, self.error.message
        )
    }
}

/// Wire-shape violations found while reading a peer's message
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported or missing JSON-RPC version")]
    InvalidVersion,

    #[error("expected a JSON object or array")]
    UnexpectedShape,

    #[error("batch contains no elements")]
    EmptyBatch,

    #[error("response carries both result and error")]
    AmbiguousResponse,

    #[error("response carries neither result nor error")]
    EmptyResponse,

    #[error("response is missing its id")]
    MissingId,

    #[error("invalid id: {0}")]
    InvalidId(Value),

    #[error("invalid error object: {0}")]
    InvalidErrorObject(String),
}
