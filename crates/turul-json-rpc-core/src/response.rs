use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{JsonRpcError, JsonRpcErrorObject, ProtocolError};
use crate::types::{JsonRpcVersion, RequestId};

/// A successful JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub id: RequestId,
    pub result: Value,
}

impl JsonRpcResponse {
    pub fn new(id: RequestId, result: Value) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            result,
        }
    }

    pub fn null(id: RequestId) -> Self {
        Self::new(id, Value::Null)
    }
}

impl<T> From<(RequestId, T)> for JsonRpcResponse
where
    T: Into<Value>,
{
    fn from((id, result): (RequestId, T)) -> Self {
        Self::new(id, result.into())
    }
}

/// Either a successful response or an error response.
///
/// Exactly one of `result` / `error` exists on the wire; the enum makes the
/// other combinations unrepresentable, and [`JsonRpcMessage::from_parts`]
/// rejects them when building from loose pieces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    /// Successful response with result field
    Response(JsonRpcResponse),
    /// Error response with error field
    Error(JsonRpcError),
}

impl JsonRpcMessage {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self::Response(JsonRpcResponse::new(id, result))
    }

    pub fn error(id: RequestId, error: JsonRpcErrorObject) -> Self {
        Self::Error(JsonRpcError::new(id, error))
    }

    /// Build a response from optional parts, enforcing result XOR error.
    pub fn from_parts(
        id: RequestId,
        result: Option<Value>,
        error: Option<JsonRpcErrorObject>,
    ) -> Result<Self, ProtocolError> {
        match (result, error) {
            (Some(result), None) => Ok(Self::success(id, result)),
            (None, Some(error)) => Ok(Self::error(id, error)),
            (Some(_), Some(_)) => Err(ProtocolError::AmbiguousResponse),
            (None, None) => Err(ProtocolError::EmptyResponse),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcMessage::Error(_))
    }

    pub fn id(&self) -> &RequestId {
        match self {
            JsonRpcMessage::Response(resp) => &resp.id,
            JsonRpcMessage::Error(err) => &err.id,
        }
    }

    pub fn result(&self) -> Option<&Value> {
        match self {
            JsonRpcMessage::Response(resp) => Some(&resp.result),
            JsonRpcMessage::Error(_) => None,
        }
    }

    pub fn error_object(&self) -> Option<&JsonRpcErrorObject> {
        match self {
            JsonRpcMessage::Response(_) => None,
            JsonRpcMessage::Error(err) => Some(&err.error),
        }
    }

    /// Validate an untrusted response value.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let Value::Object(mut object) = value else {
            return Err(ProtocolError::UnexpectedShape);
        };

        if !JsonRpcVersion::matches(object.get("jsonrpc")) {
            return Err(ProtocolError::InvalidVersion);
        }

        let raw_id = object.remove("id").ok_or(ProtocolError::MissingId)?;
        let id = RequestId::from_value(&raw_id).ok_or(ProtocolError::InvalidId(raw_id))?;

        let result = object.remove("result");
        let error = object
            .remove("error")
            .map(JsonRpcErrorObject::from_value)
            .transpose()?;

        Self::from_parts(id, result, error)
    }
}

impl<'de> Deserialize<'de> for JsonRpcMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        JsonRpcMessage::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl From<JsonRpcResponse> for JsonRpcMessage {
    fn from(response: JsonRpcResponse) -> Self {
        Self::Response(response)
    }
}

impl From<JsonRpcError> for JsonRpcMessage {
    fn from(error: JsonRpcError) -> Self {
        Self::Error(error)
    }
}
