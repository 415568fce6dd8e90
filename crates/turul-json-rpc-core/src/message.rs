//! Top-level message shapes and the rules for telling them apart.

use serde::Serialize;
use serde_json::Value;

use crate::error::{JsonRpcError, ProtocolError};
use crate::notification::JsonRpcNotification;
use crate::request::{JsonRpcRequest, RequestParams};
use crate::response::JsonRpcMessage;
use crate::types::{JsonRpcVersion, RequestId};

/// An outbound method invocation: a request expecting one response, or a
/// notification expecting none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonRpcCall {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
}

impl JsonRpcCall {
    pub fn method(&self) -> &str {
        match self {
            JsonRpcCall::Request(req) => &req.method,
            JsonRpcCall::Notification(notif) => &notif.method,
        }
    }

    pub fn params(&self) -> Option<&RequestParams> {
        match self {
            JsonRpcCall::Request(req) => req.params.as_ref(),
            JsonRpcCall::Notification(notif) => notif.params.as_ref(),
        }
    }

    /// Check if this is a request (has ID)
    pub fn is_request(&self) -> bool {
        matches!(self, JsonRpcCall::Request(_))
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, JsonRpcCall::Notification(_))
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        match self {
            JsonRpcCall::Request(req) => Some(&req.id),
            JsonRpcCall::Notification(_) => None,
        }
    }

    /// Validate one raw call.
    ///
    /// The presence of an `id` member, even `null`, makes the call a request.
    /// Failures come back as a ready-made `Invalid Request` response carrying
    /// the call's id when it can be recovered and `null` otherwise.
    pub fn from_value(value: Value) -> Result<Self, JsonRpcError> {
        let Value::Object(mut object) = value else {
            return Err(invalid(None, "call must be a JSON object"));
        };

        let id = match object.remove("id") {
            None => None,
            Some(raw) => match RequestId::from_value(&raw) {
                Some(id) => Some(id),
                None => return Err(invalid(None, "id must be a string, an integer or null")),
            },
        };

        if !JsonRpcVersion::matches(object.get("jsonrpc")) {
            return Err(invalid(id, "jsonrpc must be exactly \"2.0\""));
        }

        let method = match object.remove("method") {
            Some(Value::String(method)) if !method.is_empty() => method,
            Some(Value::String(_)) => return Err(invalid(id, "method must not be empty")),
            Some(_) => return Err(invalid(id, "method must be a string")),
            None => return Err(invalid(id, "missing method")),
        };

        let params = match object.remove("params").map(RequestParams::from_value) {
            None => None,
            Some(Ok(params)) => params,
            Some(Err(_)) => return Err(invalid(id, "params must be an object or an array")),
        };

        Ok(match id {
            Some(id) => JsonRpcCall::Request(JsonRpcRequest::new(id, method, params)),
            None => JsonRpcCall::Notification(JsonRpcNotification::new(method, params)),
        })
    }
}

fn invalid(id: Option<RequestId>, reason: &str) -> JsonRpcError {
    JsonRpcError::invalid_request(id, Some(Value::String(reason.to_string())))
}

impl From<JsonRpcRequest> for JsonRpcCall {
    fn from(request: JsonRpcRequest) -> Self {
        JsonRpcCall::Request(request)
    }
}

impl From<JsonRpcNotification> for JsonRpcCall {
    fn from(notification: JsonRpcNotification) -> Self {
        JsonRpcCall::Notification(notification)
    }
}

/// An inbound payload, classified but not yet validated call by call.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestWrapper {
    Single(Value),
    Batch(Vec<Value>),
    /// Not JSON, or JSON that is neither an object nor an array.
    Malformed(JsonRpcError),
}

impl RequestWrapper {
    pub fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(value),
            Err(e) => RequestWrapper::Malformed(JsonRpcError::parse_error(Some(Value::String(
                e.to_string(),
            )))),
        }
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => RequestWrapper::Batch(items),
            object @ Value::Object(_) => RequestWrapper::Single(object),
            _ => RequestWrapper::Malformed(invalid(None, "expected a JSON object or array")),
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, RequestWrapper::Batch(_))
    }
}

/// A reply payload: one response or an array of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseWrapper {
    Single(JsonRpcMessage),
    Batch(Vec<JsonRpcMessage>),
}

impl ResponseWrapper {
    /// Parse a reply received from a server. Every element is validated.
    pub fn parse(body: &[u8]) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        match value {
            Value::Array(items) if items.is_empty() => Err(ProtocolError::EmptyBatch),
            Value::Array(items) => items
                .into_iter()
                .map(JsonRpcMessage::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(ResponseWrapper::Batch),
            object @ Value::Object(_) => JsonRpcMessage::from_value(object).map(ResponseWrapper::Single),
            _ => Err(ProtocolError::UnexpectedShape),
        }
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, ResponseWrapper::Batch(_))
    }
}

/// Serialize an outbound batch. Notifications and requests may be mixed.
pub fn encode_batch(calls: &[JsonRpcCall]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(calls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_codes::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_request() {
        let call = JsonRpcCall::from_value(json!({"jsonrpc": "2.0", "method": "test", "id": 1}))
            .unwrap();

        assert!(call.is_request());
        assert_eq!(call.method(), "test");
        assert_eq!(call.request_id(), Some(&RequestId::Number(1)));
    }

    #[test]
    fn test_parse_valid_notification() {
        let call = JsonRpcCall::from_value(json!({"jsonrpc": "2.0", "method": "notify"})).unwrap();

        assert!(call.is_notification());
        assert_eq!(call.request_id(), None);
    }

    #[test]
    fn test_null_id_is_a_request() {
        let call =
            JsonRpcCall::from_value(json!({"jsonrpc": "2.0", "method": "m", "id": null})).unwrap();
        assert_eq!(call.request_id(), Some(&RequestId::Null));
    }

    #[test]
    fn test_null_params_are_absent() {
        let call = JsonRpcCall::from_value(
            json!({"jsonrpc": "2.0", "id": "1", "method": "ping", "params": null}),
        )
        .unwrap();
        assert!(call.params().is_none());
    }

    #[test]
    fn test_invalid_calls_keep_recoverable_id() {
        let bad_version =
            JsonRpcCall::from_value(json!({"jsonrpc": "1.0", "method": "m", "id": 7})).unwrap_err();
        assert_eq!(bad_version.error.code, INVALID_REQUEST);
        assert_eq!(bad_version.id, RequestId::Number(7));

        let scalar_params = JsonRpcCall::from_value(
            json!({"jsonrpc": "2.0", "method": "m", "id": "x", "params": 3}),
        )
        .unwrap_err();
        assert_eq!(scalar_params.id, RequestId::from("x"));

        let missing_method = JsonRpcCall::from_value(json!({"jsonrpc": "2.0", "id": 2})).unwrap_err();
        assert_eq!(missing_method.id, RequestId::Number(2));

        let empty_method =
            JsonRpcCall::from_value(json!({"jsonrpc": "2.0", "id": 2, "method": ""})).unwrap_err();
        assert_eq!(empty_method.error.code, INVALID_REQUEST);
    }

    #[test]
    fn test_invalid_calls_without_recoverable_id() {
        let not_object = JsonRpcCall::from_value(json!(1)).unwrap_err();
        assert_eq!(not_object.id, RequestId::Null);

        let bad_id =
            JsonRpcCall::from_value(json!({"jsonrpc": "2.0", "method": "m", "id": {"a": 1}}))
                .unwrap_err();
        assert_eq!(bad_id.id, RequestId::Null);
        assert_eq!(bad_id.error.code, INVALID_REQUEST);
    }

    #[test]
    fn test_request_wrapper_classification() {
        assert!(matches!(
            RequestWrapper::parse(b"{not json"),
            RequestWrapper::Malformed(JsonRpcError { error, .. }) if error.code == PARSE_ERROR
        ));
        assert!(matches!(
            RequestWrapper::parse(b""),
            RequestWrapper::Malformed(JsonRpcError { error, .. }) if error.code == PARSE_ERROR
        ));
        assert!(matches!(
            RequestWrapper::parse(b"42"),
            RequestWrapper::Malformed(JsonRpcError { error, .. }) if error.code == INVALID_REQUEST
        ));
        assert!(matches!(RequestWrapper::parse(b"[]"), RequestWrapper::Batch(items) if items.is_empty()));
        assert!(RequestWrapper::parse(br#"[{"jsonrpc":"2.0","method":"a"}]"#).is_batch());
        assert!(matches!(
            RequestWrapper::parse(br#"{"jsonrpc":"2.0","method":"a"}"#),
            RequestWrapper::Single(_)
        ));
    }

    #[test]
    fn test_response_wrapper_parse() {
        let single = ResponseWrapper::parse(br#"{"jsonrpc":"2.0","id":1,"result":"ok"}"#).unwrap();
        assert!(!single.is_batch());

        let batch = ResponseWrapper::parse(
            br#"[{"jsonrpc":"2.0","id":1,"result":"ok"},{"jsonrpc":"2.0","id":2,"error":{"code":-32601,"message":"Method not found"}}]"#,
        )
        .unwrap();
        match batch {
            ResponseWrapper::Batch(items) => {
                assert_eq!(items.len(), 2);
                assert!(items[1].is_error());
            }
            ResponseWrapper::Single(_) => panic!("expected batch"),
        }

        assert!(matches!(ResponseWrapper::parse(b"[]"), Err(ProtocolError::EmptyBatch)));
        assert!(matches!(ResponseWrapper::parse(b"\"x\""), Err(ProtocolError::UnexpectedShape)));
        assert!(matches!(ResponseWrapper::parse(b"{"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn test_encode_mixed_batch() {
        let calls = vec![
            JsonRpcCall::from(JsonRpcRequest::new_no_params(RequestId::Number(1), "a")),
            JsonRpcCall::from(JsonRpcNotification::new_no_params("b")),
        ];
        let bytes = encode_batch(&calls).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            json!([
                {"jsonrpc": "2.0", "id": 1, "method": "a"},
                {"jsonrpc": "2.0", "method": "b"}
            ])
        );
    }
}
