//! Mapping arbitrary handler failures onto JSON-RPC error objects.

use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::fmt;

use crate::error::JsonRpcErrorObject;
use crate::status::StatusErrorMap;

/// Closed set of failure categories a method invocation can end in.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureKind {
    /// Anything without a more specific category.
    Unexpected,
    /// The failure carries a transport-style status hint (e.g. 404).
    Status(u16),
    InvalidParams,
    NotFound,
    /// The surrounding operation was cancelled before the call ran.
    Cancelled,
    /// The method chose its JSON-RPC error itself; sent verbatim.
    Rpc(JsonRpcErrorObject),
}

/// A failed method invocation.
///
/// Any `std::error::Error` converts into a `Failure` through `?`, keeping the
/// error's type name, message and debug rendering. `Failure` does not
/// implement `std::error::Error`; the blanket conversion requires that.
#[derive(Debug, Clone)]
pub struct Failure {
    kind: FailureKind,
    type_name: String,
    message: String,
    details: Option<String>,
}

#[derive(Serialize)]
struct FailureData<'a> {
    #[serde(rename = "type")]
    type_name: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        let type_name = match &kind {
            FailureKind::Unexpected => "Failure",
            FailureKind::Status(_) => "StatusFailure",
            FailureKind::InvalidParams => "InvalidParams",
            FailureKind::NotFound => "NotFound",
            FailureKind::Cancelled => "Cancelled",
            FailureKind::Rpc(_) => "RpcError",
        };
        Self {
            kind,
            type_name: type_name.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unexpected, message)
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::new(FailureKind::Status(status), message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidParams, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NotFound, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Cancelled, message)
    }

    pub fn rpc(error: JsonRpcErrorObject) -> Self {
        let message = error.message.clone();
        Self::new(FailureKind::Rpc(error), message)
    }

    /// Build from a panic payload caught around a handler.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "handler panicked".to_string()
        };
        Self::unexpected(message).with_type_name("Panic")
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Re-categorise, keeping type name, message and details.
    pub fn with_kind(mut self, kind: FailureKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn kind(&self) -> &FailureKind {
        &self.kind
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// The `{type, message, details?}` record attached as `error.data`.
    /// `details` is only included when `detailed` is set.
    pub fn to_data(&self, detailed: bool) -> Value {
        let data = FailureData {
            type_name: &self.type_name,
            message: &self.message,
            details: if detailed { self.details.as_deref() } else { None },
        };
        serde_json::to_value(data).unwrap_or(Value::Null)
    }

    /// Map onto the error catalogue.
    pub fn to_error_object(&self, detailed: bool, statuses: &StatusErrorMap) -> JsonRpcErrorObject {
        let data = Some(self.to_data(detailed));
        match &self.kind {
            FailureKind::Rpc(error) => error.clone(),
            FailureKind::Status(status) => statuses.map(*status, data),
            FailureKind::InvalidParams => JsonRpcErrorObject::invalid_params(data),
            FailureKind::NotFound => JsonRpcErrorObject::not_found(data),
            FailureKind::Cancelled | FailureKind::Unexpected => {
                JsonRpcErrorObject::generic_exception(data)
            }
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)
    }
}

impl<E> From<E> for Failure
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        let mut details = format!("{:?}", error);
        let mut source = error.source();
        while let Some(cause) = source {
            details.push_str("\ncaused by: ");
            details.push_str(&cause.to_string());
            source = cause.source();
        }

        Failure::unexpected(error.to_string())
            .with_type_name(short_type_name::<E>())
            .with_details(details)
    }
}

impl From<JsonRpcErrorObject> for Failure {
    fn from(error: JsonRpcErrorObject) -> Self {
        Failure::rpc(error)
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}
