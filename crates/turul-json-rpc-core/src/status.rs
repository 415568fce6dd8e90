//! Policy for turning transport-style status hints into JSON-RPC errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::{ErrorCodeRangeError, JsonRpcErrorObject};
use crate::error_codes::{SERVER_ERROR_END, SERVER_ERROR_START};

/// Target of a status mapping entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusError {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    NotFound,
    InternalException,
    Server(i64),
}

impl StatusError {
    fn to_error_object(self, data: Option<Value>) -> JsonRpcErrorObject {
        match self {
            StatusError::ParseError => JsonRpcErrorObject::parse_error(data),
            StatusError::InvalidRequest => JsonRpcErrorObject::invalid_request(data),
            StatusError::MethodNotFound => JsonRpcErrorObject::method_not_found(data),
            StatusError::InvalidParams => JsonRpcErrorObject::invalid_params(data),
            StatusError::InternalError => JsonRpcErrorObject::internal_error(data),
            StatusError::NotFound => JsonRpcErrorObject::not_found(data),
            StatusError::InternalException => JsonRpcErrorObject::internal_exception(data),
            StatusError::Server(code) => match JsonRpcErrorObject::server_error(code, data.clone()) {
                Ok(error) => error,
                Err(_) => JsonRpcErrorObject::internal_exception(data),
            },
        }
    }
}

/// Status code to error table. Unmapped statuses become `Internal exception`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusErrorMap {
    entries: HashMap<u16, StatusError>,
}

impl Default for StatusErrorMap {
    fn default() -> Self {
        let entries = HashMap::from([
            (400, StatusError::InvalidParams),
            (422, StatusError::InvalidParams),
            (401, StatusError::MethodNotFound),
            (403, StatusError::MethodNotFound),
            (404, StatusError::NotFound),
            (415, StatusError::ParseError),
            (500, StatusError::InternalError),
        ]);
        Self { entries }
    }
}

impl StatusErrorMap {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace an entry. `Server` targets must be server codes.
    pub fn insert(&mut self, status: u16, target: StatusError) -> Result<(), ErrorCodeRangeError> {
        if let StatusError::Server(code) = target
            && !(SERVER_ERROR_START..=SERVER_ERROR_END).contains(&code)
        {
            return Err(ErrorCodeRangeError::NotServerCode(code));
        }
        self.entries.insert(status, target);
        Ok(())
    }

    pub fn remove(&mut self, status: u16) -> Option<StatusError> {
        self.entries.remove(&status)
    }

    pub fn get(&self, status: u16) -> Option<StatusError> {
        self.entries.get(&status).copied()
    }

    pub fn map(&self, status: u16, data: Option<Value>) -> JsonRpcErrorObject {
        self.get(status)
            .unwrap_or(StatusError::InternalException)
            .to_error_object(data)
    }
}

impl JsonRpcErrorObject {
    /// Map a status code through the default table.
    pub fn from_status(status: u16, data: Option<Value>) -> Self {
        StatusErrorMap::default().map(status, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_codes::*;

    #[test]
    fn test_default_table() {
        let cases = [
            (400, INVALID_PARAMS),
            (422, INVALID_PARAMS),
            (401, METHOD_NOT_FOUND),
            (403, METHOD_NOT_FOUND),
            (404, NOT_FOUND),
            (415, PARSE_ERROR),
            (500, INTERNAL_ERROR),
            (503, INTERNAL_EXCEPTION),
            (302, INTERNAL_EXCEPTION),
        ];
        for (status, code) in cases {
            assert_eq!(JsonRpcErrorObject::from_status(status, None).code, code, "status {status}");
        }
    }

    #[test]
    fn test_overrides() {
        let mut map = StatusErrorMap::default();
        map.insert(503, StatusError::Server(-32050)).unwrap();
        map.insert(404, StatusError::MethodNotFound).unwrap();
        assert_eq!(map.map(503, None).code, -32050);
        assert_eq!(map.map(404, None).code, METHOD_NOT_FOUND);

        assert_eq!(
            map.insert(429, StatusError::Server(-1)),
            Err(ErrorCodeRangeError::NotServerCode(-1))
        );
        assert_eq!(map.remove(404), Some(StatusError::MethodNotFound));
        assert_eq!(map.map(404, None).code, INTERNAL_EXCEPTION);
    }

    #[test]
    fn test_out_of_range_server_entry_falls_back() {
        let map: StatusErrorMap =
            serde_json::from_str(r#"{"entries":{"409":{"server":5}}}"#).unwrap();
        assert_eq!(map.map(409, None).code, INTERNAL_EXCEPTION);
    }
}
