//! JSON-RPC client engine
//!
//! Turns calls into wire bytes, hands them to a [`Transport`] and correlates
//! the reply. A reply that breaks JSON-RPC 2.0 (wrong shape, wrong id, an id
//! that was never sent) is reported as an error rather than repaired.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, warn};

use turul_json_rpc_core::{
    DataConvention, IdGenerator, JsonRpcCall, JsonRpcErrorObject, JsonRpcMessage,
    JsonRpcNotification, JsonRpcRequest, RequestId, RequestParams, ResponseWrapper,
    SequentialIdGenerator, encode_batch,
};

use crate::config::ClientConfig;
use crate::error::{JsonRpcClientError, JsonRpcClientResult};
use crate::transport::{HttpTransport, Transport};

/// One response, read back in the convention of the method that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse {
    message: JsonRpcMessage,
    convention: DataConvention,
}

impl RpcResponse {
    pub fn id(&self) -> &RequestId {
        self.message.id()
    }

    pub fn has_error(&self) -> bool {
        self.message.is_error()
    }

    /// Deserialize the result. Fails with [`JsonRpcClientError::Rpc`] when the
    /// response is an error.
    pub fn result<T: DeserializeOwned>(&self) -> JsonRpcClientResult<T> {
        match &self.message {
            JsonRpcMessage::Response(response) => Ok(serde_json::from_value(
                self.convention.from_wire(response.result.clone())?,
            )?),
            JsonRpcMessage::Error(error) => {
                Err(JsonRpcClientError::Rpc(self.read_error(&error.error)?))
            }
        }
    }

    /// The error object. Fails with [`JsonRpcClientError::NotAnError`] when
    /// the response is a success.
    pub fn error(&self) -> JsonRpcClientResult<JsonRpcErrorObject> {
        match &self.message {
            JsonRpcMessage::Error(error) => self.read_error(&error.error),
            JsonRpcMessage::Response(_) => Err(JsonRpcClientError::NotAnError),
        }
    }

    /// The response exactly as received
    pub fn message(&self) -> &JsonRpcMessage {
        &self.message
    }

    pub fn into_message(self) -> JsonRpcMessage {
        self.message
    }

    fn read_error(&self, error: &JsonRpcErrorObject) -> JsonRpcClientResult<JsonRpcErrorObject> {
        let mut error = error.clone();
        error.data = error
            .data
            .map(|data| self.convention.from_wire(data))
            .transpose()?;
        Ok(error)
    }
}

/// Responses to a batch, looked up by request id
#[derive(Debug, Clone)]
pub struct BatchResult {
    ids: Vec<RequestId>,
    responses: HashMap<RequestId, RpcResponse>,
}

impl BatchResult {
    /// Ids of the requests that were sent, in batch order
    pub fn ids(&self) -> &[RequestId] {
        &self.ids
    }

    /// Looking up an id with no response is an error: the server must answer
    /// every request it received.
    pub fn get(&self, id: &RequestId) -> JsonRpcClientResult<&RpcResponse> {
        self.responses
            .get(id)
            .ok_or_else(|| JsonRpcClientError::MissingResponse(id.clone()))
    }

    pub fn has_error(&self, id: &RequestId) -> JsonRpcClientResult<bool> {
        Ok(self.get(id)?.has_error())
    }

    pub fn result<T: DeserializeOwned>(&self, id: &RequestId) -> JsonRpcClientResult<T> {
        self.get(id)?.result()
    }

    pub fn error(&self, id: &RequestId) -> JsonRpcClientResult<JsonRpcErrorObject> {
        self.get(id)?.error()
    }

    /// Responses received, in batch order
    pub fn responses(&self) -> impl Iterator<Item = &RpcResponse> {
        self.ids.iter().filter_map(|id| self.responses.get(id))
    }

    /// Number of responses received
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

#[derive(Debug)]
enum EntryKind {
    /// `None` takes an id from the client's generator when sent
    Request(Option<RequestId>),
    Notification,
}

#[derive(Debug)]
struct BatchEntry {
    kind: EntryKind,
    method: String,
    params: Value,
}

/// Builder for a batch of calls.
///
/// Params are serialized as they are added; the first serialization failure
/// is reported by [`JsonRpcClient::send_batch`].
#[derive(Debug, Default)]
pub struct BatchCall {
    entries: Vec<BatchEntry>,
    error: Option<JsonRpcClientError>,
}

impl BatchCall {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a request with a generated id
    pub fn request(self, method: impl Into<String>, params: impl Serialize) -> Self {
        self.push(EntryKind::Request(None), method.into(), params)
    }

    pub fn request_with_id(
        self,
        id: impl Into<RequestId>,
        method: impl Into<String>,
        params: impl Serialize,
    ) -> Self {
        self.push(EntryKind::Request(Some(id.into())), method.into(), params)
    }

    pub fn notification(self, method: impl Into<String>, params: impl Serialize) -> Self {
        self.push(EntryKind::Notification, method.into(), params)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(mut self, kind: EntryKind, method: String, params: impl Serialize) -> Self {
        match serde_json::to_value(params) {
            Ok(params) => self.entries.push(BatchEntry {
                kind,
                method,
                params,
            }),
            Err(e) => {
                if self.error.is_none() {
                    self.error = Some(e.into());
                }
            }
        }
        self
    }
}

/// JSON-RPC client
#[derive(Clone)]
pub struct JsonRpcClient {
    transport: Arc<dyn Transport>,
    ids: Arc<dyn IdGenerator>,
    config: ClientConfig,
}

impl JsonRpcClient {
    /// Create a client with sequential numeric ids
    pub fn new(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            transport,
            ids: Arc::new(SequentialIdGenerator::new()),
            config,
        }
    }

    pub fn builder() -> JsonRpcClientBuilder {
        JsonRpcClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Take the next id from the client's generator
    pub fn next_id(&self) -> RequestId {
        self.ids.next_id()
    }

    /// Send a request with a generated id.
    ///
    /// `params` must serialize to an object or an array; `()` and `None`
    /// send no params at all.
    pub async fn send_request<P>(&self, method: &str, params: P) -> JsonRpcClientResult<RpcResponse>
    where
        P: Serialize,
    {
        let id = self.ids.next_id();
        self.send_request_with_id(id, method, params).await
    }

    /// Send a request with a caller-chosen id, `RequestId::Null` included
    pub async fn send_request_with_id<P>(
        &self,
        id: RequestId,
        method: &str,
        params: P,
    ) -> JsonRpcClientResult<RpcResponse>
    where
        P: Serialize,
    {
        let convention = self.config.convention_for(method);
        let params = outbound_params(serde_json::to_value(params)?, convention)?;
        let body = serde_json::to_vec(&JsonRpcRequest::new(id.clone(), method, params))?;

        debug!(method = %method, id = %id, "Sending JSON-RPC request");
        let reply = self.with_timeout(self.transport.send(body)).await?;
        if is_blank(&reply) {
            return Err(JsonRpcClientError::EmptyReply);
        }

        match ResponseWrapper::parse(&reply)? {
            ResponseWrapper::Batch(_) => Err(JsonRpcClientError::UnexpectedBatch),
            ResponseWrapper::Single(message) if message.id() != &id => {
                let actual = message.id().clone();
                let error = match message {
                    JsonRpcMessage::Error(error) => Some(error.error),
                    JsonRpcMessage::Response(_) => None,
                };
                Err(JsonRpcClientError::IdMismatch {
                    expected: id,
                    actual,
                    error,
                })
            }
            ResponseWrapper::Single(message) => Ok(RpcResponse {
                message,
                convention,
            }),
        }
    }

    /// Send a request and deserialize its result
    pub async fn call<P, R>(&self, method: &str, params: P) -> JsonRpcClientResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        self.send_request(method, params).await?.result()
    }

    /// Send a notification. No reply body is read.
    pub async fn send_notification<P>(&self, method: &str, params: P) -> JsonRpcClientResult<()>
    where
        P: Serialize,
    {
        let convention = self.config.convention_for(method);
        let params = outbound_params(serde_json::to_value(params)?, convention)?;
        let body = serde_json::to_vec(&JsonRpcNotification::new(method, params))?;

        debug!(method = %method, "Sending JSON-RPC notification");
        self.with_timeout(self.transport.notify(body)).await
    }

    /// Send a batch.
    ///
    /// Returns `None` when the batch holds only notifications, since no reply
    /// is expected. Duplicate request ids are rejected before anything is sent.
    pub async fn send_batch(&self, batch: BatchCall) -> JsonRpcClientResult<Option<BatchResult>> {
        if let Some(error) = batch.error {
            return Err(error);
        }
        if batch.entries.is_empty() {
            return Err(JsonRpcClientError::EmptyBatch);
        }

        let mut calls: Vec<JsonRpcCall> = Vec::with_capacity(batch.entries.len());
        let mut pending: HashMap<RequestId, DataConvention> = HashMap::new();
        let mut ids = Vec::new();

        for entry in batch.entries {
            let convention = self.config.convention_for(&entry.method);
            let params = outbound_params(entry.params, convention)?;
            match entry.kind {
                EntryKind::Request(id) => {
                    let id = id.unwrap_or_else(|| self.ids.next_id());
                    if pending.insert(id.clone(), convention).is_some() {
                        return Err(JsonRpcClientError::DuplicateId(id));
                    }
                    ids.push(id.clone());
                    calls.push(JsonRpcRequest::new(id, entry.method, params).into());
                }
                EntryKind::Notification => {
                    calls.push(JsonRpcNotification::new(entry.method, params).into());
                }
            }
        }

        let body = encode_batch(&calls)?;
        debug!(
            batch_len = calls.len(),
            requests = ids.len(),
            "Sending JSON-RPC batch"
        );

        if ids.is_empty() {
            self.with_timeout(self.transport.notify(body)).await?;
            return Ok(None);
        }

        let reply = self.with_timeout(self.transport.send(body)).await?;
        if is_blank(&reply) {
            return Err(JsonRpcClientError::EmptyReply);
        }

        let messages = match ResponseWrapper::parse(&reply)? {
            ResponseWrapper::Batch(messages) => messages,
            ResponseWrapper::Single(JsonRpcMessage::Error(error)) => {
                warn!(code = error.error.code, "Server rejected the whole batch");
                return Err(JsonRpcClientError::BatchRejected(error.error));
            }
            ResponseWrapper::Single(JsonRpcMessage::Response(_)) => {
                return Err(JsonRpcClientError::UnexpectedSingle);
            }
        };

        let mut responses = HashMap::with_capacity(messages.len());
        for message in messages {
            let id = message.id().clone();
            let Some(&convention) = pending.get(&id) else {
                return Err(JsonRpcClientError::UnexpectedResponseId(id));
            };
            if responses
                .insert(id.clone(), RpcResponse { message, convention })
                .is_some()
            {
                return Err(JsonRpcClientError::DuplicateResponse(id));
            }
        }

        if responses.len() < ids.len() {
            warn!(
                expected = ids.len(),
                received = responses.len(),
                "Batch reply is missing responses"
            );
        }

        Ok(Some(BatchResult { ids, responses }))
    }

    async fn with_timeout<T, F>(&self, operation: F) -> JsonRpcClientResult<T>
    where
        F: Future<Output = JsonRpcClientResult<T>>,
    {
        timeout(self.config.timeouts.request, operation)
            .await
            .map_err(|_| JsonRpcClientError::Timeout)?
    }
}

fn outbound_params(
    params: Value,
    convention: DataConvention,
) -> JsonRpcClientResult<Option<RequestParams>> {
    RequestParams::from_value(convention.to_wire(params)?).map_err(JsonRpcClientError::InvalidParams)
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

/// Builder for [`JsonRpcClient`]
pub struct JsonRpcClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    ids: Option<Arc<dyn IdGenerator>>,
    config: ClientConfig,
}

impl JsonRpcClientBuilder {
    pub fn new() -> Self {
        Self {
            transport: None,
            ids: None,
            config: ClientConfig::default(),
        }
    }

    /// Set transport
    pub fn with_transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Share one transport between several clients
    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use an [`HttpTransport`] posting to `url`
    pub fn with_url(mut self, url: &str) -> JsonRpcClientResult<Self> {
        self.transport = Some(Arc::new(HttpTransport::new(url)?));
        Ok(self)
    }

    pub fn with_id_generator<G>(mut self, ids: G) -> Self
    where
        G: IdGenerator + 'static,
    {
        self.ids = Some(Arc::new(ids));
        self
    }

    /// Set configuration
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: std::time::Duration) -> Self {
        self.config.timeouts.request = request_timeout;
        self
    }

    pub fn with_data_convention(mut self, convention: DataConvention) -> Self {
        self.config.conventions.default = convention;
        self
    }

    pub fn with_method_convention(
        mut self,
        method: impl Into<String>,
        convention: DataConvention,
    ) -> Self {
        self.config.conventions.set(method, convention);
        self
    }

    /// Build the client
    pub fn build(self) -> JsonRpcClientResult<JsonRpcClient> {
        let transport = self.transport.ok_or_else(|| {
            JsonRpcClientError::Config("Transport must be set before building client".to_string())
        })?;
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(SequentialIdGenerator::new()));

        Ok(JsonRpcClient {
            transport,
            ids,
            config: self.config,
        })
    }
}

impl Default for JsonRpcClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
