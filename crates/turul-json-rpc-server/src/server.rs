//! The inbound processing pipeline.
//!
//! `parse -> dispatch -> aggregate`, with the parsed call and its outcome
//! threaded through return values. Every failure, including malformed input
//! and cancellation, leaves as a JSON-RPC error response; nothing escapes
//! [`JsonRpcServer::process_inbound`].

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use turul_json_rpc_core::{
    DataConvention, Failure, FailureKind, JsonRpcCall, JsonRpcError, JsonRpcErrorObject,
    JsonRpcMessage, RequestId, RequestParams, RequestWrapper, ResponseWrapper,
};

use crate::config::ServerConfig;
use crate::dispatcher::JsonRpcDispatcher;
use crate::handler::CallContext;

/// JSON-RPC server engine
#[derive(Clone)]
pub struct JsonRpcServer {
    dispatcher: Arc<JsonRpcDispatcher>,
    config: ServerConfig,
}

impl JsonRpcServer {
    pub fn new(dispatcher: JsonRpcDispatcher, config: ServerConfig) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            config,
        }
    }

    pub fn builder() -> JsonRpcServerBuilder {
        JsonRpcServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &JsonRpcDispatcher {
        &self.dispatcher
    }

    /// Process one inbound body. `None` means nothing is sent back.
    pub async fn process_inbound(&self, body: &[u8]) -> Option<Vec<u8>> {
        self.process_inbound_with_cancellation(body, CancellationToken::new())
            .await
    }

    /// As [`process_inbound`](Self::process_inbound), observing `cancellation`
    /// before each call is dispatched.
    pub async fn process_inbound_with_cancellation(
        &self,
        body: &[u8],
        cancellation: CancellationToken,
    ) -> Option<Vec<u8>> {
        let reply = self
            .handle_payload(RequestWrapper::parse(body), &cancellation)
            .await?;

        match reply.to_vec() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                error!(error = %e, "Failed to serialize JSON-RPC reply");
                let fallback = JsonRpcError::new(
                    RequestId::Null,
                    self.last_resort_error(&Failure::from(e)),
                );
                serde_json::to_vec(&fallback).ok()
            }
        }
    }

    /// Handle a classified payload.
    pub async fn handle_payload(
        &self,
        payload: RequestWrapper,
        cancellation: &CancellationToken,
    ) -> Option<ResponseWrapper> {
        let outcome = AssertUnwindSafe(self.dispatch_payload(payload, cancellation))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(Failure::from_panic(panic)));

        match outcome {
            Ok(reply) => reply,
            Err(failure) => {
                error!(error = %failure, "JSON-RPC payload processing aborted");
                Some(ResponseWrapper::Single(JsonRpcMessage::error(
                    RequestId::Null,
                    self.last_resort_error(&failure),
                )))
            }
        }
    }

    async fn dispatch_payload(
        &self,
        payload: RequestWrapper,
        cancellation: &CancellationToken,
    ) -> Result<Option<ResponseWrapper>, Failure> {
        match payload {
            RequestWrapper::Malformed(error) => {
                debug!(code = error.error.code, "Rejecting malformed payload");
                Ok(Some(ResponseWrapper::Single(error.into())))
            }
            RequestWrapper::Single(value) => {
                check_cancelled(cancellation)?;
                Ok(self
                    .handle_value(value, cancellation)
                    .await
                    .map(ResponseWrapper::Single))
            }
            RequestWrapper::Batch(items) if items.is_empty() => {
                debug!("Rejecting empty batch");
                Ok(Some(ResponseWrapper::Single(
                    JsonRpcError::invalid_request(None, Some(Value::String("empty batch".into())))
                        .into(),
                )))
            }
            RequestWrapper::Batch(items) => {
                let batch_len = items.len();
                debug!(batch_len, "Processing batch");

                // strictly sequential, in array order
                let mut responses = Vec::with_capacity(batch_len);
                for item in items {
                    check_cancelled(cancellation)?;
                    if let Some(response) = self.handle_value(item, cancellation).await {
                        responses.push(response);
                    }
                }

                if responses.is_empty() {
                    debug!(batch_len, "Batch held only notifications, no reply");
                    Ok(None)
                } else {
                    Ok(Some(ResponseWrapper::Batch(responses)))
                }
            }
        }
    }

    async fn handle_value(
        &self,
        value: Value,
        cancellation: &CancellationToken,
    ) -> Option<JsonRpcMessage> {
        match JsonRpcCall::from_value(value) {
            Ok(call) => self.handle_call(call, cancellation).await,
            Err(invalid) => {
                debug!(id = %invalid.id, "Invalid call in payload");
                Some(invalid.into())
            }
        }
    }

    /// Dispatch a single validated call. Requests always yield a response,
    /// notifications never do.
    pub async fn handle_call(
        &self,
        call: JsonRpcCall,
        cancellation: &CancellationToken,
    ) -> Option<JsonRpcMessage> {
        let convention = self
            .dispatcher
            .convention_for(call.method())
            .unwrap_or(self.config.data_convention);

        match call {
            JsonRpcCall::Request(request) => {
                let context = CallContext {
                    id: Some(request.id.clone()),
                    convention,
                    cancellation: cancellation.clone(),
                };
                let outcome = match inbound_params(request.params, convention) {
                    Ok(params) => {
                        self.dispatcher
                            .invoke_request(&request.method, params, &context)
                            .await
                    }
                    Err(failure) => Err(failure),
                };

                let message = match outcome {
                    Ok(result) => match convention.to_wire(result) {
                        Ok(result) => JsonRpcMessage::success(request.id, result),
                        Err(collision) => {
                            error!(
                                method = %request.method,
                                id = %request.id,
                                error = %collision,
                                "Result could not be renamed for the wire"
                            );
                            JsonRpcMessage::error(
                                request.id,
                                JsonRpcErrorObject::internal_error(Some(Value::String(
                                    collision.to_string(),
                                ))),
                            )
                        }
                    },
                    Err(failure) => {
                        debug!(
                            method = %request.method,
                            id = %request.id,
                            error = %failure,
                            "JSON-RPC method failed"
                        );
                        JsonRpcMessage::error(request.id, self.error_for(&failure, convention))
                    }
                };
                Some(message)
            }
            JsonRpcCall::Notification(notification) => {
                let context = CallContext {
                    id: None,
                    convention,
                    cancellation: cancellation.clone(),
                };
                let outcome = match inbound_params(notification.params, convention) {
                    Ok(params) => {
                        self.dispatcher
                            .invoke_notification(&notification.method, params, &context)
                            .await
                    }
                    Err(failure) => Err(failure),
                };

                if let Err(failure) = outcome {
                    warn!(
                        method = %notification.method,
                        error = %failure,
                        "Notification handler failed"
                    );
                }
                None
            }
        }
    }

    fn error_for(&self, failure: &Failure, convention: DataConvention) -> JsonRpcErrorObject {
        let mut error =
            failure.to_error_object(self.config.detailed_errors, &self.config.status_errors);
        if let Some(data) = error.data.take() {
            match convention.to_wire(data) {
                Ok(data) => error.data = Some(data),
                Err(collision) => {
                    error!(error = %collision, "Error data could not be renamed for the wire");
                    return JsonRpcErrorObject::internal_error(Some(Value::String(
                        collision.to_string(),
                    )));
                }
            }
        }
        error
    }

    /// Error used when a whole payload could not be processed.
    fn last_resort_error(&self, failure: &Failure) -> JsonRpcErrorObject {
        match failure.kind() {
            FailureKind::Cancelled => {
                failure.to_error_object(self.config.detailed_errors, &self.config.status_errors)
            }
            _ => JsonRpcErrorObject::internal_exception(Some(
                failure.to_data(self.config.detailed_errors),
            )),
        }
    }
}

fn check_cancelled(cancellation: &CancellationToken) -> Result<(), Failure> {
    if cancellation.is_cancelled() {
        return Err(Failure::cancelled("operation was cancelled before dispatch"));
    }
    Ok(())
}

fn inbound_params(
    params: Option<RequestParams>,
    convention: DataConvention,
) -> Result<Option<RequestParams>, Failure> {
    let Some(params) = params else {
        return Ok(None);
    };
    if convention.is_identity() {
        return Ok(Some(params));
    }
    let renamed = convention
        .from_wire(params.into_value())
        .map_err(|collision| Failure::invalid_params(collision.to_string()))?;
    // renaming keeps arrays as arrays and objects as objects
    Ok(RequestParams::from_value(renamed).unwrap_or(None))
}

/// Builder for [`JsonRpcServer`]
pub struct JsonRpcServerBuilder {
    dispatcher: JsonRpcDispatcher,
    config: ServerConfig,
}

impl JsonRpcServerBuilder {
    pub fn new() -> Self {
        Self {
            dispatcher: JsonRpcDispatcher::new(),
            config: ServerConfig::default(),
        }
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn detailed_errors(mut self, enable: bool) -> Self {
        self.config.detailed_errors = enable;
        self
    }

    pub fn data_convention(mut self, convention: DataConvention) -> Self {
        self.config.data_convention = convention;
        self
    }

    pub fn method<H>(mut self, method: impl Into<String>, handler: H) -> Self
    where
        H: crate::JsonRpcHandler + 'static,
    {
        self.dispatcher.register_method(method, handler);
        self
    }

    pub fn method_with_convention<H>(
        mut self,
        method: impl Into<String>,
        convention: DataConvention,
        handler: H,
    ) -> Self
    where
        H: crate::JsonRpcHandler + 'static,
    {
        self.dispatcher
            .register_method_with_convention(method, convention, handler);
        self
    }

    pub fn default_handler<H>(mut self, handler: H) -> Self
    where
        H: crate::JsonRpcHandler + 'static,
    {
        self.dispatcher.set_default_handler(handler);
        self
    }

    pub fn build(self) -> JsonRpcServer {
        JsonRpcServer::new(self.dispatcher, self.config)
    }
}

impl Default for JsonRpcServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
