use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use turul_json_rpc_core::{DataConvention, Failure, RequestId, RequestParams};

/// Per-call information handed to handlers
#[derive(Debug, Clone)]
pub struct CallContext {
    /// `None` for notifications
    pub id: Option<RequestId>,
    /// Convention the payload arrived in; params are already snake_case
    pub convention: DataConvention,
    /// Fires when the inbound operation is abandoned
    pub cancellation: CancellationToken,
}

impl CallContext {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Trait for handling JSON-RPC method calls
#[async_trait]
pub trait JsonRpcHandler: Send + Sync {
    /// Handle a request. Params have been renamed into snake_case; the result
    /// is renamed into the method's convention by the engine.
    async fn handle(
        &self,
        method: &str,
        params: Option<RequestParams>,
        context: &CallContext,
    ) -> Result<Value, Failure>;

    /// Handle a notification. Defaults to running `handle` and dropping the result.
    async fn handle_notification(
        &self,
        method: &str,
        params: Option<RequestParams>,
        context: &CallContext,
    ) -> Result<(), Failure> {
        self.handle(method, params, context).await.map(|_| ())
    }

    /// List supported methods (optional - used for introspection)
    fn supported_methods(&self) -> Vec<String> {
        vec![]
    }
}

/// A closure-based handler
pub struct FunctionHandler<F> {
    handler_fn: F,
    methods: Vec<String>,
}

impl<F, Fut> FunctionHandler<F>
where
    F: Fn(Option<RequestParams>, CallContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, Failure>> + Send,
{
    pub fn new(handler_fn: F) -> Self {
        Self {
            handler_fn,
            methods: vec![],
        }
    }

    pub fn with_methods(mut self, methods: Vec<String>) -> Self {
        self.methods = methods;
        self
    }
}

#[async_trait]
impl<F, Fut> JsonRpcHandler for FunctionHandler<F>
where
    F: Fn(Option<RequestParams>, CallContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, Failure>> + Send,
{
    async fn handle(
        &self,
        _method: &str,
        params: Option<RequestParams>,
        context: &CallContext,
    ) -> Result<Value, Failure> {
        (self.handler_fn)(params, context.clone()).await
    }

    fn supported_methods(&self) -> Vec<String> {
        self.methods.clone()
    }
}

/// Handler with typed params and result.
///
/// Params that do not deserialize into `P` fail with `Invalid params`.
/// Absent params deserialize from `null`, so `()` and `Option<T>` accept them.
pub struct TypedHandler<P, R, F> {
    handler_fn: F,
    _marker: PhantomData<fn(P) -> R>,
}

impl<P, R, F, Fut> TypedHandler<P, R, F>
where
    P: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
    F: Fn(P, CallContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, Failure>> + Send,
{
    pub fn new(handler_fn: F) -> Self {
        Self {
            handler_fn,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<P, R, F, Fut> JsonRpcHandler for TypedHandler<P, R, F>
where
    P: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
    F: Fn(P, CallContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, Failure>> + Send,
{
    async fn handle(
        &self,
        _method: &str,
        params: Option<RequestParams>,
        context: &CallContext,
    ) -> Result<Value, Failure> {
        let raw = params.map(RequestParams::into_value).unwrap_or(Value::Null);
        let typed: P = serde_json::from_value(raw).map_err(|e| {
            Failure::invalid_params(e.to_string()).with_type_name("InvalidParams")
        })?;

        let result = (self.handler_fn)(typed, context.clone()).await?;
        Ok(serde_json::to_value(result)?)
    }
}
