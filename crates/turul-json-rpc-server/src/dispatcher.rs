use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::debug;

use turul_json_rpc_core::{
    DataConvention, Failure, JsonRpcErrorObject, RequestParams,
};

use crate::handler::{CallContext, JsonRpcHandler};

struct Route {
    handler: Arc<dyn JsonRpcHandler>,
    convention: Option<DataConvention>,
}

/// Method name to handler routing table
pub struct JsonRpcDispatcher {
    routes: HashMap<String, Route>,
    default_handler: Option<Arc<dyn JsonRpcHandler>>,
}

impl JsonRpcDispatcher {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            default_handler: None,
        }
    }

    /// Register a handler for a specific method
    pub fn register_method<H>(&mut self, method: impl Into<String>, handler: H)
    where
        H: JsonRpcHandler + 'static,
    {
        self.insert(method.into(), Arc::new(handler), None);
    }

    /// Register a handler whose payload uses its own naming convention
    pub fn register_method_with_convention<H>(
        &mut self,
        method: impl Into<String>,
        convention: DataConvention,
        handler: H,
    ) where
        H: JsonRpcHandler + 'static,
    {
        self.insert(method.into(), Arc::new(handler), Some(convention));
    }

    /// Register a handler for multiple methods
    pub fn register_methods<H>(&mut self, methods: Vec<String>, handler: H)
    where
        H: JsonRpcHandler + 'static,
    {
        let handler_arc: Arc<dyn JsonRpcHandler> = Arc::new(handler);
        for method in methods {
            self.insert(method, Arc::clone(&handler_arc), None);
        }
    }

    /// Register a handler under every name it reports in `supported_methods`
    pub fn register_handler<H>(&mut self, handler: H)
    where
        H: JsonRpcHandler + 'static,
    {
        let methods = handler.supported_methods();
        self.register_methods(methods, handler);
    }

    /// Set a default handler for unregistered methods
    pub fn set_default_handler<H>(&mut self, handler: H)
    where
        H: JsonRpcHandler + 'static,
    {
        self.default_handler = Some(Arc::new(handler));
    }

    fn insert(
        &mut self,
        method: String,
        handler: Arc<dyn JsonRpcHandler>,
        convention: Option<DataConvention>,
    ) {
        debug!(method = %method, "Registering JSON-RPC method");
        self.routes.insert(method, Route { handler, convention });
    }

    /// Convention registered for `method`, if it has its own
    pub fn convention_for(&self, method: &str) -> Option<DataConvention> {
        self.routes.get(method).and_then(|route| route.convention)
    }

    /// Get all registered methods
    pub fn registered_methods(&self) -> Vec<String> {
        self.routes.keys().cloned().collect()
    }

    fn handler_for(&self, method: &str) -> Option<&Arc<dyn JsonRpcHandler>> {
        self.routes
            .get(method)
            .map(|route| &route.handler)
            .or(self.default_handler.as_ref())
    }

    /// Run the handler for a request. Unknown methods fail with
    /// `Method not found`; a panicking handler is reported as a failure.
    pub async fn invoke_request(
        &self,
        method: &str,
        params: Option<RequestParams>,
        context: &CallContext,
    ) -> Result<serde_json::Value, Failure> {
        let Some(handler) = self.handler_for(method) else {
            return Err(Failure::rpc(JsonRpcErrorObject::method_not_found(Some(
                serde_json::Value::String(method.to_string()),
            ))));
        };

        AssertUnwindSafe(handler.handle(method, params, context))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(Failure::from_panic(payload)))
    }

    /// Run the handler for a notification. Unknown methods are ignored.
    pub async fn invoke_notification(
        &self,
        method: &str,
        params: Option<RequestParams>,
        context: &CallContext,
    ) -> Result<(), Failure> {
        let Some(handler) = self.handler_for(method) else {
            debug!(method = %method, "Dropping notification for unknown method");
            return Ok(());
        };

        AssertUnwindSafe(handler.handle_notification(method, params, context))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(Failure::from_panic(payload)))
    }
}

impl Default for JsonRpcDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
