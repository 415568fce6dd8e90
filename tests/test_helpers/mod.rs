//! Shared fixtures for the integration tests
//!
//! An in-memory transport lets the client engine talk to the server engine
//! without a network, plus a small demo server with methods that succeed,
//! fail and record their side effects.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use turul_json_rpc_client::{JsonRpcClientResult, Transport};
use turul_json_rpc_server::{
    CallContext, DataConvention, Failure, FunctionHandler, JsonRpcServer, RequestParams,
    TypedHandler,
};

/// Passes bodies straight into a [`JsonRpcServer`]
#[derive(Clone)]
pub struct InMemoryTransport {
    server: JsonRpcServer,
    bodies: Arc<Mutex<Vec<Value>>>,
}

impl InMemoryTransport {
    pub fn new(server: JsonRpcServer) -> Self {
        Self {
            server,
            bodies: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every body sent so far, decoded
    pub fn bodies(&self) -> Vec<Value> {
        self.bodies.lock().unwrap().clone()
    }

    fn record(&self, body: &[u8]) {
        if let Ok(value) = serde_json::from_slice(body) {
            self.bodies.lock().unwrap().push(value);
        }
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, body: Vec<u8>) -> JsonRpcClientResult<Vec<u8>> {
        self.record(&body);
        Ok(self.server.process_inbound(&body).await.unwrap_or_default())
    }

    async fn notify(&self, body: Vec<u8>) -> JsonRpcClientResult<()> {
        self.record(&body);
        self.server.process_inbound(&body).await;
        Ok(())
    }

    fn endpoint(&self) -> String {
        "memory://json-rpc".to_string()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("the demo method always fails")]
pub struct DemoFailure;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddParams {
    pub a: i64,
    pub b: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub display_name: String,
}

/// Methods: `ping`, `add`, `fail`, `missing_user`, `record`, `profile.echo`
/// (camelCase payloads). `record` appends its first param to the returned log.
pub fn demo_server(detailed_errors: bool) -> (JsonRpcServer, Arc<Mutex<Vec<Value>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&log);

    let server = JsonRpcServer::builder()
        .detailed_errors(detailed_errors)
        .method(
            "ping",
            TypedHandler::new(|_: (), _ctx| async { Ok::<_, Failure>("pong") }),
        )
        .method(
            "add",
            TypedHandler::new(|p: AddParams, _ctx| async move { Ok::<_, Failure>(p.a + p.b) }),
        )
        .method("fail", FunctionHandler::new(always_fails))
        .method("missing_user", FunctionHandler::new(missing_user))
        .method(
            "record",
            FunctionHandler::new(move |params: Option<RequestParams>, _ctx: CallContext| {
                let log = Arc::clone(&recorder);
                async move {
                    let entry = params
                        .and_then(|p| p.get_index(0).cloned())
                        .unwrap_or(Value::Null);
                    log.lock().unwrap().push(entry.clone());
                    Ok::<_, Failure>(entry)
                }
            }),
        )
        .method_with_convention(
            "profile.echo",
            DataConvention::CamelCase,
            TypedHandler::new(|profile: UserProfile, _ctx| async move {
                Ok::<_, Failure>(profile)
            }),
        )
        .build();

    (server, log)
}

async fn always_fails(_params: Option<RequestParams>, _ctx: CallContext) -> Result<Value, Failure> {
    Err(DemoFailure.into())
}

async fn missing_user(_params: Option<RequestParams>, _ctx: CallContext) -> Result<Value, Failure> {
    Err(Failure::not_found("user 42 does not exist"))
}

/// Install a test subscriber once; `RUST_LOG` controls the output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
