//! HTTP binding for the engine.
//!
//! One POST endpoint. A reply body goes out as `200 application/json`, no
//! reply as `204 No Content`. JSON-RPC errors are still `200`.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE, HeaderValue};
use http::{Method, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::HttpServerConfig;
use crate::server::JsonRpcServer;
use crate::Result;

/// HTTP server exposing a [`JsonRpcServer`]
#[derive(Clone)]
pub struct HttpJsonRpcServer {
    config: HttpServerConfig,
    engine: Arc<JsonRpcServer>,
    shutdown: CancellationToken,
}

impl HttpJsonRpcServer {
    pub fn new(engine: JsonRpcServer, config: HttpServerConfig) -> Self {
        Self {
            config,
            engine: Arc::new(engine),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &HttpServerConfig {
        &self.config
    }

    /// Cancelling this token stops the accept loop and cancels in-flight
    /// payloads before their next call is dispatched.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Bind to the configured address and serve until shut down
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_address).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        info!("JSON-RPC server listening on {}", local_addr);
        info!("JSON-RPC endpoint available at: {}", self.config.path);

        loop {
            let (stream, peer_addr) = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("JSON-RPC server shutting down");
                    return Ok(());
                }
                accepted = listener.accept() => accepted?,
            };
            debug!("New connection from {}", peer_addr);

            let server = self.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let server = server.clone();
                    async move { Ok::<_, std::convert::Infallible>(server.handle_request(req).await) }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    if err.is_incomplete_message() {
                        debug!("Client disconnected (normal): {}", err);
                    } else {
                        error!("Error serving connection: {}", err);
                    }
                }
            });
        }
    }

    /// Route one HTTP request into the engine
    pub async fn handle_request<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        debug!("Handling {} {}", method, path);

        if path != self.config.path {
            return respond(StatusCode::NOT_FOUND, None, Bytes::from("Not Found"));
        }
        if method != Method::POST {
            let mut response = respond(
                StatusCode::METHOD_NOT_ALLOWED,
                None,
                Bytes::from("Method Not Allowed"),
            );
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("POST"));
            return response;
        }

        let limited = Limited::new(req.into_body(), self.config.max_body_size);
        let body = match limited.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
                warn!(limit = self.config.max_body_size, "Request body too large");
                return respond(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    None,
                    Bytes::from("Request body too large"),
                );
            }
            Err(err) => {
                error!("Failed to read request body: {}", err);
                return respond(
                    StatusCode::BAD_REQUEST,
                    None,
                    Bytes::from("Failed to read request body"),
                );
            }
        };

        match self
            .engine
            .process_inbound_with_cancellation(&body, self.shutdown.child_token())
            .await
        {
            Some(reply) => {
                debug!(bytes = reply.len(), "Sending JSON-RPC reply");
                respond(StatusCode::OK, Some("application/json"), Bytes::from(reply))
            }
            None => respond(StatusCode::NO_CONTENT, None, Bytes::new()),
        }
    }
}

fn respond(
    status: StatusCode,
    content_type: Option<&'static str>,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}
