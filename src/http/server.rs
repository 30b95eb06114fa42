//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router that sends every path to the dispatcher
//! - Wire up middleware (tracing, limits, timeout, request ID)
//! - Serve a listener until shutdown is signalled

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::LimitsConfig;
use crate::http::RpcServer;

/// HTTP front end for an [`RpcServer`].
pub struct HttpServer {
    router: Router,
    rpc: Arc<RpcServer>,
}

impl HttpServer {
    /// Build the front end, taking body and timeout limits from `rpc`.
    pub fn new(rpc: Arc<RpcServer>) -> Self {
        let limits = rpc.limits().clone();
        let router = Self::build_router(rpc.clone(), &limits);
        Self { router, rpc }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(rpc: Arc<RpcServer>, limits: &LimitsConfig) -> Router {
        Router::new()
            .route("/{*path}", any(rpc_handler))
            .route("/", any(rpc_handler))
            .with_state(rpc)
            .layer(RequestBodyLimitLayer::new(limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(limits.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
    }

    /// The configured router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn rpc(&self) -> &Arc<RpcServer> {
        &self.rpc
    }

    /// Run the server until `shutdown` completes, then drain in-flight requests.
    ///
    /// Usually given [`Shutdown::signal`](crate::lifecycle::Shutdown::signal).
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            services = ?self.rpc.services().service_names(),
            content_types = ?self.rpc.codecs().content_types(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn rpc_handler(
    State(rpc): State<Arc<RpcServer>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    rpc.serve_http(&peer.to_string(), request).await
}
