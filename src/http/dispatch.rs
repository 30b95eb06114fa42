//! Request dispatch.
//!
//! # Responsibilities
//! - Own the codec registry, service registry and access filter
//! - Run one request through admission, negotiation, resolution,
//!   decoding, invocation and encoding
//! - Map transport failures to plain-text 4xx responses
//!
//! # Design Decisions
//! - Terminal at the first failure; nothing is retried or aggregated
//! - Application errors from a method are encoded by the codec, never by HTTP status
//! - Configuration happens through `&mut self` before the server is shared

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::codec::{normalize_content_type, Codec, CodecRegistry};
use crate::config::{LimitsConfig, RpcConfig};
use crate::http::{RequestContext, ResponseWriter};
use crate::observability::metrics;
use crate::registry::{RegistryError, Service, ServiceRegistry};
use crate::security::{AccessError, AccessFilter};

/// RPC server: registries plus the per-request dispatch state machine.
#[derive(Debug)]
pub struct RpcServer {
    codecs: CodecRegistry,
    services: ServiceRegistry,
    filter: AccessFilter,
    limits: LimitsConfig,
}

impl Default for RpcServer {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcServer {
    pub fn new() -> Self {
        Self {
            codecs: CodecRegistry::new(),
            services: ServiceRegistry::new(),
            filter: AccessFilter::new(),
            limits: LimitsConfig::default(),
        }
    }

    /// Apply limits and allow-list from configuration.
    pub fn configure(&mut self, config: &RpcConfig) -> Result<(), AccessError> {
        self.limits = config.limits.clone();
        self.filter = AccessFilter::from_config(&config.access)?;
        Ok(())
    }

    /// Register a codec for a content type.
    ///
    /// The codec is chosen from the request's `Content-Type` header,
    /// ignoring parameters such as `charset`.
    pub fn register_codec<C>(&mut self, codec: C, content_type: &str)
    where
        C: Codec + 'static,
    {
        self.codecs.register(codec, content_type);
    }

    /// Register a service under `name`, or under its type name if empty.
    pub fn register_service<S: Service>(
        &mut self,
        receiver: Arc<S>,
        name: &str,
    ) -> Result<(), RegistryError> {
        self.services.register(receiver, name)
    }

    /// True if `Service.Method` is registered.
    pub fn has_method(&self, method: &str) -> bool {
        self.services.has_method(method)
    }

    /// Accept requests only from these IPs.
    pub fn bind<I>(&mut self, allow: I)
    where
        I: IntoIterator<Item = IpAddr>,
    {
        self.filter.bind(allow);
    }

    /// Accept requests only from local interface addresses.
    pub fn bind_local(&mut self) -> Result<(), AccessError> {
        self.filter.bind_local()
    }

    /// Request limits, shared with the HTTP layers built by `HttpServer`.
    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    pub fn set_limits(&mut self, limits: LimitsConfig) {
        self.limits = limits;
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    pub fn codecs(&self) -> &CodecRegistry {
        &self.codecs
    }

    pub fn filter(&self) -> &AccessFilter {
        &self.filter
    }

    /// Handle one HTTP request from `peer` (`host:port`).
    pub async fn serve_http(&self, peer: &str, request: Request<Body>) -> Response {
        let start = Instant::now();
        let mut resolved = None;
        let response = self.dispatch(peer, request, &mut resolved).await;
        metrics::record_request(
            resolved.as_deref().unwrap_or("unresolved"),
            response.status().as_u16(),
            start,
        );
        response
    }

    async fn dispatch(
        &self,
        peer: &str,
        request: Request<Body>,
        resolved: &mut Option<String>,
    ) -> Response {
        if let Err(err) = self.filter.check(peer) {
            tracing::warn!(peer = %peer, error = %err, "Remote client rejected");
            return ResponseWriter::error(StatusCode::FORBIDDEN, &err.to_string());
        }

        if request.method() != Method::POST {
            let message = format!("rpc: POST method required, received {}", request.method());
            return ResponseWriter::error(StatusCode::METHOD_NOT_ALLOWED, &message);
        }

        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let Some(codec) = self.codecs.get(content_type) else {
            let message = format!(
                "rpc: unrecognized Content-Type: {}",
                normalize_content_type(content_type)
            );
            return ResponseWriter::error(StatusCode::UNSUPPORTED_MEDIA_TYPE, &message);
        };

        let (parts, body) = request.into_parts();
        let ctx = RequestContext::new(peer, &parts);
        let body = match axum::body::to_bytes(body, self.limits.max_body_bytes).await {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(request_id = %ctx.request_id(), error = %err, "Failed to read request body");
                let message = format!("rpc: cannot read request body: {err}");
                return ResponseWriter::error(StatusCode::BAD_REQUEST, &message);
            }
        };
        let codec_request = codec.new_request(Request::from_parts(parts, body));

        let method_name = match codec_request.method() {
            Ok(name) => name,
            Err(err) => return bad_request(&ctx, "Failed to read method name", &err.to_string()),
        };
        let (service, method) = match self.services.resolve(&method_name) {
            Ok(found) => found,
            Err(err) => return bad_request(&ctx, "Failed to resolve method", &err.to_string()),
        };
        *resolved = Some(method_name);

        let mut args = method.new_args();
        if let Err(err) = codec_request.read_request(&mut *args) {
            return bad_request(&ctx, "Failed to decode arguments", &err.to_string());
        }

        let mut reply = method.new_reply();
        let outcome = service.call(method, &ctx, &*args, &mut *reply);
        if let Err(err) = &outcome {
            tracing::debug!(
                request_id = %ctx.request_id(),
                service = service.name(),
                method = method.name(),
                error = %err,
                "Method returned an error"
            );
        }

        let mut writer = ResponseWriter::new();
        writer.headers_mut().insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
        if let Err(err) = codec_request.write_response(&mut writer, &*reply, outcome.as_ref().err()) {
            tracing::warn!(request_id = %ctx.request_id(), error = %err, "Failed to encode response");
            writer.write_error(StatusCode::BAD_REQUEST, &err.to_string());
        }
        writer.into_response()
    }
}

fn bad_request(ctx: &RequestContext, event: &str, message: &str) -> Response {
    tracing::debug!(request_id = %ctx.request_id(), peer = %ctx.peer(), error = %message, "{event}");
    ResponseWriter::error(StatusCode::BAD_REQUEST, message)
}
