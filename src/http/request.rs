//! Request context handed to service methods.
//!
//! # Responsibilities
//! - Carry the peer address and request metadata into method calls
//! - Expose the request ID set by the request-ID layer
//!
//! # Design Decisions
//! - The body is owned by the codec; methods only see headers and metadata
//! - A request without an `x-request-id` header still gets a fresh UUID

use axum::http::{request::Parts, HeaderMap, Method, Uri};
use uuid::Uuid;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Per-request metadata visible to service methods.
#[derive(Debug, Clone)]
pub struct RequestContext {
    peer: String,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    request_id: String,
}

impl RequestContext {
    /// Build a context from the peer address and the request head.
    pub fn new(peer: &str, parts: &Parts) -> Self {
        let request_id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            peer: peer.to_string(),
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            headers: parts.headers.clone(),
            request_id,
        }
    }

    /// Remote address as `host:port`.
    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}
