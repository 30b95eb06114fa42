//! Codec subsystem.
//!
//! # Data Flow
//! ```text
//! Content-Type header
//!     → normalize (drop parameters, lower-case)
//!     → CodecRegistry lookup → Codec
//!     → Codec::new_request → CodecRequest (one per HTTP request)
//!         method()          → "Service.Method"
//!         read_request()    → fills the argument slot
//!         write_response()  → reply or error envelope
//! ```
//!
//! # Design Decisions
//! - Codecs never see concrete argument/reply types, only erased serde values
//! - Application errors are handed to the codec, which owns their encoding

pub mod json;

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::Request;

use crate::http::ResponseWriter;
use crate::registry::{ArgValue, MethodError, ReplyValue};

/// Error type for codec operations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Creates a [`CodecRequest`] for each HTTP request of its content type.
pub trait Codec: Send + Sync {
    fn new_request(&self, request: Request<Bytes>) -> Box<dyn CodecRequest>;
}

/// Decodes one request and encodes its response in a specific wire format.
pub trait CodecRequest: Send {
    /// The dotted `Service.Method` name. Must not prevent a later
    /// [`read_request`](Self::read_request).
    fn method(&self) -> Result<String, BoxError>;

    /// Fill the method argument from the request body.
    fn read_request(&self, args: &mut dyn ArgValue) -> Result<(), BoxError>;

    /// Write the response for `reply`, or for `error` if the method failed.
    fn write_response(
        &self,
        w: &mut ResponseWriter,
        reply: &dyn ReplyValue,
        error: Option<&MethodError>,
    ) -> Result<(), BoxError>;
}

/// Codecs keyed by normalized content type.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn Codec>>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `codec` for `content_type`, replacing any previous codec.
    pub fn register<C>(&mut self, codec: C, content_type: &str)
    where
        C: Codec + 'static,
    {
        let content_type = normalize_content_type(content_type);
        tracing::info!(content_type = %content_type, "Codec registered");
        self.codecs.insert(content_type, Arc::new(codec));
    }

    /// Look up the codec for a raw `Content-Type` header value.
    pub fn get(&self, content_type: &str) -> Option<&Arc<dyn Codec>> {
        self.codecs.get(&normalize_content_type(content_type))
    }

    pub fn content_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.codecs.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("content_types", &self.content_types())
            .finish()
    }
}

/// Strip parameters (`; charset=...`) and lower-case a content type.
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}
