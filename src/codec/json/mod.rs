//! JSON wire format.
//!
//! # Responsibilities
//! - Decode `{"method", "params", "id"}` request envelopes
//! - Encode `{"result", "error", "id"}` response envelopes
//! - Carry structured error objects in both directions
//! - Client helpers to build requests and read responses

pub mod client;
pub mod error;
pub mod server;

pub use client::{decode_client_response, encode_client_request, ClientError};
pub use error::ErrorObject;
pub use server::{JsonCodec, JsonCodecRequest};
