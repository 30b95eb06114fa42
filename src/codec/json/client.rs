//! Client side of the JSON codec.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::codec::json::ErrorObject;

/// Errors decoding a server response.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server reported an error as a plain message.
    #[error("{0}")]
    Remote(String),

    /// The server reported a structured error object.
    #[error("{0}")]
    Object(ErrorObject),

    #[error("rpc: cannot decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Neither a result nor an error was present.
    #[error("rpc: response has no result")]
    MissingResult,
}

#[derive(Serialize)]
struct ClientRequest<'a, T> {
    method: &'a str,
    params: [&'a T; 1],
    id: u64,
}

#[derive(Deserialize)]
struct ClientResponse {
    #[serde(default, deserialize_with = "present")]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

// Keeps an explicit `null` as `Some(Value::Null)` so a missing field can be told apart.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Encode a request body for `method` with `args` as its only parameter.
pub fn encode_client_request<T>(method: &str, args: &T) -> Result<Vec<u8>, serde_json::Error>
where
    T: Serialize,
{
    serde_json::to_vec(&ClientRequest {
        method,
        params: [args],
        id: rand::random(),
    })
}

/// Decode a response body into the reply, or into the error it carries.
pub fn decode_client_response<R>(body: &[u8]) -> Result<R, ClientError>
where
    R: DeserializeOwned,
{
    let response: ClientResponse = serde_json::from_slice(body)?;
    match response.error {
        None | Some(Value::Null) => {}
        Some(Value::Object(object)) => return Err(ClientError::Object(ErrorObject::from_object(object))),
        Some(Value::String(message)) => return Err(ClientError::Remote(message)),
        Some(other) => return Err(ClientError::Remote(other.to_string())),
    }
    let result = response.result.ok_or(ClientError::MissingResult)?;
    Ok(serde_json::from_value(result)?)
}
