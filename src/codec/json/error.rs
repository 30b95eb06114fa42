//! Structured JSON errors.

use std::fmt;

use serde_json::{Map, Value};

/// A JSON object carried in the `error` field of a response.
///
/// Service methods return it to send structured error data (code, message,
/// arbitrary payload); clients get it back from
/// [`decode_client_response`](super::decode_client_response).
#[derive(Debug, Clone)]
pub struct ErrorObject {
    object: Map<String, Value>,
    blob: String,
}

impl ErrorObject {
    /// Parse a JSON object from raw bytes.
    pub fn from_blob(blob: &[u8]) -> Result<Self, serde_json::Error> {
        let object = serde_json::from_slice(blob)?;
        Ok(Self {
            object,
            blob: String::from_utf8_lossy(blob).into_owned(),
        })
    }

    pub fn from_object(object: Map<String, Value>) -> Self {
        let blob = Value::Object(object.clone()).to_string();
        Self { object, blob }
    }

    pub fn object(&self) -> &Map<String, Value> {
        &self.object
    }

    /// The conventional `code` member, if numeric.
    pub fn code(&self) -> Option<i64> {
        self.object.get("code").and_then(Value::as_i64)
    }

    /// The conventional `message` member, if a string.
    pub fn message(&self) -> Option<&str> {
        self.object.get("message").and_then(Value::as_str)
    }
}

impl PartialEq for ErrorObject {
    fn eq(&self, other: &Self) -> bool {
        self.object == other.object
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.blob)
    }
}

impl std::error::Error for ErrorObject {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_blob() {
        let err = ErrorObject::from_blob(br#"{"code":42,"message":"this is error"}"#).unwrap();
        assert_eq!(err.code(), Some(42));
        assert_eq!(err.message(), Some("this is error"));
        assert_eq!(err.to_string(), r#"{"code":42,"message":"this is error"}"#);
    }

    #[test]
    fn test_from_blob_requires_object() {
        assert!(ErrorObject::from_blob(b"[1,2]").is_err());
        assert!(ErrorObject::from_blob(b"not json").is_err());
    }

    #[test]
    fn test_equality_by_object() {
        let a = ErrorObject::from_blob(br#"{ "code": 1, "data": {"k": [1]} }"#).unwrap();
        let Value::Object(map) = json!({"data": {"k": [1]}, "code": 1}) else {
            unreachable!()
        };
        assert_eq!(a, ErrorObject::from_object(map));
    }
}
