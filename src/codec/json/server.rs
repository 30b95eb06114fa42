//! Server side of the JSON codec.
//!
//! Request:  `{"method": "Service.Method", "params": [args], "id": any}`
//! Response: `{"result": reply, "error": null | string | object, "id": any}`

use axum::body::Bytes;
use axum::http::{header, HeaderValue, Request, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::json::ErrorObject;
use crate::codec::{BoxError, Codec, CodecRequest};
use crate::http::ResponseWriter;
use crate::registry::{ArgValue, MethodError, ReplyValue};

const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// JSON codec, typically registered for `application/json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for JsonCodec {
    fn new_request(&self, request: Request<Bytes>) -> Box<dyn CodecRequest> {
        Box::new(JsonCodecRequest::decode(request.body()))
    }
}

#[derive(Debug, Deserialize)]
struct ServerRequest {
    method: String,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
}

#[derive(Serialize)]
struct ServerResponse<'a> {
    result: Option<&'a dyn erased_serde::Serialize>,
    error: Option<Value>,
    id: &'a Value,
}

/// One decoded JSON request.
#[derive(Debug)]
pub struct JsonCodecRequest {
    request: Result<ServerRequest, serde_json::Error>,
}

impl JsonCodecRequest {
    fn decode(body: &[u8]) -> Self {
        Self {
            request: serde_json::from_slice(body),
        }
    }

    fn request(&self) -> Result<&ServerRequest, BoxError> {
        self.request
            .as_ref()
            .map_err(|e| format!("rpc: cannot decode request: {e}").into())
    }
}

impl CodecRequest for JsonCodecRequest {
    fn method(&self) -> Result<String, BoxError> {
        Ok(self.request()?.method.clone())
    }

    fn read_request(&self, args: &mut dyn ArgValue) -> Result<(), BoxError> {
        let params = self
            .request()?
            .params
            .as_ref()
            .ok_or("rpc: method request ill-formed: missing params field")?;
        let Value::Array(params) = params else {
            return Err("rpc: method request ill-formed: params must be an array".into());
        };

        // Only the first positional parameter is the argument; null keeps the zero value.
        if let Some(first) = params.first().filter(|first| !first.is_null()) {
            let mut de = <dyn erased_serde::Deserializer>::erase(first);
            args.decode(&mut de).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    fn write_response(
        &self,
        w: &mut ResponseWriter,
        reply: &dyn ReplyValue,
        error: Option<&MethodError>,
    ) -> Result<(), BoxError> {
        let id = self
            .request
            .as_ref()
            .ok()
            .and_then(|r| r.id.clone())
            .unwrap_or(Value::Null);
        let response = match error {
            None => ServerResponse {
                result: Some(reply.as_serialize()),
                error: None,
                id: &id,
            },
            Some(err) => ServerResponse {
                result: None,
                error: Some(encode_error(err)),
                id: &id,
            },
        };
        let body = serde_json::to_vec(&response)?;

        w.headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        w.write_status(StatusCode::OK);
        w.write(&body);
        Ok(())
    }
}

fn encode_error(err: &MethodError) -> Value {
    match err.downcast_ref::<ErrorObject>() {
        Some(object) => Value::Object(object.object().clone()),
        None => Value::String(err.to_string()),
    }
}
