//! Response handling.
//!
//! # Responsibilities
//! - Buffer status, headers and body written by the dispatcher and codecs
//! - Write plain-text transport errors
//! - Convert the buffered response into an axum `Response`
//!
//! # Design Decisions
//! - The first status written wins, as on a real connection
//! - Writing body bytes without a status commits `200 OK`
//! - A late error keeps the committed status and is appended to the body

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Buffered response that codecs write into.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Status written so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Set the status unless one was already written.
    pub fn write_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    /// Append body bytes, committing `200 OK` if no status was written.
    pub fn write(&mut self, bytes: &[u8]) {
        self.write_status(StatusCode::OK);
        self.body.extend_from_slice(bytes);
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Write a plain-text error.
    ///
    /// Status and content type only apply if nothing was committed yet.
    pub fn write_error(&mut self, status: StatusCode, message: &str) {
        if self.status.is_none() {
            self.status = Some(status);
            self.headers
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
        }
        self.body.extend_from_slice(message.as_bytes());
    }

    /// Shorthand for a response holding only a plain-text error.
    pub fn error(status: StatusCode, message: &str) -> Response {
        let mut writer = Self::new();
        writer.write_error(status, message);
        writer.into_response()
    }
}

impl std::io::Write for ResponseWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        ResponseWriter::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl IntoResponse for ResponseWriter {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_status_wins() {
        let mut writer = ResponseWriter::new();
        writer.write_status(StatusCode::CREATED);
        writer.write_status(StatusCode::BAD_REQUEST);
        assert_eq!(writer.status(), Some(StatusCode::CREATED));
    }

    #[test]
    fn test_write_commits_ok() {
        let mut writer = ResponseWriter::new();
        writer.write(b"hello");
        assert_eq!(writer.status(), Some(StatusCode::OK));
        assert_eq!(writer.body(), b"hello");
    }

    #[test]
    fn test_error_on_fresh_writer() {
        let response = ResponseWriter::error(StatusCode::FORBIDDEN, "denied");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN);
    }

    #[test]
    fn test_late_error_keeps_committed_status() {
        let mut writer = ResponseWriter::new();
        writer
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        writer.write(b"{");
        writer.write_error(StatusCode::BAD_REQUEST, "encode failed");

        assert_eq!(writer.status(), Some(StatusCode::OK));
        assert_eq!(writer.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(writer.body(), b"{encode failed");
    }
}
