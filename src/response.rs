//! Response accumulation.
//!
//! Handlers and interceptors write into a [`Response`] owned by the request
//! [`Context`](crate::Context). The dispatcher turns it into an
//! `http::Response<Vec<u8>>` exactly once when the request finishes, or earlier if a
//! handler calls [`Context::send`](crate::Context::send).

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use serde::Serialize;
use tracing::{error, warn};

/// Errors raised while emitting a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    /// The response for this request has already been handed to the hosting layer.
    #[error("response has already been sent for this request")]
    AlreadySent,
}

/// Status, headers and body accumulated for one request.
///
/// Defaults to an empty `200 OK`.
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a response with a status and a plain-text body.
    #[must_use]
    pub fn with_text(status: StatusCode, text: &str) -> Self {
        let mut response = Self::new();
        response.status(status).text(text);
        response
    }

    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// Set (replace) a header. Names or values that are not valid HTTP are dropped with a
    /// warning.
    pub fn header(&mut self, name: &str, value: &str) -> &mut Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => warn!(header = %name, "Dropping invalid response header"),
        }
        self
    }

    /// Append raw bytes to the body, optionally setting `Content-Type`.
    pub fn append_body(&mut self, bytes: &[u8], content_type: Option<&str>) -> &mut Self {
        self.body.extend_from_slice(bytes);
        if let Some(content_type) = content_type {
            self.header(CONTENT_TYPE.as_str(), content_type);
        }
        self
    }

    pub fn text(&mut self, text: &str) -> &mut Self {
        self.append_body(text.as_bytes(), Some("text/plain"))
    }

    pub fn html(&mut self, html: &str) -> &mut Self {
        self.append_body(html.as_bytes(), Some("text/html"))
    }

    /// Serialise `value` as JSON. A serialisation failure replaces the response with a
    /// `500 Internal Server Error`.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> &mut Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.append_body(&bytes, Some("application/json")),
            Err(e) => {
                error!(error = %e, "Failed to serialise JSON response body");
                self.error("Internal Server Error", StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Replace the body with a plain-text error message and set the status.
    pub fn error(&mut self, message: &str, status: StatusCode) -> &mut Self {
        self.body.clear();
        self.status(status).text(message)
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// True while nothing has been written: default status, no headers, no body.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        self.status == StatusCode::OK && self.headers.is_empty() && self.body.is_empty()
    }

    #[must_use]
    pub fn into_http(self) -> http::Response<Vec<u8>> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Values a handler may return.
///
/// `()` means the handler already wrote into the context; anything else replaces the
/// context's response.
pub trait IntoResponse {
    fn into_response(self) -> Option<Response>;
}

impl IntoResponse for () {
    fn into_response(self) -> Option<Response> {
        None
    }
}

impl IntoResponse for Response {
    fn into_response(self) -> Option<Response> {
        Some(self)
    }
}

impl IntoResponse for Option<Response> {
    fn into_response(self) -> Option<Response> {
        self
    }
}

impl<S: Into<String>> IntoResponse for (StatusCode, S) {
    fn into_response(self) -> Option<Response> {
        let (status, text) = self;
        Some(Response::with_text(status, &text.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty_ok() {
        let response = Response::new();
        assert!(response.is_untouched());
        let http = response.into_http();
        assert_eq!(http.status(), StatusCode::OK);
        assert!(http.body().is_empty());
    }

    #[test]
    fn test_error_replaces_body() {
        let mut response = Response::new();
        response.text("partial");
        response.error("404 - Not Found", StatusCode::NOT_FOUND);
        assert_eq!(response.body(), b"404 - Not Found");
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_json_sets_content_type() {
        let mut response = Response::new();
        response
            .status(StatusCode::CREATED)
            .json(&serde_json::json!({ "x": 1 }));
        let http = response.into_http();
        assert_eq!(http.status(), StatusCode::CREATED);
        assert_eq!(http.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(http.body().as_slice(), br#"{"x":1}"#);
    }

    #[test]
    fn test_invalid_header_is_dropped() {
        let mut response = Response::new();
        response.header("bad header", "x");
        assert!(response.headers().is_empty());
    }

    #[test]
    fn test_tuple_into_response() {
        let response = (StatusCode::ACCEPTED, "queued").into_response().unwrap();
        assert_eq!(response.status_code(), StatusCode::ACCEPTED);
        assert_eq!(response.body(), b"queued");
    }
}
