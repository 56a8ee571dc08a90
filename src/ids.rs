//! Request ids carried in the `x-request-id` header.
//!
//! A caller that already sends a ULID in that header keeps it; everyone else gets a fresh
//! one. The id is echoed on every response, including 404 and 405.

use http::header::{HeaderMap, HeaderValue};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// The id named by `x-request-id`, or a fresh one when the header is absent or is not
    /// a ULID.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Header form; a ULID is always 26 visible ASCII characters.
    #[must_use]
    pub fn to_header_value(self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.0.to_string()).ok()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(RequestId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_incoming_id_is_kept() {
        let id = RequestId::new();
        let headers = headers_with(&id.to_string());
        assert_eq!(RequestId::from_headers(&headers), id);
        assert_eq!(id.to_header_value().unwrap(), id.to_string().as_str());
    }

    #[test]
    fn test_missing_or_malformed_id_is_replaced() {
        let from_junk = RequestId::from_headers(&headers_with("not-a-ulid"));
        let from_nothing = RequestId::from_headers(&HeaderMap::new());
        assert_ne!(from_junk, from_nothing);
        assert_eq!(from_junk.to_string().len(), 26);
    }
}
