//! Per-request state handed to interceptors and handlers.
//!
//! A [`Context`] is created fresh for every dispatch and owned by the thread serving that
//! request. It carries the request itself, the variables bound from the path, the
//! response under construction and the abort latch.

use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::ids::RequestId;
use crate::response::{Response, ResponseError};

/// Which of the four variable shapes a value has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Int,
    Float,
    Bool,
    Str,
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VarKind::Int => "integer",
            VarKind::Float => "float",
            VarKind::Bool => "boolean",
            VarKind::Str => "string",
        };
        f.write_str(name)
    }
}

/// A value in the request's variable bag.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl VarValue {
    /// Infer a value from a raw path segment: integer, then float, then the exact tokens
    /// `true`/`false`, else the raw string.
    ///
    /// The float step accepts decimal and exponent forms, hex floats with a binary
    /// exponent (`0x1p-2`) and the words `inf`, `infinity` and `nan` in any case. A finite
    /// literal too large for `f64` stays a string.
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        if let Ok(value) = raw.parse::<i64>() {
            return VarValue::Int(value);
        }
        if let Some(value) = parse_float(raw) {
            return VarValue::Float(value);
        }
        match raw {
            "true" => VarValue::Bool(true),
            "false" => VarValue::Bool(false),
            _ => VarValue::Str(raw.to_owned()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> VarKind {
        match self {
            VarValue::Int(_) => VarKind::Int,
            VarValue::Float(_) => VarKind::Float,
            VarValue::Bool(_) => VarKind::Bool,
            VarValue::Str(_) => VarKind::Str,
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Int(v) => write!(f, "{v}"),
            VarValue::Float(v) => write!(f, "{v}"),
            VarValue::Bool(v) => write!(f, "{v}"),
            VarValue::Str(v) => f.write_str(v),
        }
    }
}

impl From<i64> for VarValue {
    fn from(value: i64) -> Self {
        VarValue::Int(value)
    }
}

impl From<f64> for VarValue {
    fn from(value: f64) -> Self {
        VarValue::Float(value)
    }
}

impl From<bool> for VarValue {
    fn from(value: bool) -> Self {
        VarValue::Bool(value)
    }
}

impl From<String> for VarValue {
    fn from(value: String) -> Self {
        VarValue::Str(value)
    }
}

impl From<&str> for VarValue {
    fn from(value: &str) -> Self {
        VarValue::Str(value.to_owned())
    }
}

fn parse_float(raw: &str) -> Option<f64> {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    if unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity") {
        return raw.parse::<f64>().ok();
    }
    if raw.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    let value = match unsigned.get(..2) {
        Some("0x" | "0X") => {
            let magnitude = parse_hex_float(&unsigned[2..])?;
            if raw.starts_with('-') {
                -magnitude
            } else {
                magnitude
            }
        }
        _ => raw.parse::<f64>().ok()?,
    };
    // Overflow to infinity (`1e400`) or a stray `nan` spelling is out of range.
    value.is_finite().then_some(value)
}

/// `<hex digits>[.<hex digits>]p<exponent>`, the part after `0x`.
fn parse_hex_float(body: &str) -> Option<f64> {
    let (mantissa, exponent) = body.split_once(['p', 'P'])?;
    let exponent: i32 = exponent.parse().ok()?;
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut value = 0.0_f64;
    for c in int_part.chars().chain(frac_part.chars()) {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let frac_digits = i32::try_from(frac_part.len()).ok()?;
    let scale = exponent.checked_sub(frac_digits.checked_mul(4)?)?;
    Some(value * 2.0_f64.powi(scale))
}

/// Failure of a typed variable accessor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariableError {
    #[error("variable `{0}` is not set")]
    Missing(String),
    #[error("variable `{name}` holds a {found}, not a {expected}")]
    WrongKind {
        name: String,
        expected: VarKind,
        found: VarKind,
    },
}

/// Error type a [`BodyDecoder`] reports.
pub type DecodeError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to decode the request body.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("cannot decode a body with content type `{0}` and no fallback decoder is set")]
    UnsupportedContentType(String),
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid XML body: {0}")]
    Xml(#[from] quick_xml::DeError),
    #[error("fallback decoder failed: {0}")]
    Fallback(#[source] DecodeError),
}

/// Decodes bodies whose content type has no built-in decoder.
///
/// The decoder produces a JSON value; [`Context::read_body`] then deserialises the
/// caller's type from it. Closures of the right shape implement this trait.
pub trait BodyDecoder: Send + Sync {
    fn decode(
        &self,
        content_type: &ContentType,
        body: &[u8],
    ) -> Result<serde_json::Value, DecodeError>;
}

impl<F> BodyDecoder for F
where
    F: Fn(&ContentType, &[u8]) -> Result<serde_json::Value, DecodeError> + Send + Sync,
{
    fn decode(
        &self,
        content_type: &ContentType,
        body: &[u8],
    ) -> Result<serde_json::Value, DecodeError> {
        self(content_type, body)
    }
}

/// A parsed `Content-Type` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentType {
    /// Lower-cased mime type, e.g. `application/json`.
    pub mime_type: String,
    pub charset: Option<String>,
    pub boundary: Option<String>,
}

impl ContentType {
    #[must_use]
    pub fn parse(header: &str) -> Self {
        let mut parts = header.split(';');
        let mime_type = parts
            .next()
            .map(|m| m.trim().to_ascii_lowercase())
            .unwrap_or_default();

        let mut content_type = ContentType {
            mime_type,
            ..ContentType::default()
        };
        for directive in parts {
            let Some((key, value)) = directive.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').to_owned();
            match key.trim().to_ascii_lowercase().as_str() {
                "charset" => content_type.charset = Some(value),
                "boundary" => content_type.boundary = Some(value),
                _ => {}
            }
        }
        content_type
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mime_type == "application/json" || self.mime_type.ends_with("+json")
    }

    #[must_use]
    pub fn is_xml(&self) -> bool {
        matches!(self.mime_type.as_str(), "application/xml" | "text/xml")
            || self.mime_type.ends_with("+xml")
    }
}

/// State for a single request.
pub struct Context {
    request: http::Request<Vec<u8>>,
    request_id: RequestId,
    path: String,
    variables: HashMap<String, VarValue>,
    response: Response,
    aborted: bool,
    delivered: Option<http::Response<Vec<u8>>>,
    fallback_decoder: Option<Arc<dyn BodyDecoder>>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("request", &self.request)
            .field("request_id", &self.request_id)
            .field("path", &self.path)
            .field("variables", &self.variables)
            .field("response", &self.response)
            .field("aborted", &self.aborted)
            .field("sent", &self.delivered.is_some())
            .field("fallback_decoder", &self.fallback_decoder.is_some())
            .finish()
    }
}

impl Context {
    #[must_use]
    pub fn new(request: http::Request<Vec<u8>>) -> Self {
        let request_id = RequestId::from_headers(request.headers());
        let path = decode_path(request.uri().path());
        Self {
            request,
            request_id,
            path,
            variables: HashMap::new(),
            response: Response::new(),
            aborted: false,
            delivered: None,
            fallback_decoder: None,
        }
    }

    #[must_use]
    pub fn request(&self) -> &http::Request<Vec<u8>> {
        &self.request
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// Percent-decoded request path without the query string. Routes match against this.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The path exactly as it appeared on the request line.
    #[must_use]
    pub fn raw_path(&self) -> &str {
        self.request.uri().path()
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.request.uri().query()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// Header value as text; values that are not visible ASCII are treated as absent.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        self.request.body()
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.header(CONTENT_TYPE.as_str())
            .map(ContentType::parse)
            .unwrap_or_default()
    }

    /// Decode the body as JSON. Only `application/json` (and `+json`) bodies are accepted.
    pub fn read_json<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        let content_type = self.content_type();
        if !content_type.is_json() {
            return Err(BodyError::UnsupportedContentType(content_type.mime_type));
        }
        Ok(serde_json::from_slice(self.body())?)
    }

    /// Decode the body according to its content type: JSON, then XML (`application/xml`,
    /// `text/xml`, `+xml`), then the fallback decoder if one is set.
    pub fn read_body<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        let content_type = self.content_type();
        if content_type.is_json() {
            return Ok(serde_json::from_slice(self.body())?);
        }
        if content_type.is_xml() {
            return Ok(quick_xml::de::from_reader(self.body())?);
        }
        match &self.fallback_decoder {
            Some(decoder) => {
                let value = decoder
                    .decode(&content_type, self.body())
                    .map_err(BodyError::Fallback)?;
                Ok(serde_json::from_value(value)?)
            }
            None => Err(BodyError::UnsupportedContentType(content_type.mime_type)),
        }
    }

    /// Decoder used by [`read_body`](Self::read_body) for content types it does not know.
    pub fn set_fallback_decoder(&mut self, decoder: Arc<dyn BodyDecoder>) {
        self.fallback_decoder = Some(decoder);
    }

    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<VarValue>) {
        self.variables.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&VarValue> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &VarValue)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn int_variable(&self, name: &str) -> Result<i64, VariableError> {
        match self.lookup(name)? {
            VarValue::Int(v) => Ok(*v),
            other => Err(wrong_kind(name, VarKind::Int, other)),
        }
    }

    pub fn float_variable(&self, name: &str) -> Result<f64, VariableError> {
        match self.lookup(name)? {
            VarValue::Float(v) => Ok(*v),
            other => Err(wrong_kind(name, VarKind::Float, other)),
        }
    }

    pub fn bool_variable(&self, name: &str) -> Result<bool, VariableError> {
        match self.lookup(name)? {
            VarValue::Bool(v) => Ok(*v),
            other => Err(wrong_kind(name, VarKind::Bool, other)),
        }
    }

    pub fn str_variable(&self, name: &str) -> Result<&str, VariableError> {
        match self.lookup(name)? {
            VarValue::Str(v) => Ok(v.as_str()),
            other => Err(wrong_kind(name, VarKind::Str, other)),
        }
    }

    fn lookup(&self, name: &str) -> Result<&VarValue, VariableError> {
        self.variables
            .get(name)
            .ok_or_else(|| VariableError::Missing(name.to_owned()))
    }

    /// The response under construction.
    pub fn response(&mut self) -> &mut Response {
        &mut self.response
    }

    #[must_use]
    pub fn peek_response(&self) -> &Response {
        &self.response
    }

    pub(crate) fn replace_response(&mut self, response: Response) {
        self.response = response;
    }

    /// Stop the interceptor chain; the handler will not run. There is no way back.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    /// Write a plain-text error response and abort.
    pub fn abort_with(&mut self, status: StatusCode, message: &str) {
        self.response.error(message, status);
        self.abort();
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Hand the current response to the hosting layer now instead of after the handler
    /// returns. Anything written to the context afterwards is discarded.
    pub fn send(&mut self) -> Result<(), ResponseError> {
        if self.delivered.is_some() {
            warn!(request_id = %self.request_id, "Response already sent; ignoring second send");
            return Err(ResponseError::AlreadySent);
        }
        let response = std::mem::take(&mut self.response);
        self.delivered = Some(response.into_http());
        Ok(())
    }

    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.delivered.is_some()
    }

    /// Consume the context and produce the one response for this request.
    pub(crate) fn into_http_response(mut self) -> http::Response<Vec<u8>> {
        match self.delivered.take() {
            Some(delivered) => {
                if !self.response.is_untouched() {
                    warn!(
                        request_id = %self.request_id,
                        "Response modified after it was sent; changes discarded"
                    );
                }
                delivered
            }
            None => self.response.into_http(),
        }
    }
}

/// Escapes that decode to invalid UTF-8 leave the path as received.
fn decode_path(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            debug!(path = %raw, error = %e, "Path is not UTF-8 once decoded; matching it raw");
            raw.to_owned()
        }
    }
}

fn wrong_kind(name: &str, expected: VarKind, found: &VarValue) -> VariableError {
    VariableError::WrongKind {
        name: name.to_owned(),
        expected,
        found: found.kind(),
    }
}
