use std::io::Read;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("failed reading request body: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed request: {0}")]
    Invalid(#[from] http::Error),
}

/// Convert a `tiny_http` request into an `http::Request`, reading at most `max_body_bytes`
/// of body.
///
/// A declared `Content-Length` above the limit is rejected before reading anything.
pub fn read_request(
    req: &mut tiny_http::Request,
    max_body_bytes: usize,
) -> Result<http::Request<Vec<u8>>, RequestError> {
    if req.body_length().is_some_and(|len| len > max_body_bytes) {
        return Err(RequestError::TooLarge {
            limit: max_body_bytes,
        });
    }

    let mut body = Vec::new();
    let limit = u64::try_from(max_body_bytes)
        .unwrap_or(u64::MAX)
        .saturating_add(1);
    req.as_reader().take(limit).read_to_end(&mut body)?;
    if body.len() > max_body_bytes {
        return Err(RequestError::TooLarge {
            limit: max_body_bytes,
        });
    }

    let mut builder = http::Request::builder()
        .method(req.method().as_str())
        .uri(req.url());
    for header in req.headers() {
        builder = builder.header(header.field.as_str().as_str(), header.value.as_str());
    }
    let request = builder.body(body)?;
    debug!(
        method = %request.method(),
        uri = %request.uri(),
        body_len = request.body().len(),
        "Request read"
    );
    Ok(request)
}
