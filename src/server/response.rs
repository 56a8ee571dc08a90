use http::StatusCode;
use std::io::Cursor;
use tracing::warn;

/// Reason phrase for `status`, falling back to an empty string for unknown codes.
pub fn status_reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("")
}

/// A plain-text error in the `"<code> - <reason>"` body style used by the dispatcher.
pub fn error_response(status: StatusCode) -> http::Response<Vec<u8>> {
    let body = format!("{} - {}", status.as_u16(), status_reason(status)).into_bytes();
    let mut response = http::Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("text/plain"),
    );
    response
}

/// Convert a dispatcher response into something `tiny_http` can write.
pub fn to_wire_response(response: http::Response<Vec<u8>>) -> tiny_http::Response<Cursor<Vec<u8>>> {
    let (parts, body) = response.into_parts();
    let mut wire = tiny_http::Response::from_data(body).with_status_code(parts.status.as_u16());
    for (name, value) in &parts.headers {
        // tiny_http computes these from the body
        if name == http::header::CONTENT_LENGTH || name == http::header::TRANSFER_ENCODING {
            continue;
        }
        match tiny_http::Header::from_bytes(name.as_str().as_bytes(), value.as_bytes()) {
            Ok(header) => wire.add_header(header),
            Err(()) => warn!(header = %name, "Dropping header tiny_http cannot encode"),
        }
    }
    wire
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(StatusCode::OK), "OK");
        assert_eq!(status_reason(StatusCode::NOT_FOUND), "Not Found");
        assert_eq!(status_reason(StatusCode::from_u16(599).unwrap()), "");
    }

    #[test]
    fn test_error_response_body() {
        let response = error_response(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.body(), b"413 - Payload Too Large");
    }

    #[test]
    fn test_to_wire_response_keeps_status() {
        let mut response = http::Response::new(b"hi".to_vec());
        *response.status_mut() = StatusCode::CREATED;
        response.headers_mut().insert("x-test", http::HeaderValue::from_static("1"));
        let wire = to_wire_response(response);
        assert_eq!(wire.status_code().0, 201);
        assert!(wire
            .headers()
            .iter()
            .any(|h| h.field.equiv("x-test") && h.value.as_str() == "1"));
    }
}
