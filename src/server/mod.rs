//! # Server Module
//!
//! Hosts a [`Dispatcher`](crate::Dispatcher) on a TCP socket using `tiny_http`.
//!
//! The router core never touches the wire. This module converts each incoming request
//! into an `http::Request<Vec<u8>>`, hands it to the dispatcher on its own thread and
//! writes the resulting `http::Response` back.
//!
//! - Bodies larger than the configured limit are answered with `413` without dispatch.
//! - A panic escaping a handler or interceptor is answered with `500`.

mod http_server;
mod request;
mod response;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{read_request, RequestError};
pub use response::{error_response, status_reason, to_wire_response};
