//! Request lifecycle: resolve → method check → bind → interceptors → handler → respond.

use http::{Method, StatusCode};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::context::{Context, VarValue};
use crate::ids::REQUEST_ID_HEADER;
use crate::middleware::Chain;
use crate::response::Response;
use crate::router::{RouteMatch, Router};

pub const NOT_FOUND_BODY: &str = "404 - Not Found";
pub const METHOD_NOT_ALLOWED_BODY: &str = "405 - Method Not Allowed";
pub const BAD_REQUEST_BODY: &str = "400 - Bad Request";

/// How a dispatch ended. Attached to every response as an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No route accepted the path.
    NotFound,
    /// A route matched but has no handler for the method.
    MethodNotAllowed,
    /// An interceptor aborted; the handler did not run.
    Aborted,
    /// The handler ran.
    Handled,
}

/// The serving side of a router.
///
/// Obtained from [`Router::into_dispatcher`]. The table it wraps can no longer be
/// modified, so a `Dispatcher` can be cloned into as many request threads as needed.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    router: Arc<Router>,
}

impl Dispatcher {
    pub(crate) fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Run the full lifecycle for one request and return its single response.
    #[must_use]
    pub fn dispatch(&self, request: http::Request<Vec<u8>>) -> http::Response<Vec<u8>> {
        let start = Instant::now();
        let mut ctx = Context::new(request);
        let path = ctx.path().to_owned();
        let request_id = ctx.request_id();
        let method = ctx.method().clone();

        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            "Incoming request"
        );

        let outcome = self.run(&mut ctx, &path);

        let mut response = ctx.into_http_response();
        if let Some(value) = request_id.to_header_value() {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response.extensions_mut().insert(outcome);

        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            length = response.body().len(),
            outcome = ?outcome,
            duration_us = start.elapsed().as_micros() as u64,
            "Response sent"
        );
        response
    }

    /// Convenience entry point for a bodiless request.
    ///
    /// A path that is not a valid URI yields a plain-text `400 Bad Request`.
    #[must_use]
    pub fn call(&self, method: Method, path: &str) -> http::Response<Vec<u8>> {
        match http::Request::builder()
            .method(method)
            .uri(path)
            .body(Vec::new())
        {
            Ok(request) => self.dispatch(request),
            Err(e) => {
                warn!(path = %path, error = %e, "Rejecting request with invalid URI");
                Response::with_text(StatusCode::BAD_REQUEST, BAD_REQUEST_BODY).into_http()
            }
        }
    }

    fn run(&self, ctx: &mut Context, path: &str) -> Outcome {
        let Some(matched) = self.router.resolve(path) else {
            debug!(request_id = %ctx.request_id(), path = %path, "No route matched");
            ctx.response().error(NOT_FOUND_BODY, StatusCode::NOT_FOUND);
            return Outcome::NotFound;
        };
        let route = matched.route();

        let Some(handler) = route.handler(ctx.method()) else {
            debug!(
                request_id = %ctx.request_id(),
                route_pattern = %route.template(),
                method = %ctx.method(),
                "Method not allowed"
            );
            ctx.response()
                .error(METHOD_NOT_ALLOWED_BODY, StatusCode::METHOD_NOT_ALLOWED);
            return Outcome::MethodNotAllowed;
        };

        if matched.has_variables() {
            bind_variables(&matched, ctx);
        }

        debug!(
            request_id = %ctx.request_id(),
            route_pattern = %route.template(),
            "Route matched"
        );

        let chain = Chain::resolve(self.router.interceptors(), route.interceptors());
        if !chain.run(ctx) {
            return Outcome::Aborted;
        }

        match handler(ctx) {
            Some(response) if ctx.is_sent() => {
                warn!(
                    request_id = %ctx.request_id(),
                    status = response.status_code().as_u16(),
                    "Handler returned a response after sending one; discarding it"
                );
            }
            Some(response) => ctx.replace_response(response),
            None if !ctx.is_sent() && ctx.peek_response().is_untouched() => {
                warn!(
                    request_id = %ctx.request_id(),
                    path = %path,
                    "Handler produced no response, sending default"
                );
            }
            None => {}
        }
        Outcome::Handled
    }
}

fn bind_variables(matched: &RouteMatch<'_, '_>, ctx: &mut Context) {
    for (name, raw) in matched.raw_variables() {
        ctx.set_variable(name, VarValue::coerce(raw));
    }
}
