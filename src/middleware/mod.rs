//! # Interceptors
//!
//! Interceptors run in order before the terminal handler. The router's global
//! interceptors come first, followed by those attached to the matched route (which
//! include whatever its enclosing groups had registered when the route was added).
//!
//! Any interceptor may call [`Context::abort`](crate::Context::abort). The chain stops
//! immediately, the handler is skipped and the response as it stands is sent.
//!
//! Closures `Fn(&mut Context)` are interceptors, as are the built-ins below.

mod auth;
mod core;
mod metrics;
mod tracing;

pub use auth::AuthInterceptor;
pub use core::{Chain, Interceptor, SharedInterceptor, MAX_INLINE_INTERCEPTORS};
pub use metrics::MetricsInterceptor;
pub use tracing::TracingInterceptor;
