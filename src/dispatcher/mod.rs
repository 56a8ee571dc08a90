//! # Dispatcher Module
//!
//! Drives one request through the router.
//!
//! ## Lifecycle
//!
//! 1. Resolve the path against the route table. No match ⇒ `404 - Not Found`.
//! 2. Look up the handler for the request method. None ⇒ `405 - Method Not Allowed`;
//!    interceptors never run.
//! 3. Bind path variables into the [`Context`](crate::Context), coercing each to an
//!    integer, float, boolean or string.
//! 4. Run the interceptor chain (global, then route-local). An abort skips the handler
//!    and the response is sent as the interceptors left it.
//! 5. Invoke the handler.
//! 6. Emit exactly one response.
//!
//! Handlers may send early with [`Context::send`](crate::Context::send); whatever they
//! write or return afterwards is discarded with a warning.

mod core;

pub use core::{Dispatcher, Outcome, BAD_REQUEST_BODY, METHOD_NOT_ALLOWED_BODY, NOT_FOUND_BODY};
