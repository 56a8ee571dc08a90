//! # gyr
//!
//! **gyr** is an embeddable HTTP request-dispatch engine: path templates compiled to regular
//! expressions, nestable route groups, interceptor chains and per-method handlers.
//!
//! ## Overview
//!
//! An application registers routes on a [`Router`], freezes it into a [`Dispatcher`] and feeds
//! it `http::Request<Vec<u8>>` values. Each dispatch produces exactly one
//! `http::Response<Vec<u8>>`, whatever the handlers and interceptors did.
//!
//! ## Architecture
//!
//! - **[`router`]** - Path templates, routes, groups and the ordered route table
//! - **[`dispatcher`]** - The request lifecycle: resolve, method check, bind, intercept, handle
//! - **[`context`]** - Per-request state: the request, typed path variables, the response
//! - **[`response`]** - Response builder and the [`IntoResponse`] conversions handlers use
//! - **[`middleware`]** - The [`Interceptor`] trait, chain execution and built-in interceptors
//! - **[`static_files`]** - Serving a directory through ordinary routes
//! - **[`server`]** - A `tiny_http` hosting adapter, one thread per request
//! - **[`runtime_config`]**, **[`env_file`]**, **[`logging`]** - Start-up plumbing
//! - **[`cli`]** - The `gyr` binary
//!
//! ### Request Lifecycle
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host as Host / server
//!     participant Disp as Dispatcher
//!     participant Table as Route table
//!     participant Chain as Interceptor chain
//!     participant Handler
//!
//!     Host->>Disp: dispatch(request)
//!     Disp->>Table: resolve(path)
//!     alt no route
//!         Disp-->>Host: 404 - Not Found
//!     else no handler for method
//!         Disp-->>Host: 405 - Method Not Allowed
//!     else
//!         Disp->>Disp: bind variables
//!         Disp->>Chain: global, then route interceptors
//!         alt aborted
//!             Disp-->>Host: response as left by the interceptor
//!         else
//!             Disp->>Handler: handler(ctx)
//!             Disp-->>Host: handler's response
//!         end
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use gyr::{Context, Router};
//! use http::{Method, StatusCode};
//!
//! let mut router = Router::new();
//! router.intercept(|ctx: &mut Context| {
//!     if ctx.header("x-block").is_some() {
//!         ctx.abort_with(StatusCode::FORBIDDEN, "403 - Forbidden");
//!     }
//! });
//!
//! let users = router.group("/users/:user");
//! users.path("/posts/:post").get(|ctx: &mut Context| {
//!     let user = ctx.int_variable("user").unwrap_or_default();
//!     let post = ctx.str_variable("post").unwrap_or_default().to_owned();
//!     ctx.response().text(&format!("{user}/{post}"));
//! });
//!
//! let dispatcher = router.into_dispatcher();
//!
//! let ok = dispatcher.call(Method::GET, "/users/42/posts/hello");
//! assert_eq!(ok.body(), b"42/hello");
//!
//! let missing = dispatcher.call(Method::GET, "/users/42");
//! assert_eq!(missing.status(), StatusCode::NOT_FOUND);
//! assert_eq!(missing.body(), b"404 - Not Found");
//!
//! let wrong_method = dispatcher.call(Method::POST, "/users/42/posts/hello");
//! assert_eq!(wrong_method.status(), StatusCode::METHOD_NOT_ALLOWED);
//! ```
//!
//! ## Serving
//!
//! ```rust,no_run
//! use gyr::server::HttpServer;
//! use gyr::{Context, Router};
//!
//! let mut router = Router::new();
//! router.path("/").get(|ctx: &mut Context| {
//!     ctx.response().text("hello");
//! });
//! let handle = HttpServer::new(router.into_dispatcher())
//!     .start("127.0.0.1:8080")
//!     .unwrap();
//! handle.join().unwrap();
//! ```

pub mod cli;
pub mod context;
pub mod dispatcher;
pub mod env_file;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod static_files;

pub use context::{
    BodyDecoder, BodyError, ContentType, Context, DecodeError, VarKind, VarValue, VariableError,
};
pub use dispatcher::{Dispatcher, Outcome, METHOD_NOT_ALLOWED_BODY, NOT_FOUND_BODY};
pub use ids::{RequestId, REQUEST_ID_HEADER};
pub use middleware::{Interceptor, SharedInterceptor};
pub use response::{IntoResponse, Response, ResponseError};
pub use router::{Matchable, PathPattern, Route, RouteGroup, Router};
pub use static_files::StaticFiles;
