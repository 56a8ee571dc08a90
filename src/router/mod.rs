//! # Router Module
//!
//! Path templates, route groups and the ordered route table.
//!
//! ## Overview
//!
//! - [`PathPattern`] compiles templates such as `/pets/:id` into anchored regular
//!   expressions and records each variable's segment index.
//! - [`Route`] binds one template to a handler per HTTP method plus local interceptors.
//! - [`RouteGroup`] mounts routes and nested groups under a prefix and seeds them with
//!   the interceptors it holds at registration time.
//! - [`Router`] owns the top-level table and the global interceptors.
//!
//! ## Matching
//!
//! Resolution is a linear walk in registration order. The first route whose pattern
//! accepts the path wins. A group whose prefix matches strips that prefix and searches
//! its children; if none of them match, the walk continues with the entries after the
//! group.
//!
//! Variable indices are relative to the template that declares them and are applied to
//! the fragment that template matched, so routes nested under any number of groups bind
//! the right segments.
//!
//! ```rust
//! use gyr::Router;
//!
//! let mut router = Router::new();
//! router.group("/group").group("/nested").path("/test");
//! router.path("/group/other");
//!
//! assert_eq!(router.find_route("/group/nested/test").map(|r| r.template()), Some("/test"));
//! // The group matches the prefix but has no such child; the later route still wins.
//! assert_eq!(router.find_route("/group/other").map(|r| r.template()), Some("/group/other"));
//! ```

mod core;
mod group;
mod pattern;
mod route;
mod table;

pub use core::{RouteSummary, Router};
pub use group::RouteGroup;
pub use pattern::{
    PathPattern, RawBindings, VariableIndexVec, MAX_INLINE_VARIABLES, VARIABLE_CLASS,
    VARIABLE_MARKER,
};
pub use route::{Handler, Route};
pub use table::{resolve, Matchable, RouteMatch};
