use http::Method;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use super::group::RouteGroup;
use super::route::Route;
use super::table::{push_group, push_route, resolve, Matchable, RouteMatch};
use crate::dispatcher::Dispatcher;
use crate::middleware::{Interceptor, SharedInterceptor};

/// The registration surface: an ordered route table plus router-global interceptors.
///
/// Registration happens on a `Router`; serving happens on the [`Dispatcher`] returned by
/// [`Router::into_dispatcher`], which is immutable and can be shared across threads.
///
/// ```rust
/// use gyr::{Context, Router};
///
/// let mut router = Router::new();
/// router.path("/pets/:id").get(|ctx: &mut Context| {
///     let id = ctx.int_variable("id").unwrap_or_default();
///     ctx.response().text(&format!("pet {id}"));
/// });
/// let api = router.group("/api");
/// api.path("/health").get(|ctx: &mut Context| {
///     ctx.response().text("OK");
/// });
///
/// assert!(router.find_route("/api/health").is_some());
/// assert!(router.find_route("/pets/12").is_some());
/// assert!(router.find_route("/pets/12/toys").is_none());
/// ```
#[derive(Default)]
pub struct Router {
    table: Vec<Matchable>,
    interceptors: Vec<SharedInterceptor>,
}

/// One line of the route table as printed by [`Router::dump_routes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSummary {
    /// Full template including every enclosing group prefix.
    pub path: String,
    pub methods: Vec<Method>,
    pub interceptors: usize,
}

impl fmt::Display for RouteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<&str> = self.methods.iter().map(Method::as_str).collect();
        write!(
            f,
            "[route] {} {} (interceptors={})",
            if methods.is_empty() {
                String::from("-")
            } else {
                methods.join(",")
            },
            self.path,
            self.interceptors
        )
    }
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route at the top level.
    pub fn path(&mut self, template: &str) -> &mut Route {
        debug!(template = %template, "Route registered");
        push_route(&mut self.table, Route::new(template, &[]))
    }

    /// Register a group at the top level.
    pub fn group(&mut self, prefix: &str) -> &mut RouteGroup {
        debug!(prefix = %prefix, "Group registered");
        push_group(&mut self.table, RouteGroup::new(prefix, &[]))
    }

    /// Add a global interceptor. Global interceptors run before any route-local ones,
    /// for every routed request regardless of when the route was registered.
    pub fn intercept<I: Interceptor + 'static>(&mut self, interceptor: I) -> &mut Self {
        self.intercept_shared(Arc::new(interceptor))
    }

    pub fn intercept_shared(&mut self, interceptor: SharedInterceptor) -> &mut Self {
        self.interceptors.push(interceptor);
        self
    }

    #[must_use]
    pub fn interceptors(&self) -> &[SharedInterceptor] {
        &self.interceptors
    }

    #[must_use]
    pub fn entries(&self) -> &[Matchable] {
        &self.table
    }

    /// Resolve `path` to a route together with the fragments needed to bind variables.
    #[must_use]
    pub fn resolve<'r, 'p>(&'r self, path: &'p str) -> Option<RouteMatch<'r, 'p>> {
        resolve(&self.table, path)
    }

    #[must_use]
    pub fn find_route(&self, path: &str) -> Option<&Route> {
        self.resolve(path).map(|m| m.route())
    }

    /// Flattened view of the table in search order.
    #[must_use]
    pub fn route_summaries(&self) -> Vec<RouteSummary> {
        let mut out = Vec::new();
        collect_summaries(&self.table, "", &mut out);
        out
    }

    /// Print all registered routes to stdout.
    pub fn dump_routes(&self) {
        let summaries = self.route_summaries();
        println!(
            "[routes] count={} global_interceptors={}",
            summaries.len(),
            self.interceptors.len()
        );
        for summary in summaries {
            println!("{summary}");
        }
    }

    /// Freeze the table and produce a dispatcher that can be shared across threads.
    #[must_use]
    pub fn into_dispatcher(self) -> Dispatcher {
        let summaries = self.route_summaries();
        let preview: Vec<String> = summaries.iter().take(10).map(|s| s.path.clone()).collect();
        info!(
            routes_count = summaries.len(),
            global_interceptors = self.interceptors.len(),
            routes_summary = ?preview,
            "Routing table frozen"
        );
        Dispatcher::new(self)
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("table", &self.table)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

fn collect_summaries(entries: &[Matchable], prefix: &str, out: &mut Vec<RouteSummary>) {
    for entry in entries {
        match entry {
            Matchable::Route(route) => {
                let mut methods: Vec<Method> = route.methods().cloned().collect();
                methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                out.push(RouteSummary {
                    path: join_paths(prefix, route.template()),
                    methods,
                    interceptors: route.interceptors().len(),
                });
            }
            Matchable::Group(group) => {
                let nested = join_paths(prefix, group.prefix());
                collect_summaries(group.children(), nested.trim_end_matches('/'), out);
            }
        }
    }
}

fn join_paths(prefix: &str, template: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if template.starts_with('/') {
        format!("{prefix}{template}")
    } else {
        format!("{prefix}/{template}")
    }
}
