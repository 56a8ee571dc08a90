use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::pattern::PathPattern;
use super::route::Route;
use super::table::{push_group, push_route, Matchable};
use crate::middleware::{Interceptor, SharedInterceptor};

/// A prefix-scoped container of routes and nested groups.
///
/// Interceptors added to a group are copied into children when those children are
/// registered. Register interceptors first; children added earlier do not see them.
pub struct RouteGroup {
    pattern: PathPattern,
    interceptors: Vec<SharedInterceptor>,
    children: Vec<Matchable>,
}

impl RouteGroup {
    pub(crate) fn new(prefix: &str, inherited: &[SharedInterceptor]) -> Self {
        Self {
            pattern: PathPattern::prefix(prefix),
            interceptors: inherited.to_vec(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        self.pattern.source()
    }

    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// True when `path` starts with the prefix and continues at a segment boundary.
    #[must_use]
    pub fn matches_path(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    /// Register a route relative to this group's prefix.
    pub fn path(&mut self, template: &str) -> &mut Route {
        debug!(prefix = %self.prefix(), template = %template, "Route registered in group");
        let route = Route::new(template, &self.interceptors);
        push_route(&mut self.children, route)
    }

    /// Register a nested group relative to this group's prefix.
    pub fn group(&mut self, prefix: &str) -> &mut RouteGroup {
        debug!(prefix = %self.prefix(), nested = %prefix, "Nested group registered");
        let group = RouteGroup::new(prefix, &self.interceptors);
        push_group(&mut self.children, group)
    }

    /// Add an interceptor for children registered from now on.
    pub fn intercept<I: Interceptor + 'static>(&mut self, interceptor: I) -> &mut Self {
        self.intercept_shared(Arc::new(interceptor))
    }

    pub fn intercept_shared(&mut self, interceptor: SharedInterceptor) -> &mut Self {
        self.interceptors.push(interceptor);
        self
    }

    #[must_use]
    pub fn children(&self) -> &[Matchable] {
        &self.children
    }
}

impl fmt::Debug for RouteGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGroup")
            .field("prefix", &self.prefix())
            .field("interceptors", &self.interceptors.len())
            .field("children", &self.children)
            .finish()
    }
}
