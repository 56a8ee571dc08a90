use http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::pattern::PathPattern;
use crate::context::Context;
use crate::middleware::{Interceptor, SharedInterceptor};
use crate::response::{IntoResponse, Response};

/// Type-erased terminal handler. `None` means the handler wrote into the context itself.
pub type Handler = Arc<dyn Fn(&mut Context) -> Option<Response> + Send + Sync>;

/// One endpoint: a compiled template, a handler per method and its local interceptors.
pub struct Route {
    pattern: PathPattern,
    handlers: HashMap<Method, Handler>,
    interceptors: Vec<SharedInterceptor>,
}

impl Route {
    /// Compile `template` and seed the interceptor list with the ones inherited from the
    /// enclosing group at registration time.
    pub(crate) fn new(template: &str, inherited: &[SharedInterceptor]) -> Self {
        Self {
            pattern: PathPattern::route(template),
            handlers: HashMap::new(),
            interceptors: inherited.to_vec(),
        }
    }

    #[must_use]
    pub fn template(&self) -> &str {
        self.pattern.source()
    }

    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    #[must_use]
    pub fn matches_path(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }

    /// Register `handler` for `method`. A second registration for the same method
    /// replaces the first.
    pub fn on<F, R>(&mut self, method: Method, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        let handler: Handler = Arc::new(move |ctx: &mut Context| handler(ctx).into_response());
        if self.handlers.insert(method.clone(), handler).is_some() {
            debug!(template = %self.template(), method = %method, "Replaced existing handler");
        }
        self
    }

    pub fn get<F, R>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        self.on(Method::GET, handler)
    }

    pub fn post<F, R>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        self.on(Method::POST, handler)
    }

    pub fn put<F, R>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        self.on(Method::PUT, handler)
    }

    pub fn delete<F, R>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        self.on(Method::DELETE, handler)
    }

    pub fn patch<F, R>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Context) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        self.on(Method::PATCH, handler)
    }

    /// Append a route-local interceptor. It runs after the router-global ones.
    pub fn intercept<I: Interceptor + 'static>(&mut self, interceptor: I) -> &mut Self {
        self.intercept_shared(Arc::new(interceptor))
    }

    pub fn intercept_shared(&mut self, interceptor: SharedInterceptor) -> &mut Self {
        self.interceptors.push(interceptor);
        self
    }

    #[must_use]
    pub fn handler(&self, method: &Method) -> Option<&Handler> {
        self.handlers.get(method)
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.handlers.keys()
    }

    #[must_use]
    pub fn interceptors(&self) -> &[SharedInterceptor] {
        &self.interceptors
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("template", &self.template())
            .field("methods", &self.handlers.keys().collect::<Vec<_>>())
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}
