use std::sync::atomic::{AtomicUsize, Ordering};

use super::Interceptor;
use crate::context::Context;

/// Counts the requests that reached this point of the chain.
///
/// Register it globally to count every routed request, or on a route or group to count
/// only that subtree. Requests aborted by an earlier interceptor are not counted.
#[derive(Default)]
pub struct MetricsInterceptor {
    request_count: AtomicUsize,
}

impl MetricsInterceptor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }
}

impl Interceptor for MetricsInterceptor {
    fn intercept(&self, _ctx: &mut Context) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }
}
