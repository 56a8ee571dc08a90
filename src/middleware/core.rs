use smallvec::SmallVec;
use std::sync::Arc;
use tracing::debug;

use crate::context::Context;

/// Most chains hold a handful of global plus local interceptors.
pub const MAX_INLINE_INTERCEPTORS: usize = 8;

/// A pre-handler step. It may write to the response and call [`Context::abort`] to stop
/// the chain; the return value carries nothing.
pub trait Interceptor: Send + Sync {
    fn intercept(&self, ctx: &mut Context);
}

impl<F> Interceptor for F
where
    F: Fn(&mut Context) + Send + Sync,
{
    fn intercept(&self, ctx: &mut Context) {
        self(ctx)
    }
}

/// Interceptors are shared between the router, groups and the routes they seed.
pub type SharedInterceptor = Arc<dyn Interceptor>;

/// The ordered steps for one dispatch: router-global first, then route-local.
///
/// Built once per request from the two frozen lists and never modified afterwards.
pub struct Chain<'a> {
    steps: SmallVec<[&'a dyn Interceptor; MAX_INLINE_INTERCEPTORS]>,
}

impl<'a> Chain<'a> {
    #[must_use]
    pub fn resolve(global: &'a [SharedInterceptor], local: &'a [SharedInterceptor]) -> Self {
        let steps = global
            .iter()
            .chain(local.iter())
            .map(|step| step.as_ref())
            .collect();
        Self { steps }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order until one aborts.
    ///
    /// Returns `true` when the chain ran to completion, `false` when the request was
    /// aborted and the handler must not run.
    pub fn run(&self, ctx: &mut Context) -> bool {
        if ctx.is_aborted() {
            return false;
        }
        for (idx, step) in self.steps.iter().enumerate() {
            step.intercept(ctx);
            if ctx.is_aborted() {
                debug!(
                    request_id = %ctx.request_id(),
                    interceptor_idx = idx,
                    interceptor_name = std::any::type_name_of_val(*step),
                    "Interceptor aborted request"
                );
                return false;
            }
        }
        true
    }
}
