use tracing::info;

use super::Interceptor;
use crate::context::Context;

/// Logs every request that reaches the chain together with its bound variables.
pub struct TracingInterceptor;

impl Interceptor for TracingInterceptor {
    fn intercept(&self, ctx: &mut Context) {
        let variables: Vec<String> = ctx
            .variables()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        info!(
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
            variables = ?variables,
            "Request entering interceptor chain"
        );
    }
}
