use http::header::AUTHORIZATION;
use http::StatusCode;
use tracing::debug;

use super::Interceptor;
use crate::context::Context;

/// Rejects requests whose `Authorization` header does not carry the configured token,
/// either bare or as `Bearer <token>`.
pub struct AuthInterceptor {
    token: String,
}

impl AuthInterceptor {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    fn accepts(&self, header: &str) -> bool {
        let presented = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        presented == self.token
    }
}

impl Interceptor for AuthInterceptor {
    fn intercept(&self, ctx: &mut Context) {
        match ctx.header(AUTHORIZATION.as_str()) {
            Some(h) if self.accepts(h) => {}
            _ => {
                debug!(
                    request_id = %ctx.request_id(),
                    path = %ctx.path(),
                    "Rejecting unauthenticated request"
                );
                ctx.abort_with(StatusCode::UNAUTHORIZED, "401 - Unauthorized");
            }
        }
    }
}
