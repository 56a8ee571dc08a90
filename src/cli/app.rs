use anyhow::{Context as _, Result};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::context::Context;
use crate::middleware::{MetricsInterceptor, TracingInterceptor};
use crate::response::Response;
use crate::router::Router;
use crate::runtime_config::RuntimeConfig;

#[derive(Debug, Deserialize, Serialize)]
struct Pet {
    name: String,
    #[serde(default)]
    tag: Option<String>,
}

/// The application served by `gyr serve`.
///
/// - `GET /` and `GET /health`
/// - `GET /metrics`: requests seen below `/api`
/// - `/api/pets` (`GET`, `POST` JSON) and `/api/pets/:id`
/// - `/api/users/:user/posts/:post`
/// - files below `static_dir`, when configured, under `static_prefix`
pub fn demo_router(config: &RuntimeConfig) -> Result<Router> {
    let mut router = Router::new();
    let metrics = Arc::new(MetricsInterceptor::new());

    router.path("/").get(|ctx: &mut Context| {
        ctx.response().html("<h1>gyr</h1>");
    });
    router.path("/health").get(|_: &mut Context| {
        let mut response = Response::new();
        response.json(&serde_json::json!({ "status": "ok" }));
        response
    });
    {
        let metrics = Arc::clone(&metrics);
        router.path("/metrics").get(move |ctx: &mut Context| {
            ctx.response()
                .text(&format!("gyr_api_requests_total {}\n", metrics.request_count()));
        });
    }

    let api = router.group("/api");
    api.intercept(TracingInterceptor).intercept_shared(metrics);

    api.path("/pets")
        .get(|ctx: &mut Context| {
            ctx.response().json(&serde_json::json!([
                { "id": 1, "name": "Rex" },
                { "id": 2, "name": "Whiskers" }
            ]));
        })
        .post(|ctx: &mut Context| match ctx.read_body::<Pet>() {
            Ok(pet) => {
                ctx.response().status(StatusCode::CREATED).json(&pet);
            }
            Err(e) => {
                ctx.response()
                    .error(&format!("400 - {e}"), StatusCode::BAD_REQUEST);
            }
        });
    api.path("/pets/:id").get(|ctx: &mut Context| match ctx.int_variable("id") {
        Ok(id) => (StatusCode::OK, format!("pet {id}")),
        Err(e) => (StatusCode::BAD_REQUEST, format!("400 - {e}")),
    });
    api.path("/users/:user/posts/:post").get(|ctx: &mut Context| {
        let user = ctx.variable("user").map(ToString::to_string).unwrap_or_default();
        let post = ctx.variable("post").map(ToString::to_string).unwrap_or_default();
        ctx.response()
            .json(&serde_json::json!({ "user": user, "post": post }));
    });

    if let Some(dir) = &config.static_dir {
        router
            .static_dir(&config.static_prefix, dir.clone())
            .with_context(|| format!("Failed to mount static directory {}", dir.display()))?;
    }

    Ok(router)
}
