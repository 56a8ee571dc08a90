use gyr::middleware::{AuthInterceptor, MetricsInterceptor, TracingInterceptor};
use gyr::{Context, Outcome, Router};
use http::{Method, StatusCode};
use std::sync::Arc;

mod tracing_util;
use tracing_util::TestTracing;

fn get(path: &str, auth: Option<&str>) -> http::Request<Vec<u8>> {
    let mut builder = http::Request::builder().method(Method::GET).uri(path);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Vec::new()).unwrap()
}

#[test]
fn test_metrics_interceptor_counts() {
    let metrics = Arc::new(MetricsInterceptor::new());
    let mut router = Router::new();
    router.intercept_shared(Arc::<MetricsInterceptor>::clone(&metrics));
    router.path("/pets/:id").get(|ctx: &mut Context| {
        ctx.response().text("pet");
    });
    let dispatcher = router.into_dispatcher();

    for _ in 0..3 {
        assert_eq!(dispatcher.call(Method::GET, "/pets/1").status(), StatusCode::OK);
    }
    assert_eq!(
        dispatcher.call(Method::GET, "/missing").status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(metrics.request_count(), 3);
}

#[test]
fn test_auth_interceptor_on_group() {
    let metrics = Arc::new(MetricsInterceptor::new());
    let mut router = Router::new();
    router.path("/public").get(|ctx: &mut Context| {
        ctx.response().text("open");
    });
    let private = router.group("/private");
    private
        .intercept(AuthInterceptor::new("s3cret"))
        .intercept_shared(Arc::<MetricsInterceptor>::clone(&metrics));
    private.path("/data").get(|ctx: &mut Context| {
        ctx.response().text("classified");
    });
    let dispatcher = router.into_dispatcher();

    let response = dispatcher.dispatch(get("/public", None));
    assert_eq!(response.status(), StatusCode::OK);

    let response = dispatcher.dispatch(get("/private/data", None));
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.body(), b"401 - Unauthorized");
    assert_eq!(
        response.extensions().get::<Outcome>(),
        Some(&Outcome::Aborted)
    );

    let response = dispatcher.dispatch(get("/private/data", Some("Bearer wrong")));
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = dispatcher.dispatch(get("/private/data", Some("Bearer s3cret")));
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.body(), b"classified");

    // Only the authorised request got past the auth step.
    assert_eq!(metrics.request_count(), 1);
}

#[test]
fn test_tracing_interceptor_logs_variables() {
    let tracing = TestTracing::init();
    let mut router = Router::new();
    router.intercept(TracingInterceptor);
    router.path("/users/:id").get(|_: &mut Context| {});

    let response = router.into_dispatcher().call(Method::GET, "/users/99");
    assert_eq!(response.status(), StatusCode::OK);

    let logs = tracing.logs.contents();
    assert!(logs.contains("Request entering interceptor chain"));
    assert!(logs.contains("id=99"));
}

#[test]
fn test_abort_logged_with_index() {
    let tracing = TestTracing::init();
    let mut router = Router::new();
    router.intercept(|_: &mut Context| {});
    router.intercept(|ctx: &mut Context| ctx.abort());
    router.path("/").get(|_: &mut Context| {});

    let _ = router.into_dispatcher().call(Method::GET, "/");
    let logs = tracing.logs.contents();
    assert!(logs.contains("Interceptor aborted request"));
    assert!(logs.contains("interceptor_idx=1"));
}
