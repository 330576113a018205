//! Middleware stack shared by every router of the service.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use http::StatusCode;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::api::correlation::{X_CORRELATION_ID, correlation_middleware};
use crate::api::error::{ApiError, panic_response};
use crate::config::RuntimeMode;

/// Settings the middleware stack depends on.
#[derive(Debug, Clone, Copy)]
pub struct StackOptions {
    pub mode: RuntimeMode,
    pub body_limit_bytes: usize,
}

/// Unmatched route.
#[allow(clippy::unused_async)]
pub async fn not_found_fallback() -> ApiError {
    ApiError::http(StatusCode::NOT_FOUND, "Not Found")
}

/// Matched route, unsupported method.
#[allow(clippy::unused_async)]
pub async fn method_not_allowed_fallback() -> ApiError {
    ApiError::http(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

/// Apply all middleware layers to a fully assembled router.
///
/// Runtime execution order (outermost -> innermost):
/// correlation -> trace -> catch panic -> body limit -> router.
/// Fallbacks are installed here so that they run inside the same stack.
pub fn apply_middleware_stack(router: Router, options: StackOptions) -> Router {
    let router = router
        .fallback(not_found_fallback)
        .method_not_allowed_fallback(method_not_allowed_fallback);

    // 4) Body limit
    let router = router.layer(DefaultBodyLimit::max(options.body_limit_bytes));

    // 3) Panics become unhandled errors inside the correlation scope
    let router = router.layer(CatchPanicLayer::custom(panic_response));

    // 2) Trace
    let router = apply_trace_layer(router);

    // 1) Correlation id (registered last, runs first)
    router.layer(from_fn_with_state(options.mode, correlation_middleware))
}

fn apply_trace_layer(router: Router) -> Router {
    use tracing::field::Empty;

    router.layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &axum::http::Request<axum::body::Body>| {
                let cid = req
                    .headers()
                    .get(&X_CORRELATION_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("n/a");

                tracing::info_span!(
                    "http_request",
                    method = %req.method(),
                    uri = %req.uri().path(),
                    version = ?req.version(),
                    correlation_id = %cid,
                    status = Empty,
                    latency_ms = Empty,
                )
            })
            .on_response(
                |res: &axum::http::Response<axum::body::Body>,
                 latency: std::time::Duration,
                 span: &tracing::Span| {
                    span.record("status", res.status().as_u16());
                    span.record("latency_ms", latency.as_millis());
                },
            )
            // 5xx responses are already logged by the error pipeline
            .on_failure(()),
    )
}
