//! Per-request correlation identifiers.
//!
//! [`correlation_middleware`] resolves the id for every request, stores a
//! [`RequestContext`] in the request extensions and in a task-local scope around
//! the downstream service, and mirrors the id onto the response. Code that has
//! no access to the request (error conversion, panic handling) reads it with
//! [`RequestContext::current`].

use std::fmt;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

use crate::api::error::{ApiError, UnhandledError};
use crate::config::RuntimeMode;

/// `X-Correlation-ID`, inbound and outbound.
pub static X_CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");

/// Value used when no request scope is active.
pub const UNKNOWN_CORRELATION_ID: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Fresh random id (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Id supplied by the client, copied verbatim.
    ///
    /// Missing, blank or non-visible-ASCII header values yield `None`.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(&X_CORRELATION_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .map(|v| Self(v.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.0).ok()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CorrelationId> for String {
    fn from(id: CorrelationId) -> Self {
        id.0
    }
}

/// Request-scoped data visible to everything running on behalf of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub correlation_id: CorrelationId,
    pub path: String,
    pub mode: RuntimeMode,
}

tokio::task_local! {
    static REQUEST_CONTEXT: RequestContext;
}

impl RequestContext {
    pub fn new(correlation_id: CorrelationId, path: impl Into<String>, mode: RuntimeMode) -> Self {
        Self {
            correlation_id,
            path: path.into(),
            mode,
        }
    }

    /// Context of the request being processed on this task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        REQUEST_CONTEXT.try_with(Clone::clone).ok()
    }

    /// Run `fut` with `self` as the current context.
    pub async fn scope<F>(self, fut: F) -> F::Output
    where
        F: Future,
    {
        REQUEST_CONTEXT.scope(self, fut).await
    }
}

/// Correlation id of the active request, or [`UNKNOWN_CORRELATION_ID`].
#[must_use]
pub fn current_correlation_id() -> String {
    REQUEST_CONTEXT
        .try_with(|ctx| ctx.correlation_id.to_string())
        .unwrap_or_else(|_| UNKNOWN_CORRELATION_ID.to_owned())
}

/// Resolve the correlation id and run the rest of the stack inside its scope.
///
/// A generated id is also written to the request headers so that inner layers
/// (the trace span in particular) see the same value as the client.
pub async fn correlation_middleware(
    State(mode): State<RuntimeMode>,
    mut req: Request,
    next: Next,
) -> Response {
    let correlation_id = match CorrelationId::from_headers(req.headers()) {
        Some(id) => id,
        None => {
            let id = CorrelationId::generate();
            if let Some(value) = id.header_value() {
                req.headers_mut().insert(X_CORRELATION_ID.clone(), value);
            }
            id
        }
    };

    let ctx = RequestContext::new(correlation_id.clone(), req.uri().path(), mode);
    req.extensions_mut().insert(ctx.clone());

    let mut response = ctx.scope(next.run(req)).await;

    if let Some(value) = correlation_id.header_value() {
        response.headers_mut().insert(X_CORRELATION_ID.clone(), value);
    }
    response
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .or_else(Self::current)
            .ok_or_else(|| {
                ApiError::Unhandled(UnhandledError::msg(
                    "MissingRequestContext",
                    "correlation middleware is not installed",
                ))
            })
    }
}
