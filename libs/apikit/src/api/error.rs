//! Error taxonomy of the HTTP layer and its single conversion into problem responses.
//!
//! Every failure a handler, extractor or middleware can produce is an [`ApiError`].
//! Converting one into a response logs it exactly once and builds exactly one
//! problem document; the variant decides the log level, the status and how much
//! of the failure reaches the client.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;

use apikit_errors::catalog::{INTERNAL_ERROR, VALIDATION_ERROR};
use apikit_errors::{ApiException, FieldErrors, ValidationErrors, resolve_error_type};
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::api::correlation::RequestContext;
use crate::api::problem::{ProblemOptions, ProblemResponse, build_problem};
use crate::config::RuntimeMode;

pub const REQUEST_VALIDATION_DETAIL: &str = "Request validation failed";
pub const SCHEMA_VALIDATION_DETAIL: &str = "Data validation failed";
pub const PRODUCTION_INTERNAL_DETAIL: &str = "An internal server error occurred";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Application error describing its own status, type and title.
    #[error(transparent)]
    Api(#[from] ApiException),
    /// The request could not be turned into typed input (400).
    #[error("request validation failed: {0}")]
    RequestValidation(ValidationErrors),
    /// The resulting record violates the domain schema (422).
    #[error("data validation failed: {0}")]
    SchemaValidation(ValidationErrors),
    /// Transport-level failure with an arbitrary status.
    #[error("{status}: {detail}")]
    Http { status: StatusCode, detail: String },
    /// Anything else. Always 500.
    #[error("{0}")]
    Unhandled(UnhandledError),
}

/// An unexpected failure together with the name of its concrete type.
pub struct UnhandledError {
    pub type_name: String,
    pub source: anyhow::Error,
}

impl UnhandledError {
    pub fn new<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            type_name: short_type_name::<E>().to_owned(),
            source: anyhow::Error::new(err),
        }
    }

    pub fn msg(type_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            type_name: type_name.into(),
            source: anyhow::anyhow!("{message}"),
        }
    }

    /// Wrap a payload caught from a panicking handler.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else {
            "panic with a non-string payload".to_owned()
        };
        Self::msg("Panic", message)
    }
}

impl fmt::Debug for UnhandledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnhandledError")
            .field("type_name", &self.type_name)
            .field("source", &self.source)
            .finish()
    }
}

impl fmt::Display for UnhandledError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.source)
    }
}

/// Last path segment of a type name, without generic arguments.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Status, problem type and title an error maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'a> {
    pub status: StatusCode,
    pub error_type: Cow<'a, str>,
    pub title: Cow<'a, str>,
}

impl ApiError {
    pub fn unhandled<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unhandled(UnhandledError::new(err))
    }

    pub fn http(status: StatusCode, detail: impl Into<String>) -> Self {
        Self::Http {
            status,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn classify(&self) -> Classification<'_> {
        match self {
            Self::Api(exc) => Classification {
                status: exc.status,
                error_type: Cow::Borrowed(&exc.error_type),
                title: Cow::Borrowed(&exc.title),
            },
            Self::RequestValidation(_) => Classification {
                status: StatusCode::BAD_REQUEST,
                error_type: Cow::Borrowed(VALIDATION_ERROR.type_url),
                title: Cow::Borrowed(VALIDATION_ERROR.title),
            },
            Self::SchemaValidation(_) => Classification {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error_type: Cow::Borrowed(VALIDATION_ERROR.type_url),
                title: Cow::Borrowed(VALIDATION_ERROR.title),
            },
            Self::Http { status, .. } => {
                let def = resolve_error_type(*status);
                Classification {
                    status: *status,
                    error_type: Cow::Borrowed(def.type_url),
                    title: Cow::Borrowed(def.title),
                }
            }
            Self::Unhandled(_) => Classification {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error_type: Cow::Borrowed(INTERNAL_ERROR.type_url),
                title: Cow::Borrowed(INTERNAL_ERROR.title),
            },
        }
    }

    /// Log this error and build its problem response.
    ///
    /// Without a request context the correlation id is `unknown` and the mode is
    /// treated as production.
    pub fn into_problem(self, ctx: Option<&RequestContext>) -> ProblemResponse {
        let Classification {
            status,
            error_type,
            title,
        } = self.classify();
        let options = ProblemOptions::new()
            .with_error_type(error_type.into_owned())
            .with_title(title.into_owned());
        let options = match ctx {
            Some(ctx) => options.with_correlation_id(ctx.correlation_id.as_str()),
            None => options,
        };

        let (detail, errors) = self.log_and_describe(ctx);
        build_problem(status, &detail, options.with_errors(errors))
    }

    fn log_and_describe(self, ctx: Option<&RequestContext>) -> (String, Option<FieldErrors>) {
        let path = ctx.map_or("unknown", |c| c.path.as_str());
        let correlation_id = ctx.map_or("unknown", |c| c.correlation_id.as_str());
        let mode = ctx.map_or(RuntimeMode::Production, |c| c.mode);

        match self {
            Self::Api(exc) => {
                tracing::error!(
                    error_type = %exc.error_type,
                    status = exc.status.as_u16(),
                    detail = %exc.detail,
                    path,
                    correlation_id,
                    "API exception"
                );
                (exc.detail, exc.errors)
            }
            Self::RequestValidation(errs) => {
                let errors = errs.to_field_errors();
                tracing::warn!(errors = ?errors, path, correlation_id, "Request validation error");
                (REQUEST_VALIDATION_DETAIL.to_owned(), Some(errors))
            }
            Self::SchemaValidation(errs) => {
                let errors = errs.to_field_errors();
                tracing::warn!(errors = ?errors, path, correlation_id, "Data validation error");
                (SCHEMA_VALIDATION_DETAIL.to_owned(), Some(errors))
            }
            Self::Http { status, detail } => {
                tracing::warn!(
                    status = status.as_u16(),
                    detail = %detail,
                    path,
                    correlation_id,
                    "HTTP error"
                );
                (detail, None)
            }
            Self::Unhandled(err) => {
                tracing::error!(
                    error_type = %err.type_name,
                    error = %err.source,
                    backtrace = %err.source.backtrace(),
                    path,
                    correlation_id,
                    "Unhandled exception"
                );
                let detail = if mode.is_production() {
                    PRODUCTION_INTERNAL_DETAIL.to_owned()
                } else {
                    err.to_string()
                };
                (detail, None)
            }
        }
    }
}

impl From<UnhandledError> for ApiError {
    fn from(err: UnhandledError) -> Self {
        Self::Unhandled(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ctx = RequestContext::current();
        self.into_problem(ctx.as_ref()).into_response()
    }
}

/// `CatchPanicLayer` hook: a panicking handler becomes an unhandled error.
#[allow(clippy::needless_pass_by_value)] // signature fixed by tower-http
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::Unhandled(UnhandledError::from_panic(payload.as_ref())).into_response()
}
