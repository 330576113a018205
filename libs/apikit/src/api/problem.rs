//! Construction of client-facing problem responses.

use apikit_errors::{FieldErrors, ProblemDetails, mask_sensitive_data, resolve_error_type};
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, StatusCode};

use crate::api::correlation::{X_CORRELATION_ID, current_correlation_id};

/// Optional inputs to [`build_problem`]; anything left `None` is derived.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct ProblemOptions {
    pub error_type: Option<String>,
    pub title: Option<String>,
    pub errors: Option<FieldErrors>,
    pub correlation_id: Option<String>,
}

impl ProblemOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_errors(mut self, errors: Option<FieldErrors>) -> Self {
        self.errors = errors;
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}

/// A problem document plus the correlation id to stamp on the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemResponse {
    pub problem: ProblemDetails,
    pub correlation_id: String,
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let header = HeaderValue::from_str(&self.correlation_id).ok();
        let mut resp = self.problem.into_response();
        if let Some(value) = header {
            resp.headers_mut().insert(X_CORRELATION_ID.clone(), value);
        }
        resp
    }
}

/// Build the problem response for `status`.
///
/// Type and title default to the catalog entry for `status`; the correlation id
/// defaults to the active request scope. `detail` and every field message are
/// masked before they are placed in the document.
pub fn build_problem(status: StatusCode, detail: &str, options: ProblemOptions) -> ProblemResponse {
    let def = resolve_error_type(status);
    let correlation_id = options
        .correlation_id
        .unwrap_or_else(current_correlation_id);

    let mut problem = ProblemDetails::new(
        status,
        options.error_type.unwrap_or_else(|| def.type_url.to_owned()),
        options.title.unwrap_or_else(|| def.title.to_owned()),
        mask_sensitive_data(detail),
    )
    .with_correlation_id(&correlation_id);

    if let Some(errors) = options.errors {
        problem = problem.with_errors(mask_field_errors(errors));
    }

    ProblemResponse {
        problem,
        correlation_id,
    }
}

// Field messages may echo client input back.
fn mask_field_errors(errors: FieldErrors) -> FieldErrors {
    errors
        .into_iter()
        .map(|(field, messages)| {
            let messages = messages
                .iter()
                .map(|m| mask_sensitive_data(m).into_owned())
                .collect();
            (field, messages)
        })
        .collect()
}
