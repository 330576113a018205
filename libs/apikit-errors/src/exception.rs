//! Explicit application errors that describe their own problem type

use http::StatusCode;

use crate::catalog::{
    AUTHENTICATION_REQUIRED, INSUFFICIENT_PERMISSIONS, INTERNAL_ERROR, RATE_LIMIT_EXCEEDED,
    RESOURCE_NOT_FOUND, VALIDATION_ERROR,
};
use crate::problem::FieldErrors;

/// Typed application error carrying its own status, problem type and title.
///
/// `detail` is stored unmasked so that it can be logged verbatim; masking
/// happens when the client-facing document is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{error_type} ({status}): {detail}")]
#[must_use]
pub struct ApiException {
    pub status: StatusCode,
    pub error_type: String,
    pub title: String,
    pub detail: String,
    pub errors: Option<FieldErrors>,
}

impl ApiException {
    pub fn new(
        status: StatusCode,
        error_type: impl Into<String>,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status,
            error_type: error_type.into(),
            title: title.into(),
            detail: detail.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }

    /// 400 Bad Request.
    pub fn validation(detail: impl Into<String>) -> Self {
        VALIDATION_ERROR.as_exception(detail)
    }

    /// 401 Unauthorized.
    pub fn authentication(detail: impl Into<String>) -> Self {
        AUTHENTICATION_REQUIRED.as_exception(detail)
    }

    /// 403 Forbidden.
    pub fn authorization(detail: impl Into<String>) -> Self {
        INSUFFICIENT_PERMISSIONS.as_exception(detail)
    }

    /// 404 Not Found.
    pub fn not_found(detail: impl Into<String>) -> Self {
        RESOURCE_NOT_FOUND.as_exception(detail)
    }

    /// 404 Not Found with the conventional "<resource> not found" detail.
    pub fn resource_not_found(resource: &str) -> Self {
        RESOURCE_NOT_FOUND.as_exception(format!("{resource} not found"))
    }

    /// 429 Too Many Requests.
    pub fn rate_limited(detail: impl Into<String>) -> Self {
        RATE_LIMIT_EXCEEDED.as_exception(detail)
    }

    /// 500 Internal Server Error.
    pub fn internal(detail: impl Into<String>) -> Self {
        INTERNAL_ERROR.as_exception(detail)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn constructors_use_catalog_entries() {
        let cases = [
            (ApiException::validation("x"), 400, "/errors/validation-error"),
            (
                ApiException::authentication("x"),
                401,
                "/errors/authentication-required",
            ),
            (
                ApiException::authorization("x"),
                403,
                "/errors/insufficient-permissions",
            ),
            (ApiException::not_found("x"), 404, "/errors/resource-not-found"),
            (
                ApiException::rate_limited("x"),
                429,
                "/errors/rate-limit-exceeded",
            ),
            (ApiException::internal("x"), 500, "/errors/internal-error"),
        ];

        for (exc, status, type_url) in cases {
            assert_eq!(exc.status.as_u16(), status);
            assert_eq!(exc.error_type, type_url);
        }
    }

    #[test]
    fn resource_not_found_builds_detail() {
        let exc = ApiException::resource_not_found("Feature");
        assert_eq!(exc.detail, "Feature not found");
        assert_eq!(exc.title, "Resource Not Found");
    }

    #[test]
    fn display_keeps_unmasked_detail() {
        let exc = ApiException::validation("password=hunter2 rejected");
        assert!(exc.to_string().contains("hunter2"));
    }
}
