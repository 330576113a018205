//! HTTP glue: correlation context, error taxonomy, problem responses,
//! validating extractors and the shared middleware stack.

pub mod correlation;
pub mod error;
pub mod extract;
pub mod layers;
pub mod problem;
pub mod response;

pub use correlation::{
    CorrelationId, RequestContext, X_CORRELATION_ID, correlation_middleware,
    current_correlation_id,
};
pub use error::{ApiError, Classification, UnhandledError, panic_response};
pub use extract::{Validate, ValidatedJson, ValidatedPath, ValidatedQuery};
pub use layers::{StackOptions, apply_middleware_stack};
pub use problem::{ProblemOptions, ProblemResponse, build_problem};

/// Prelude module that re-exports common API types for handler authors
pub mod prelude {
    pub use crate::result::ApiResult;

    pub use super::error::ApiError;
    pub use super::extract::{Validate, ValidatedJson, ValidatedPath, ValidatedQuery};
    pub use super::response::{JsonBody, ok_json};

    pub use apikit_errors::{ApiException, ValidationErrors};

    // Useful axum bits (common in handlers)
    pub use axum::{Json, http::StatusCode, response::IntoResponse};
}
