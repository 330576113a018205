//! Ergonomic result type for API handlers

use crate::api::error::ApiError;

/// Standard result type for API operations
///
/// ```ignore
/// async fn handler() -> ApiResult<Json<Feature>> {
///     let feature = service.get(id).await?; // DomainError -> ApiError
///     Ok(Json(feature))
/// }
/// ```
///
/// `ApiError` implements `IntoResponse`, so Axum renders the error as a problem
/// document without further work in the handler.
pub type ApiResult<T = ()> = Result<T, ApiError>;
