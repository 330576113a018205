use apikit::api::{ApiError, UnhandledError};
use apikit_errors::ApiException;

use crate::domain::error::DomainError;

/// Map domain errors onto the HTTP error taxonomy so `?` works in handlers.
impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { .. } => ApiException::resource_not_found("Feature").into(),
            DomainError::TitleNotFound { .. } => ApiException::not_found(e.to_string()).into(),
            DomainError::DuplicateTitle { .. } => ApiException::validation(e.to_string()).into(),
            DomainError::Validation(errors) => ApiError::SchemaValidation(errors),
            DomainError::Database { message } => {
                ApiError::Unhandled(UnhandledError::msg("DatabaseError", message))
            }
        }
    }
}
