use apikit_errors::ValidationErrors;
use thiserror::Error;

/// Domain-specific errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Feature not found: {id}")]
    NotFound { id: i64 },

    #[error("Feature with title '{title}' not found")]
    TitleNotFound { title: String },

    #[error("Feature '{title}' already exists")]
    DuplicateTitle { title: String },

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    #[must_use]
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    #[must_use]
    pub fn title_not_found(title: impl Into<String>) -> Self {
        Self::TitleNotFound {
            title: title.into(),
        }
    }

    #[must_use]
    pub fn duplicate_title(title: impl Into<String>) -> Self {
        Self::DuplicateTitle {
            title: title.into(),
        }
    }

    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(err: anyhow::Error) -> Self {
        Self::database(format!("{err:#}"))
    }
}
