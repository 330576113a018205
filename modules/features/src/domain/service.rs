//! Business rules of the feature resource.
//!
//! Titles are unique across features; the check happens here rather than in the
//! schema. Every record that reaches storage passes [`FeatureService::validate_record`].

use std::sync::Arc;

use apikit_errors::ValidationErrors;

use crate::config::FeaturesConfig;
use crate::domain::error::DomainError;
use crate::domain::model::{Feature, FeaturePatch, NewFeature};
use crate::domain::repo::FeaturesRepository;

pub struct FeatureService {
    repo: Arc<dyn FeaturesRepository>,
    config: FeaturesConfig,
}

impl FeatureService {
    #[must_use]
    pub fn new(repo: Arc<dyn FeaturesRepository>, config: FeaturesConfig) -> Self {
        Self { repo, config }
    }

    #[must_use]
    pub fn config(&self) -> &FeaturesConfig {
        &self.config
    }

    /// Effective page size: the default when absent, clamped to the configured maximum.
    #[must_use]
    pub fn page_size(&self, requested: Option<u64>) -> u64 {
        requested
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size)
    }

    /// # Errors
    /// Returns `DomainError::Database` when storage fails.
    pub async fn list(&self, offset: u64, limit: Option<u64>) -> Result<Vec<Feature>, DomainError> {
        let limit = self.page_size(limit);
        tracing::debug!(offset, limit, "Listing features");

        let features = self.repo.list(offset, limit).await?;

        tracing::debug!("Listed {} features", features.len());
        Ok(features)
    }

    /// # Errors
    /// Returns `DomainError::NotFound` for an unknown id.
    pub async fn get(&self, feature_id: i64) -> Result<Feature, DomainError> {
        tracing::debug!(feature_id, "Getting feature by id");

        self.repo
            .get(feature_id)
            .await?
            .ok_or_else(|| DomainError::not_found(feature_id))
    }

    /// Features whose title matches exactly.
    ///
    /// # Errors
    /// Returns `DomainError::TitleNotFound` when nothing matches.
    pub async fn search(&self, title: &str) -> Result<Vec<Feature>, DomainError> {
        tracing::debug!(title, "Searching features by title");

        let found = self.repo.find_by_title(title).await?;
        if found.is_empty() {
            return Err(DomainError::title_not_found(title));
        }
        Ok(found)
    }

    /// # Errors
    /// Returns `DomainError::Validation` for an invalid record and
    /// `DomainError::DuplicateTitle` when the title is taken.
    pub async fn create(&self, new: NewFeature) -> Result<Feature, DomainError> {
        tracing::info!(title = %new.title, "Creating new feature");

        self.validate_record(&new.title, &new.description)?;
        self.ensure_title_available(&new.title, None).await?;

        let feature = self.repo.create(new).await?;

        tracing::info!("Successfully created feature with id={}", feature.feature_id);
        Ok(feature)
    }

    /// Partial update. The title check runs first, so a taken title wins over a missing id.
    ///
    /// # Errors
    /// `DuplicateTitle`, `NotFound` or `Validation` of the merged record.
    pub async fn update(&self, feature_id: i64, patch: FeaturePatch) -> Result<Feature, DomainError> {
        tracing::info!(feature_id, "Updating feature");

        if let Some(title) = patch.title.as_deref() {
            self.ensure_title_available(title, Some(feature_id)).await?;
        }

        let current = self.get(feature_id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let merged = patch.apply_to(current);
        self.validate_record(&merged.title, &merged.description)?;

        let updated = self
            .repo
            .update(merged)
            .await?
            .ok_or_else(|| DomainError::not_found(feature_id))?;

        tracing::info!("Successfully updated feature with id={}", updated.feature_id);
        Ok(updated)
    }

    /// Delete and return the removed feature.
    ///
    /// # Errors
    /// Returns `DomainError::NotFound` for an unknown id.
    pub async fn delete(&self, feature_id: i64) -> Result<Feature, DomainError> {
        tracing::info!(feature_id, "Deleting feature");

        let removed = self
            .repo
            .delete(feature_id)
            .await?
            .ok_or_else(|| DomainError::not_found(feature_id))?;

        tracing::info!("Successfully deleted feature with id={}", removed.feature_id);
        Ok(removed)
    }

    async fn ensure_title_available(
        &self,
        title: &str,
        owner: Option<i64>,
    ) -> Result<(), DomainError> {
        match self.repo.get_by_title(title).await? {
            Some(existing) if Some(existing.feature_id) != owner => {
                Err(DomainError::duplicate_title(title))
            }
            _ => Ok(()),
        }
    }

    /// Schema checks on a complete record, reported per field.
    ///
    /// # Errors
    /// Returns `DomainError::Validation` listing every violated rule.
    pub fn validate_record(&self, title: &str, description: &str) -> Result<(), DomainError> {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "title", title, self.config.max_title_length, false);
        check_text(
            &mut errors,
            "description",
            description,
            self.config.max_description_length,
            true,
        );
        errors.into_result().map_err(DomainError::Validation)
    }
}

fn check_text(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    max_chars: usize,
    multiline: bool,
) {
    if value.trim().is_empty() {
        errors.add(field, "must not be blank");
    }
    if value.chars().count() > max_chars {
        errors.add(
            field,
            format!("String should have at most {max_chars} characters"),
        );
    }
    let allowed = |c: char| multiline && matches!(c, '\n' | '\r' | '\t');
    if value.chars().any(|c| c.is_control() && !allowed(c)) {
        errors.add(field, "must not contain control characters");
    }
}
