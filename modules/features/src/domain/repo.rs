use async_trait::async_trait;

use crate::domain::model::{Feature, NewFeature};

/// Storage port for features.
///
/// Implementations only persist; duplicate checks and validation live in the service.
#[async_trait]
pub trait FeaturesRepository: Send + Sync {
    /// Load a feature by primary key.
    async fn get(&self, feature_id: i64) -> anyhow::Result<Option<Feature>>;

    /// Page through features ordered by id.
    async fn list(&self, offset: u64, limit: u64) -> anyhow::Result<Vec<Feature>>;

    /// Insert a new row and return it with its assigned id.
    async fn create(&self, new: NewFeature) -> anyhow::Result<Feature>;

    /// Overwrite title and description of an existing row. `None` if it is gone.
    async fn update(&self, feature: Feature) -> anyhow::Result<Option<Feature>>;

    /// Delete a row and return what was stored.
    async fn delete(&self, feature_id: i64) -> anyhow::Result<Option<Feature>>;

    /// All features with exactly this title.
    async fn find_by_title(&self, title: &str) -> anyhow::Result<Vec<Feature>>;

    /// First feature with exactly this title.
    async fn get_by_title(&self, title: &str) -> anyhow::Result<Option<Feature>>;
}
