use serde::{Deserialize, Serialize};

/// Tunables of the feature resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Page size used when a list request carries no `limit`.
    pub default_page_size: u64,
    /// Upper bound a requested `limit` is clamped to.
    pub max_page_size: u64,
    pub max_title_length: usize,
    pub max_description_length: usize,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            default_page_size: 100,
            max_page_size: 1000,
            max_title_length: 255,
            max_description_length: 4096,
        }
    }
}
