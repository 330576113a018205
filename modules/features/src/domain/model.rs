/// A stored feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub feature_id: i64,
    pub title: String,
    pub description: String,
}

/// Input for creating a feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeature {
    pub title: String,
    pub description: String,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeaturePatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl FeaturePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }

    /// Apply the patch on top of `current`.
    #[must_use]
    pub fn apply_to(self, current: Feature) -> Feature {
        Feature {
            feature_id: current.feature_id,
            title: self.title.unwrap_or(current.title),
            description: self.description.unwrap_or(current.description),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn stored() -> Feature {
        Feature {
            feature_id: 7,
            title: "Dark mode".to_owned(),
            description: "Theme toggle".to_owned(),
        }
    }

    #[test]
    fn empty_patch_keeps_everything() {
        let patch = FeaturePatch::default();
        assert!(patch.is_empty());
        assert_eq!(patch.apply_to(stored()), stored());
    }

    #[test]
    fn patch_replaces_only_present_fields() {
        let patch = FeaturePatch {
            title: None,
            description: Some("Per-user theme".to_owned()),
        };
        let merged = patch.apply_to(stored());
        assert_eq!(merged.feature_id, 7);
        assert_eq!(merged.title, "Dark mode");
        assert_eq!(merged.description, "Per-user theme");
    }
}
