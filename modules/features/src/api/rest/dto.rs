use apikit::api::Validate;
use apikit_errors::ValidationErrors;
use serde::{Deserialize, Serialize};

use crate::domain::model::{Feature, FeaturePatch, NewFeature};

const MIN_LENGTH: &str = "String should have at least 1 character";
const NOT_BLANK: &str = "String should not be blank";

/// REST DTO for a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDto {
    pub feature_id: i64,
    pub title: String,
    pub description: String,
}

impl From<Feature> for FeatureDto {
    fn from(f: Feature) -> Self {
        Self {
            feature_id: f.feature_id,
            title: f.title,
            description: f.description,
        }
    }
}

/// Body of `POST /api/v1/feature/`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFeatureReq {
    pub title: String,
    pub description: String,
}

impl Validate for CreateFeatureReq {
    fn validate(&self, errors: &mut ValidationErrors) {
        require_text(errors, "title", &self.title);
        require_text(errors, "description", &self.description);
    }
}

impl From<CreateFeatureReq> for NewFeature {
    fn from(req: CreateFeatureReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
        }
    }
}

/// Body of `PUT /api/v1/feature/{feature_id}`; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFeatureReq {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for UpdateFeatureReq {
    fn validate(&self, errors: &mut ValidationErrors) {
        if let Some(title) = &self.title {
            require_text(errors, "title", title);
        }
        if let Some(description) = &self.description {
            require_text(errors, "description", description);
        }
    }
}

impl From<UpdateFeatureReq> for FeaturePatch {
    fn from(req: UpdateFeatureReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
        }
    }
}

fn require_text(errors: &mut ValidationErrors, field: &str, value: &str) {
    if value.is_empty() {
        errors.add(field, MIN_LENGTH);
    } else if value.trim().is_empty() {
        errors.add(field, NOT_BLANK);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default, alias = "offset")]
    pub skip: u64,
    #[serde(default)]
    pub limit: Option<u64>,
}

impl Validate for ListQuery {
    fn validate(&self, _errors: &mut ValidationErrors) {}
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub title: String,
}

impl Validate for SearchQuery {
    fn validate(&self, _errors: &mut ValidationErrors) {}
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FeaturePath {
    pub feature_id: i64,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn empty_strings_are_rejected_on_create() {
        let req = CreateFeatureReq {
            title: String::new(),
            description: String::new(),
        };
        let mut errors = ValidationErrors::new();
        req.validate(&mut errors);

        let fields = errors.to_field_errors();
        assert_eq!(fields["title"], vec![MIN_LENGTH.to_owned()]);
        assert_eq!(fields["description"], vec![MIN_LENGTH.to_owned()]);
    }

    #[test]
    fn whitespace_only_strings_are_rejected() {
        let req = CreateFeatureReq {
            title: "   ".to_owned(),
            description: "\t\n".to_owned(),
        };
        let mut errors = ValidationErrors::new();
        req.validate(&mut errors);

        let fields = errors.to_field_errors();
        assert_eq!(fields["title"], vec![NOT_BLANK.to_owned()]);
        assert_eq!(fields["description"], vec![NOT_BLANK.to_owned()]);

        let patch = UpdateFeatureReq {
            title: Some(" ".to_owned()),
            description: None,
        };
        let mut errors = ValidationErrors::new();
        patch.validate(&mut errors);
        assert_eq!(errors.to_field_errors()["title"], vec![NOT_BLANK.to_owned()]);
    }

    #[test]
    fn absent_update_fields_are_not_checked() {
        let req = UpdateFeatureReq {
            title: None,
            description: Some("new text".to_owned()),
        };
        let mut errors = ValidationErrors::new();
        req.validate(&mut errors);
        assert!(errors.is_empty());

        let patch: FeaturePatch = req.into();
        assert_eq!(patch.title, None);
        assert_eq!(patch.description.as_deref(), Some("new text"));
    }

    #[test]
    fn dto_serializes_all_fields() {
        let dto = FeatureDto::from(Feature {
            feature_id: 3,
            title: "Beta".to_owned(),
            description: "Early access".to_owned(),
        });
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"feature_id": 3, "title": "Beta", "description": "Early access"})
        );
    }
}
