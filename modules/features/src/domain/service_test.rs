#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::config::FeaturesConfig;
    use crate::domain::error::DomainError;
    use crate::domain::model::{Feature, FeaturePatch, NewFeature};
    use crate::domain::repo::FeaturesRepository;
    use crate::domain::service::FeatureService;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    // In-memory repository recording the page it was asked for
    #[derive(Default)]
    struct MockRepository {
        rows: Mutex<Vec<Feature>>,
        last_page: Mutex<Option<(u64, u64)>>,
        broken: bool,
    }

    impl MockRepository {
        fn with(rows: Vec<Feature>) -> Self {
            Self {
                rows: Mutex::new(rows),
                ..Self::default()
            }
        }

        fn check(&self) -> anyhow::Result<()> {
            if self.broken {
                anyhow::bail!("connection refused");
            }
            Ok(())
        }
    }

    #[async_trait]
    impl FeaturesRepository for MockRepository {
        async fn get(&self, feature_id: i64) -> anyhow::Result<Option<Feature>> {
            self.check()?;
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|f| f.feature_id == feature_id).cloned())
        }

        async fn list(&self, offset: u64, limit: u64) -> anyhow::Result<Vec<Feature>> {
            self.check()?;
            *self.last_page.lock().unwrap() = Some((offset, limit));
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .skip(usize::try_from(offset)?)
                .take(usize::try_from(limit)?)
                .cloned()
                .collect())
        }

        async fn create(&self, new: NewFeature) -> anyhow::Result<Feature> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            let feature_id = rows.iter().map(|f| f.feature_id).max().unwrap_or(0) + 1;
            let feature = Feature {
                feature_id,
                title: new.title,
                description: new.description,
            };
            rows.push(feature.clone());
            Ok(feature)
        }

        async fn update(&self, feature: Feature) -> anyhow::Result<Option<Feature>> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            Ok(rows
                .iter_mut()
                .find(|f| f.feature_id == feature.feature_id)
                .map(|slot| {
                    *slot = feature.clone();
                    feature
                }))
        }

        async fn delete(&self, feature_id: i64) -> anyhow::Result<Option<Feature>> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            let pos = rows.iter().position(|f| f.feature_id == feature_id);
            Ok(pos.map(|i| rows.remove(i)))
        }

        async fn find_by_title(&self, title: &str) -> anyhow::Result<Vec<Feature>> {
            self.check()?;
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().filter(|f| f.title == title).cloned().collect())
        }

        async fn get_by_title(&self, title: &str) -> anyhow::Result<Option<Feature>> {
            Ok(self.find_by_title(title).await?.into_iter().next())
        }
    }

    fn feature(id: i64, title: &str) -> Feature {
        Feature {
            feature_id: id,
            title: title.to_owned(),
            description: format!("{title} description"),
        }
    }

    fn service_with(repo: Arc<MockRepository>) -> FeatureService {
        FeatureService::new(repo, FeaturesConfig::default())
    }

    fn new_feature(title: &str, description: &str) -> NewFeature {
        NewFeature {
            title: title.to_owned(),
            description: description.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let repo = Arc::new(MockRepository::default());
        let svc = service_with(repo.clone());

        let created = svc.create(new_feature("Dark mode", "Theme toggle")).await.unwrap();

        assert_eq!(created.feature_id, 1);
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_title() {
        let repo = Arc::new(MockRepository::with(vec![feature(1, "Dark mode")]));
        let svc = service_with(repo);

        let err = svc
            .create(new_feature("Dark mode", "again"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::DuplicateTitle { ref title } if title == "Dark mode"));
        assert_eq!(err.to_string(), "Feature 'Dark mode' already exists");
    }

    #[tokio::test]
    async fn test_create_validates_record() {
        let svc = service_with(Arc::new(MockRepository::default()));
        let long_title = "x".repeat(256);

        let err = svc
            .create(new_feature(&long_title, "bell\u{7}"))
            .await
            .unwrap_err();

        let DomainError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        let fields = errors.to_field_errors();
        assert_eq!(
            fields["title"],
            vec!["String should have at most 255 characters".to_owned()]
        );
        assert_eq!(
            fields["description"],
            vec!["must not contain control characters".to_owned()]
        );
    }

    #[tokio::test]
    async fn test_description_may_span_lines() {
        let svc = service_with(Arc::new(MockRepository::default()));
        let created = svc
            .create(new_feature("Multiline", "first\nsecond\tindented"))
            .await
            .unwrap();
        assert_eq!(created.description, "first\nsecond\tindented");
    }

    #[tokio::test]
    async fn test_list_uses_default_and_clamps_limit() {
        let repo = Arc::new(MockRepository::default());
        let svc = service_with(repo.clone());

        svc.list(0, None).await.unwrap();
        assert_eq!(*repo.last_page.lock().unwrap(), Some((0, 100)));

        svc.list(5, Some(2)).await.unwrap();
        assert_eq!(*repo.last_page.lock().unwrap(), Some((5, 2)));

        svc.list(0, Some(50_000)).await.unwrap();
        assert_eq!(*repo.last_page.lock().unwrap(), Some((0, 1000)));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let svc = service_with(Arc::new(MockRepository::default()));
        let err = svc.get(42).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { id: 42 }));
    }

    #[tokio::test]
    async fn test_search_requires_a_match() {
        let repo = Arc::new(MockRepository::with(vec![
            feature(1, "Dark mode"),
            feature(2, "Beta"),
        ]));
        let svc = service_with(repo);

        let found = svc.search("Beta").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].feature_id, 2);

        let err = svc.search("Gamma").await.unwrap_err();
        assert_eq!(err.to_string(), "Feature with title 'Gamma' not found");
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let repo = Arc::new(MockRepository::with(vec![feature(1, "Dark mode")]));
        let svc = service_with(repo);

        let updated = svc
            .update(
                1,
                FeaturePatch {
                    title: Some("Night mode".to_owned()),
                    description: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Night mode");
        assert_eq!(updated.description, "Dark mode description");
    }

    #[tokio::test]
    async fn test_update_to_own_title_is_allowed() {
        let repo = Arc::new(MockRepository::with(vec![feature(1, "Dark mode")]));
        let svc = service_with(repo);

        let patch = FeaturePatch {
            title: Some("Dark mode".to_owned()),
            description: Some("same title".to_owned()),
        };
        assert!(svc.update(1, patch).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_to_taken_title_is_duplicate() {
        let repo = Arc::new(MockRepository::with(vec![
            feature(1, "Dark mode"),
            feature(2, "Beta"),
        ]));
        let svc = service_with(repo);

        let patch = FeaturePatch {
            title: Some("Beta".to_owned()),
            description: None,
        };
        let err = svc.update(1, patch).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateTitle { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let svc = service_with(Arc::new(MockRepository::default()));
        let patch = FeaturePatch {
            title: None,
            description: Some("x".to_owned()),
        };
        let err = svc.update(9, patch).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { id: 9 }));
    }

    #[tokio::test]
    async fn test_update_validates_merged_record() {
        let repo = Arc::new(MockRepository::with(vec![feature(1, "Dark mode")]));
        let svc = service_with(repo);

        let patch = FeaturePatch {
            title: None,
            description: Some("   ".to_owned()),
        };
        let err = svc.update(1, patch).await.unwrap_err();
        let DomainError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(
            errors.to_field_errors()["description"],
            vec!["must not be blank".to_owned()]
        );
    }

    #[tokio::test]
    async fn test_delete_returns_removed_feature() {
        let repo = Arc::new(MockRepository::with(vec![feature(3, "Dark mode")]));
        let svc = service_with(repo.clone());

        let removed = svc.delete(3).await.unwrap();
        assert_eq!(removed.title, "Dark mode");
        assert!(repo.rows.lock().unwrap().is_empty());

        let err = svc.delete(3).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { id: 3 }));
    }

    #[tokio::test]
    async fn test_storage_failure_is_database_error() {
        let repo = Arc::new(MockRepository {
            broken: true,
            ..MockRepository::default()
        });
        let svc = service_with(repo);

        let err = svc.list(0, None).await.unwrap_err();
        assert!(matches!(err, DomainError::Database { ref message } if message == "connection refused"));
    }
}
