use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

use crate::domain::model::{Feature, NewFeature};
use crate::domain::repo::FeaturesRepository;

use super::entity::{self, Column, Entity as FeatureEntity};

pub struct SeaOrmFeaturesRepository {
    db: DatabaseConnection,
}

impl SeaOrmFeaturesRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FeaturesRepository for SeaOrmFeaturesRepository {
    async fn get(&self, feature_id: i64) -> anyhow::Result<Option<Feature>> {
        let found = FeatureEntity::find_by_id(feature_id).one(&self.db).await?;
        Ok(found.map(Into::into))
    }

    async fn list(&self, offset: u64, limit: u64) -> anyhow::Result<Vec<Feature>> {
        let rows = FeatureEntity::find()
            .order_by_asc(Column::FeatureId)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, new: NewFeature) -> anyhow::Result<Feature> {
        let model = entity::ActiveModel {
            feature_id: ActiveValue::NotSet,
            title: ActiveValue::Set(new.title),
            description: ActiveValue::Set(new.description),
        }
        .insert(&self.db)
        .await?;
        Ok(model.into())
    }

    async fn update(&self, feature: Feature) -> anyhow::Result<Option<Feature>> {
        let active = entity::ActiveModel {
            feature_id: ActiveValue::Unchanged(feature.feature_id),
            title: ActiveValue::Set(feature.title),
            description: ActiveValue::Set(feature.description),
        };

        match active.update(&self.db).await {
            Ok(model) => Ok(Some(model.into())),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, feature_id: i64) -> anyhow::Result<Option<Feature>> {
        let txn = self.db.begin().await?;

        let Some(found) = FeatureEntity::find_by_id(feature_id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(None);
        };
        FeatureEntity::delete_by_id(feature_id).exec(&txn).await?;
        txn.commit().await?;

        Ok(Some(found.into()))
    }

    async fn find_by_title(&self, title: &str) -> anyhow::Result<Vec<Feature>> {
        let rows = FeatureEntity::find()
            .filter(Column::Title.eq(title))
            .order_by_asc(Column::FeatureId)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_by_title(&self, title: &str) -> anyhow::Result<Option<Feature>> {
        let found = FeatureEntity::find()
            .filter(Column::Title.eq(title))
            .order_by_asc(Column::FeatureId)
            .one(&self.db)
            .await?;
        Ok(found.map(Into::into))
    }
}
