use std::sync::Arc;

use apikit::api::prelude::*;
use axum::extract::Extension;

use crate::api::rest::dto::{
    CreateFeatureReq, FeatureDto, FeaturePath, ListQuery, SearchQuery, UpdateFeatureReq,
};
use crate::domain::service::FeatureService;

/// Liveness check.
#[allow(clippy::unused_async)]
pub async fn health() -> JsonBody<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// List features, paged with `skip`/`limit`.
#[tracing::instrument(skip(svc, query), fields(offset = query.skip, limit = query.limit))]
pub async fn list_features(
    Extension(svc): Extension<Arc<FeatureService>>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> ApiResult<JsonBody<Vec<FeatureDto>>> {
    let features = svc.list(query.skip, query.limit).await?;
    Ok(Json(features.into_iter().map(Into::into).collect()))
}

/// Features with exactly the given title.
#[tracing::instrument(skip(svc, query), fields(title = %query.title))]
pub async fn search_features(
    Extension(svc): Extension<Arc<FeatureService>>,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> ApiResult<JsonBody<Vec<FeatureDto>>> {
    let features = svc.search(&query.title).await?;
    Ok(Json(features.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(skip(svc), fields(feature.id = path.feature_id))]
pub async fn get_feature(
    Extension(svc): Extension<Arc<FeatureService>>,
    ValidatedPath(path): ValidatedPath<FeaturePath>,
) -> ApiResult<JsonBody<FeatureDto>> {
    let feature = svc.get(path.feature_id).await?;
    Ok(Json(feature.into()))
}

#[tracing::instrument(skip(svc, req_body), fields(feature.title = %req_body.title))]
pub async fn create_feature(
    Extension(svc): Extension<Arc<FeatureService>>,
    ValidatedJson(req_body): ValidatedJson<CreateFeatureReq>,
) -> ApiResult<impl IntoResponse> {
    let feature = svc.create(req_body.into()).await?;
    Ok(ok_json(FeatureDto::from(feature)))
}

/// Partial update: fields missing from the body keep their stored values.
#[tracing::instrument(skip(svc, req_body), fields(feature.id = path.feature_id))]
pub async fn update_feature(
    Extension(svc): Extension<Arc<FeatureService>>,
    ValidatedPath(path): ValidatedPath<FeaturePath>,
    ValidatedJson(req_body): ValidatedJson<UpdateFeatureReq>,
) -> ApiResult<JsonBody<FeatureDto>> {
    let feature = svc.update(path.feature_id, req_body.into()).await?;
    Ok(Json(feature.into()))
}

/// Delete a feature and return it.
#[tracing::instrument(skip(svc), fields(feature.id = path.feature_id))]
pub async fn delete_feature(
    Extension(svc): Extension<Arc<FeatureService>>,
    ValidatedPath(path): ValidatedPath<FeaturePath>,
) -> ApiResult<JsonBody<FeatureDto>> {
    let feature = svc.delete(path.feature_id).await?;
    Ok(Json(feature.into()))
}
