use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router};

use crate::api::rest::handlers;
use crate::domain::service::FeatureService;

/// Collection path of the feature resource.
pub const BASE_PATH: &str = "/api/v1/feature";

/// All feature routes plus `/health`, with the service attached as an extension.
#[must_use]
pub fn router(service: Arc<FeatureService>) -> Router {
    let collection = get(handlers::list_features).post(handlers::create_feature);

    Router::new()
        .route("/health", get(handlers::health))
        .route(BASE_PATH, collection.clone())
        .route(&format!("{BASE_PATH}/"), collection)
        .route(&format!("{BASE_PATH}/search"), get(handlers::search_features))
        .route(
            &format!("{BASE_PATH}/{{feature_id}}"),
            get(handlers::get_feature)
                .put(handlers::update_feature)
                .delete(handlers::delete_feature),
        )
        .layer(Extension(service))
}
