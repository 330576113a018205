//! End-to-end tests: real router, middleware stack, sea-orm on in-memory SQLite.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use apikit::RuntimeMode;
use apikit::api::{StackOptions, X_CORRELATION_ID, apply_middleware_stack};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use features::infra::storage::{connect, migrate};
use features::{FeatureService, FeaturesConfig, SeaOrmFeaturesRepository, router};
use serde_json::{Value, json};
use tower::ServiceExt as _;

async fn app(mode: RuntimeMode) -> Router {
    let db = connect("sqlite::memory:", 10).await.unwrap();
    migrate(&db).await.unwrap();

    let repo = Arc::new(SeaOrmFeaturesRepository::new(db));
    let service = Arc::new(FeatureService::new(repo, FeaturesConfig::default()));
    apply_middleware_stack(
        router(service),
        StackOptions {
            mode,
            body_limit_bytes: 1024 * 1024,
        },
    )
}

struct Reply {
    status: StatusCode,
    correlation_id: Option<String>,
    json: Value,
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let correlation_id = response
        .headers()
        .get(&X_CORRELATION_ID)
        .map(|v| v.to_str().unwrap().to_owned());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    Reply {
        status,
        correlation_id,
        json,
    }
}

#[tokio::test]
async fn crud_flow_ends_in_resource_not_found() {
    let app = app(RuntimeMode::Development).await;

    let created = call(
        &app,
        "POST",
        "/api/v1/feature/",
        Some(json!({"title": "Dark mode", "description": "Theme toggle"})),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK);
    let id = created.json["feature_id"].as_i64().unwrap();
    assert_eq!(created.json["title"], "Dark mode");

    let fetched = call(&app, "GET", &format!("/api/v1/feature/{id}"), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json, created.json);

    let updated = call(
        &app,
        "PUT",
        &format!("/api/v1/feature/{id}"),
        Some(json!({"title": "Night mode"})),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json["title"], "Night mode");
    assert_eq!(updated.json["description"], "Theme toggle");

    let deleted = call(&app, "DELETE", &format!("/api/v1/feature/{id}"), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json["title"], "Night mode");

    let gone = call(&app, "GET", &format!("/api/v1/feature/{id}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.json["title"], "Resource Not Found");
    assert_eq!(gone.json["type"], "/errors/resource-not-found");
    assert_eq!(gone.json["detail"], "Feature not found");
    let cid = gone.correlation_id.unwrap();
    assert_eq!(gone.json["instance"], format!("urn:uuid:{cid}"));
}

#[tokio::test]
async fn duplicate_titles_are_rejected() {
    let app = app(RuntimeMode::Development).await;
    let body = json!({"title": "Beta", "description": "Early access"});

    assert_eq!(
        call(&app, "POST", "/api/v1/feature", Some(body.clone())).await.status,
        StatusCode::OK
    );
    let dup = call(&app, "POST", "/api/v1/feature", Some(body)).await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.json["type"], "/errors/validation-error");
    assert_eq!(dup.json["detail"], "Feature 'Beta' already exists");

    let other = call(
        &app,
        "POST",
        "/api/v1/feature",
        Some(json!({"title": "Gamma", "description": "x"})),
    )
    .await;
    let id = other.json["feature_id"].as_i64().unwrap();
    let clash = call(
        &app,
        "PUT",
        &format!("/api/v1/feature/{id}"),
        Some(json!({"title": "Beta"})),
    )
    .await;
    assert_eq!(clash.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_and_search() {
    let app = app(RuntimeMode::Development).await;

    let empty = call(&app, "GET", "/api/v1/feature/", None).await;
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.json, json!([]));

    for title in ["A", "B", "C"] {
        call(
            &app,
            "POST",
            "/api/v1/feature/",
            Some(json!({"title": title, "description": "d"})),
        )
        .await;
    }

    let page = call(&app, "GET", "/api/v1/feature/?skip=1&limit=1", None).await;
    assert_eq!(page.json.as_array().unwrap().len(), 1);
    assert_eq!(page.json[0]["title"], "B");

    let found = call(&app, "GET", "/api/v1/feature/search?title=C", None).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.json[0]["title"], "C");

    let missing = call(&app, "GET", "/api/v1/feature/search?title=Z", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.json["detail"], "Feature with title 'Z' not found");
}

#[tokio::test]
async fn validation_failures_use_400_and_422() {
    let app = app(RuntimeMode::Production).await;

    let malformed = call(
        &app,
        "POST",
        "/api/v1/feature/",
        Some(json!({"description": "no title"})),
    )
    .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(malformed.json["detail"], "Request validation failed");
    assert_eq!(malformed.json["errors"]["body.title"], json!(["Field required"]));

    let blank = call(
        &app,
        "POST",
        "/api/v1/feature/",
        Some(json!({"title": "   ", "description": "d"})),
    )
    .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.json["detail"], "Request validation failed");
    assert!(blank.json["errors"]["body.title"].is_array());

    let too_long = call(
        &app,
        "POST",
        "/api/v1/feature/",
        Some(json!({"title": "t".repeat(256), "description": "d"})),
    )
    .await;
    assert_eq!(too_long.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(too_long.json["detail"], "Data validation failed");
    assert!(too_long.json["errors"]["title"].is_array());
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let app = app(RuntimeMode::Production).await;

    let health = call(&app, "GET", "/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.json, json!({"status": "ok"}));
    assert!(health.correlation_id.is_some());

    let unknown = call(&app, "GET", "/api/v2/nothing", None).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.json["status"], 404);
    assert!(unknown.correlation_id.is_some());
}
