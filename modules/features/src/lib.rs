//! The feature resource.
//!
//! - [`api::rest`]: axum handlers, DTOs and the router
//! - [`domain`]: model, repository port and the service holding the business rules
//! - [`infra::storage`]: sea-orm entity, repository adapter and migrations
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;

pub use api::rest::routes::router;
pub use config::FeaturesConfig;
pub use domain::model::{Feature, FeaturePatch, NewFeature};
pub use domain::service::FeatureService;
pub use infra::storage::migrations::Migrator;
pub use infra::storage::sea_orm_repo::SeaOrmFeaturesRepository;
