//! Service toolkit for the feature service.
//!
//! - [`api`]: correlation ids, the `ApiError` taxonomy and its problem responses,
//!   validating extractors and the middleware stack
//! - [`config`]: layered configuration (defaults, YAML, environment)
//! - [`logging`]: `tracing` subscriber bootstrap
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod config;
pub mod logging;
pub mod result;

pub use api::{ApiError, CorrelationId, RequestContext};
pub use config::{ConfigError, RuntimeMode};
pub use result::ApiResult;

pub use apikit_errors::{ApiException, ProblemDetails};
