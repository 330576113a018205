//! Core error types for the feature service
//!
//! This crate provides pure data types for error handling, with no dependencies
//! on HTTP frameworks unless the `axum` feature is enabled. It includes:
//! - RFC 7807 Problem Details (`ProblemDetails`)
//! - Typed application errors (`ApiException`)
//! - The status → (type, title) catalog (`ErrorTypeDef`)
//! - Field-level validation errors (`ValidationErrors`)
//! - Sensitive data masking for client-visible text
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod catalog;
pub mod exception;
pub mod masking;
pub mod problem;
pub mod validation;

pub use catalog::{ERROR_TYPE_MAP, ErrorTypeDef, lookup_error_type, resolve_error_type};
pub use exception::ApiException;
pub use masking::{SENSITIVE_PATTERNS, SensitivePattern, mask_optional, mask_sensitive_data};
pub use problem::{APPLICATION_PROBLEM_JSON, FieldErrors, ProblemDetails, instance_uri};
pub use validation::{FieldViolation, ValidationErrors};
