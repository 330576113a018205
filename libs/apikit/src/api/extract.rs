//! Extractors that report malformed input as request validation errors.
//!
//! Body, query and path failures all end up as [`ApiError::RequestValidation`]
//! with field keys prefixed by their location (`body.title`, `query.limit`,
//! `path.feature_id`).

use std::fmt;

use apikit_errors::{FieldViolation, ValidationErrors};
use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use serde::de::DeserializeOwned;
use serde_path_to_error::Segment;

use crate::api::error::ApiError;

/// Message used for absent required fields.
pub const FIELD_REQUIRED: &str = "Field required";

/// Checks on parsed input that serde cannot express.
pub trait Validate {
    fn validate(&self, errors: &mut ValidationErrors);
}

/// JSON body, deserialized with field paths and then [`Validate`]d.
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct ValidatedJson<T>(pub T);

/// Query string, deserialized with field paths and then [`Validate`]d.
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct ValidatedQuery<T>(pub T);

/// Path parameters; parse failures are reported per parameter.
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct ValidatedPath<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Err(body_error("Expected request with `Content-Type: application/json`"));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rej| ApiError::http(rej.status(), rej.body_text()))?;

        let value: T = parse_json(&bytes)?;
        finish("body", value).map(Self)
    }
}

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let query = parts.uri.query().unwrap_or_default();
        let de = serde_urlencoded::Deserializer::new(url::form_urlencoded::parse(query.as_bytes()));
        let value: T = serde_path_to_error::deserialize(de).map_err(|err| {
            ApiError::RequestValidation(path_error_to_violation("query", &err).into())
        })?;
        finish("query", value).map(Self)
    }
}

impl<S, T> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => Err(path_rejection_to_error(rejection)),
        }
    }
}

fn finish<T: Validate>(location: &str, value: T) -> Result<T, ApiError> {
    let mut errors = ValidationErrors::new();
    value.validate(&mut errors);
    errors
        .with_location(location)
        .into_result()
        .map_err(ApiError::RequestValidation)?;
    Ok(value)
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn body_error(message: impl Into<String>) -> ApiError {
    ApiError::RequestValidation(FieldViolation::new(["body"], message).into())
}

fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    use serde_json::error::Category;

    let mut de = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut de).map_err(|err| {
        match err.inner().classify() {
            Category::Syntax | Category::Eof | Category::Io => {
                body_error(format!("JSON decode error: {}", strip_position(err.inner())))
            }
            Category::Data => {
                ApiError::RequestValidation(path_error_to_violation("body", &err).into())
            }
        }
    })?;
    de.end()
        .map_err(|err| body_error(format!("JSON decode error: {}", strip_position(&err))))?;
    Ok(value)
}

/// serde_json appends " at line X column Y"; field paths make it redundant.
fn strip_position(err: &impl fmt::Display) -> String {
    let message = err.to_string();
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_owned(),
        None => message,
    }
}

fn path_error_to_violation<E: fmt::Display>(
    location: &str,
    err: &serde_path_to_error::Error<E>,
) -> FieldViolation {
    let message = strip_position(err.inner());
    let mut path = vec![location.to_owned()];
    path.extend(err.path().iter().filter_map(|segment| match segment {
        Segment::Seq { index } => Some(index.to_string()),
        Segment::Map { key } => Some(key.clone()),
        Segment::Enum { variant } => Some(variant.clone()),
        Segment::Unknown => None,
    }));

    if let Some(field) = missing_field(&message) {
        path.push(field);
        return FieldViolation::new(path, FIELD_REQUIRED);
    }
    FieldViolation::new(path, message)
}

fn missing_field(message: &str) -> Option<String> {
    message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.strip_suffix('`'))
        .map(str::to_owned)
}

fn path_rejection_to_error(rejection: PathRejection) -> ApiError {
    use axum::extract::path::ErrorKind;

    let PathRejection::FailedToDeserializePathParams(err) = rejection else {
        return ApiError::http(rejection.status(), rejection.body_text());
    };

    let (field, message) = match err.kind() {
        ErrorKind::ParseErrorAtKey {
            key,
            value,
            expected_type,
        } => (
            Some(key.clone()),
            format!("Input should be a valid {expected_type}, got '{value}'"),
        ),
        ErrorKind::ParseErrorAtIndex {
            index,
            value,
            expected_type,
        } => (
            Some(index.to_string()),
            format!("Input should be a valid {expected_type}, got '{value}'"),
        ),
        ErrorKind::ParseError {
            value,
            expected_type,
        } => (
            None,
            format!("Input should be a valid {expected_type}, got '{value}'"),
        ),
        other => (None, other.to_string()),
    };

    let mut path = vec!["path".to_owned()];
    path.extend(field);
    ApiError::RequestValidation(FieldViolation::new(path, message).into())
}
