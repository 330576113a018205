//! RFC 7807 Problem Details for HTTP APIs (pure data model)

use std::collections::BTreeMap;

use http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Content type for Problem Details as per RFC 7807.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Field path (e.g. `body.title`) → ordered list of messages for that field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

fn deserialize_status_code<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
where
    D: Deserializer<'de>,
{
    let code = u16::deserialize(deserializer)?;
    StatusCode::from_u16(code).map_err(serde::de::Error::custom)
}

/// Build the `instance` URI for a correlation id.
#[must_use]
pub fn instance_uri(correlation_id: &str) -> String {
    format!("urn:uuid:{correlation_id}")
}

/// RFC 7807 Problem Details document.
///
/// `detail` is expected to be masked before the document is constructed and
/// `instance` always derives from the request's correlation id; both are the
/// responsibility of the response builder, not of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct ProblemDetails {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub type_url: String,
    /// A short, human-readable summary of the problem type.
    pub title: String,
    /// The HTTP status code. Serializes as u16.
    #[serde(
        serialize_with = "serialize_status_code",
        deserialize_with = "deserialize_status_code"
    )]
    pub status: StatusCode,
    /// A human-readable explanation specific to this occurrence of the problem.
    pub detail: String,
    /// `urn:uuid:<correlation id>` of the request that produced the problem.
    pub instance: String,
    /// Field-level validation messages, omitted when not applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ProblemDetails {
    pub fn new(
        status: StatusCode,
        type_url: impl Into<String>,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            type_url: type_url.into(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: String::new(),
            errors: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: &str) -> Self {
        self.instance = instance_uri(correlation_id);
        self
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Axum integration: make `ProblemDetails` directly usable as a response
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ProblemDetails {
    fn into_response(self) -> axum::response::Response {
        use axum::http::HeaderValue;

        let status = self.status;
        let mut resp = axum::Json(self).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}
