//! Static catalog of problem types keyed by HTTP status

use http::StatusCode;

use crate::exception::ApiException;

/// Static problem type definition from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorTypeDef {
    pub status: u16,
    pub type_url: &'static str,
    pub title: &'static str,
}

impl ErrorTypeDef {
    /// HTTP status of this entry, using `INTERNAL_SERVER_ERROR` for invalid codes
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Convert this definition into an `ApiException` with the given detail
    #[inline]
    pub fn as_exception(&self, detail: impl Into<String>) -> ApiException {
        ApiException::new(self.status_code(), self.type_url, self.title, detail)
    }
}

pub const VALIDATION_ERROR: ErrorTypeDef = ErrorTypeDef {
    status: 400,
    type_url: "/errors/validation-error",
    title: "Validation Error",
};

pub const AUTHENTICATION_REQUIRED: ErrorTypeDef = ErrorTypeDef {
    status: 401,
    type_url: "/errors/authentication-required",
    title: "Authentication Required",
};

pub const INSUFFICIENT_PERMISSIONS: ErrorTypeDef = ErrorTypeDef {
    status: 403,
    type_url: "/errors/insufficient-permissions",
    title: "Insufficient Permissions",
};

pub const RESOURCE_NOT_FOUND: ErrorTypeDef = ErrorTypeDef {
    status: 404,
    type_url: "/errors/resource-not-found",
    title: "Resource Not Found",
};

pub const RATE_LIMIT_EXCEEDED: ErrorTypeDef = ErrorTypeDef {
    status: 429,
    type_url: "/errors/rate-limit-exceeded",
    title: "Rate Limit Exceeded",
};

pub const INTERNAL_ERROR: ErrorTypeDef = ErrorTypeDef {
    status: 500,
    type_url: "/errors/internal-error",
    title: "Internal Server Error",
};

pub const BAD_GATEWAY: ErrorTypeDef = ErrorTypeDef {
    status: 502,
    type_url: "/errors/bad-gateway",
    title: "Bad Gateway",
};

pub const SERVICE_UNAVAILABLE: ErrorTypeDef = ErrorTypeDef {
    status: 503,
    type_url: "/errors/service-unavailable",
    title: "Service Unavailable",
};

pub const GATEWAY_TIMEOUT: ErrorTypeDef = ErrorTypeDef {
    status: 504,
    type_url: "/errors/gateway-timeout",
    title: "Gateway Timeout",
};

/// Every status with a dedicated problem type.
pub const ERROR_TYPE_MAP: &[ErrorTypeDef] = &[
    VALIDATION_ERROR,
    AUTHENTICATION_REQUIRED,
    INSUFFICIENT_PERMISSIONS,
    RESOURCE_NOT_FOUND,
    RATE_LIMIT_EXCEEDED,
    INTERNAL_ERROR,
    BAD_GATEWAY,
    SERVICE_UNAVAILABLE,
    GATEWAY_TIMEOUT,
];

/// Exact catalog entry for `status`, if any.
#[must_use]
pub fn lookup_error_type(status: StatusCode) -> Option<&'static ErrorTypeDef> {
    ERROR_TYPE_MAP
        .iter()
        .find(|def| def.status == status.as_u16())
}

/// Catalog entry for `status`, falling back to the internal error entry.
#[must_use]
pub fn resolve_error_type(status: StatusCode) -> &'static ErrorTypeDef {
    lookup_error_type(status).unwrap_or(&INTERNAL_ERROR)
}
