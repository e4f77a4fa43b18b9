// SPDX-License-Identifier: Apache-2.0

use canon_model::ValidationError;
use canon_query::{QueryError, QueryErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const UNKNOWN_REQUEST_ID: &str = "req-unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    InvalidQueryParameter,
    InvalidCursor,
    ValidationFailed,
    NotFound,
    PayloadTooLarge,
    Timeout,
    NotReady,
    StoreUnavailable,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(
        code: ApiErrorCode,
        message: impl Into<String>,
        details: Value,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: request_id.into(),
        }
    }

    #[must_use]
    pub fn with_request_id(self, request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..self
        }
    }

    #[must_use]
    pub fn invalid_param(name: &str, value: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidQueryParameter,
            format!("invalid query parameter: {name}"),
            json!({"field_errors":[{"parameter": name, "reason": "invalid", "value": value}]}),
            UNKNOWN_REQUEST_ID,
        )
    }

    #[must_use]
    pub fn missing_param(name: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidQueryParameter,
            format!("missing query parameter: {name}"),
            json!({"field_errors":[{"parameter": name, "reason": "missing"}]}),
            UNKNOWN_REQUEST_ID,
        )
    }

    #[must_use]
    pub fn invalid_cursor(message: impl Into<String>, parameter: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidCursor,
            message,
            json!({"parameter": parameter}),
            UNKNOWN_REQUEST_ID,
        )
    }

    #[must_use]
    pub fn validation_failed(field_errors: Value) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            "validation failed",
            json!({"field_errors": field_errors}),
            UNKNOWN_REQUEST_ID,
        )
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::NotFound, message, json!({}), UNKNOWN_REQUEST_ID)
    }

    #[must_use]
    pub fn payload_too_large(limit_bytes: usize) -> Self {
        Self::new(
            ApiErrorCode::PayloadTooLarge,
            "request body too large",
            json!({"limit_bytes": limit_bytes}),
            UNKNOWN_REQUEST_ID,
        )
    }

    #[must_use]
    pub fn timeout(timeout_ms: u128) -> Self {
        Self::new(
            ApiErrorCode::Timeout,
            "query timed out",
            json!({"timeout_ms": timeout_ms}),
            UNKNOWN_REQUEST_ID,
        )
    }

    #[must_use]
    pub fn not_ready() -> Self {
        Self::new(
            ApiErrorCode::NotReady,
            "store not ready",
            json!({}),
            UNKNOWN_REQUEST_ID,
        )
    }

    /// The cause is logged by the caller; clients only see a generic message.
    #[must_use]
    pub fn store_unavailable() -> Self {
        Self::new(
            ApiErrorCode::StoreUnavailable,
            "store unavailable",
            json!({}),
            UNKNOWN_REQUEST_ID,
        )
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Internal, message, json!({}), UNKNOWN_REQUEST_ID)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err.code {
            QueryErrorCode::Validation => Self::validation_failed(json!([{
                "parameter": err.field.unwrap_or("request"),
                "reason": err.message,
            }])),
            QueryErrorCode::Cursor => {
                Self::invalid_cursor(err.message, err.field.unwrap_or("cursor"))
            }
            QueryErrorCode::NotFound => Self::not_found(err.message),
            QueryErrorCode::Store => Self::store_unavailable(),
            _ => Self::internal(err.message),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::validation_failed(json!([{"parameter": err.field, "reason": err.reason}]))
    }
}
