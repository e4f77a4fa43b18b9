// SPDX-License-Identifier: Apache-2.0

use crate::cursor::InvalidCursorError;
use canon_store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryErrorCode {
    Validation,
    Cursor,
    NotFound,
    Store,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub code: QueryErrorCode,
    pub message: String,
    /// Request parameter the error is about, when there is one.
    pub field: Option<&'static str>,
}

impl QueryError {
    #[must_use]
    pub fn new(code: QueryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            ..Self::new(QueryErrorCode::Validation, message)
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::NotFound, message)
    }

    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::Store, message)
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}
impl std::error::Error for QueryError {}

impl From<InvalidCursorError> for QueryError {
    fn from(value: InvalidCursorError) -> Self {
        Self {
            field: Some("cursor"),
            ..Self::new(QueryErrorCode::Cursor, value.to_string())
        }
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::store(value.to_string())
    }
}

impl From<StoreError> for QueryError {
    fn from(value: StoreError) -> Self {
        Self::store(value.to_string())
    }
}
