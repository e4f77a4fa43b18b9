// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

pub const CODE_MAX_LEN: usize = 64;
pub const NAME_MAX_LEN: usize = 200;
pub const TEXT_MAX_LEN: usize = 20_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

pub(crate) fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    if value.trim() != value {
        return Err(ValidationError::new(
            field,
            "must not contain leading/trailing whitespace",
        ));
    }
    if value.len() > max {
        return Err(ValidationError::new(field, format!("exceeds max length {max}")));
    }
    Ok(())
}

pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(v) if v.len() > max => {
            Err(ValidationError::new(field, format!("exceeds max length {max}")))
        }
        _ => Ok(()),
    }
}

pub(crate) fn require_id(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::new(field, "must be a positive id"));
    }
    Ok(())
}

pub(crate) fn require_code(field: &'static str, value: &str) -> Result<(), ValidationError> {
    require_text(field, value, CODE_MAX_LEN)?;
    if !value
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
    {
        return Err(ValidationError::new(
            field,
            "may only contain ASCII letters, digits, '_', '-', '.'",
        ));
    }
    Ok(())
}
