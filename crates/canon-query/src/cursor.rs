// SPDX-License-Identifier: Apache-2.0

//! Page-position tokens.
//!
//! A token is the decimal id of the last row of the previous page. Every list endpoint goes
//! through [`CursorCodec`], so hardening the format later touches only this module.

use thiserror::Error;

pub const MAX_CURSOR_TOKEN_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorPosition {
    #[default]
    Start,
    /// Strictly after the row with this id.
    After(i64),
}

impl CursorPosition {
    #[must_use]
    pub const fn after_id(self) -> Option<i64> {
        match self {
            Self::Start => None,
            Self::After(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cursor token {token:?}")]
pub struct InvalidCursorError {
    pub token: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CursorCodec;

impl CursorCodec {
    #[must_use]
    pub fn encode(id: i64) -> String {
        id.to_string()
    }

    /// Absent and empty tokens mean the start of the sequence.
    pub fn decode(token: Option<&str>) -> Result<CursorPosition, InvalidCursorError> {
        match token {
            None | Some("") => Ok(CursorPosition::Start),
            Some(raw) => Self::decode_id(raw).map(CursorPosition::After),
        }
    }

    fn decode_id(raw: &str) -> Result<i64, InvalidCursorError> {
        let invalid = || InvalidCursorError {
            token: raw.to_string(),
        };
        // canonical decimal only: what `encode` can produce for a positive id
        if raw.len() > MAX_CURSOR_TOKEN_LEN
            || !raw.bytes().all(|b| b.is_ascii_digit())
            || raw.starts_with('0')
        {
            return Err(invalid());
        }
        match raw.parse::<i64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(invalid()),
        }
    }
}
