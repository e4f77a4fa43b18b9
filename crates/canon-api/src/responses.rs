// SPDX-License-Identifier: Apache-2.0

use canon_model::{format_timestamp, Timestamp};
use serde::{Deserialize, Serialize};

/// Success body of every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ApiResponseEnvelope<T> {
    pub data: T,
    /// RFC3339, UTC.
    pub timestamp: String,
    pub request_id: String,
}

impl<T> ApiResponseEnvelope<T> {
    pub fn new(
        data: T,
        request_id: impl Into<String>,
        now: Timestamp,
    ) -> Result<Self, time::error::Format> {
        Ok(Self {
            data,
            timestamp: format_timestamp(now)?,
            request_id: request_id.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionBody {
    pub name: String,
    pub version: String,
}
