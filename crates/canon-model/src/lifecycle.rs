// SPDX-License-Identifier: Apache-2.0

use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub type Timestamp = OffsetDateTime;

/// Soft-delete state of a persisted row.
///
/// Serialized as the nullable `deletedAt` timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Active,
    DeletedAt(Timestamp),
}

impl Lifecycle {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    #[must_use]
    pub const fn deleted_at(&self) -> Option<Timestamp> {
        match self {
            Self::Active => None,
            Self::DeletedAt(at) => Some(*at),
        }
    }

    #[must_use]
    pub const fn from_deleted_at(deleted_at: Option<Timestamp>) -> Self {
        match deleted_at {
            None => Self::Active,
            Some(at) => Self::DeletedAt(at),
        }
    }
}

impl Serialize for Lifecycle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Active => serializer.serialize_none(),
            Self::DeletedAt(at) => {
                let text = at.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&text)
            }
        }
    }
}

/// Which lifecycle states a read may observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleScope {
    #[default]
    ActiveOnly,
    IncludeDeleted,
}

impl LifecycleScope {
    #[must_use]
    pub const fn admits(self, lifecycle: &Lifecycle) -> bool {
        match self {
            Self::ActiveOnly => lifecycle.is_active(),
            Self::IncludeDeleted => true,
        }
    }
}

pub fn format_timestamp(at: Timestamp) -> Result<String, time::error::Format> {
    at.format(&Rfc3339)
}

pub fn parse_timestamp(raw: &str) -> Result<Timestamp, time::error::Parse> {
    OffsetDateTime::parse(raw, &Rfc3339)
}

/// A persisted entity: surrogate id, audit stamps and lifecycle around the attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stored<E> {
    pub id: i64,
    #[serde(flatten)]
    pub entity: E,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: Timestamp,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: Timestamp,
    #[serde(rename = "deletedAt")]
    pub lifecycle: Lifecycle,
}

impl<E> Stored<E> {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    #[must_use]
    pub fn with_entity(self, entity: E, now: Timestamp) -> Self {
        Self {
            entity,
            updated_at: now,
            ..self
        }
    }

    #[must_use]
    pub fn deleted(self, now: Timestamp) -> Self {
        Self {
            lifecycle: Lifecycle::DeletedAt(now),
            updated_at: now,
            ..self
        }
    }
}
