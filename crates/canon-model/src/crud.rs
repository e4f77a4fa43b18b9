// SPDX-License-Identifier: Apache-2.0

use crate::entity::{Entity, EntityKind};
use crate::error::ValidationError;
use crate::lifecycle::{Stored, Timestamp};
use crate::patch::Patch;
use thiserror::Error;

/// Persistence seam for one entity type.
///
/// `find` returns deleted rows too; the service decides what a deleted row means.
pub trait CrudPort<E: Entity> {
    type Error: std::fmt::Display;

    fn find(&self, id: i64) -> Result<Option<Stored<E>>, Self::Error>;

    /// Whether another active row already holds `entity`'s business key.
    fn duplicate_exists(&self, entity: &E, exclude_id: Option<i64>) -> Result<bool, Self::Error>;

    fn insert(&self, entity: &E, now: Timestamp) -> Result<i64, Self::Error>;

    fn save(&self, stored: &Stored<E>) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum CrudError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("{kind} with the same business key already exists")]
    Duplicate { kind: EntityKind },
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },
    #[error("store failure: {0}")]
    Store(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome<E> {
    pub stored: Stored<E>,
    pub changed: Vec<&'static str>,
}

/// Create/update/soft-delete orchestration shared by every entity type.
pub struct CrudService<'p, P> {
    port: &'p P,
}

impl<'p, P> CrudService<'p, P> {
    #[must_use]
    pub const fn new(port: &'p P) -> Self {
        Self { port }
    }

    pub fn create<E>(&self, draft: &E, now: Timestamp) -> Result<i64, CrudError>
    where
        E: Entity,
        P: CrudPort<E>,
    {
        draft.validate()?;
        if self.port.duplicate_exists(draft, None).map_err(store)? {
            return Err(CrudError::Duplicate { kind: E::KIND });
        }
        self.port.insert(draft, now).map_err(store)
    }

    pub fn update<E, X>(&self, id: i64, patch: X, now: Timestamp) -> Result<UpdateOutcome<E>, CrudError>
    where
        E: Entity,
        P: CrudPort<E>,
        X: Patch<E>,
    {
        let current = self.load_active::<E>(id)?;
        if patch.is_empty() {
            return Ok(UpdateOutcome {
                stored: current,
                changed: Vec::new(),
            });
        }
        let changed = patch.changed_fields(&current.entity);
        let next = patch.apply(current.entity.clone());
        next.validate()?;
        current.entity.validate_change(&next)?;
        if self.port.duplicate_exists(&next, Some(id)).map_err(store)? {
            return Err(CrudError::Duplicate { kind: E::KIND });
        }
        let stored = current.with_entity(next, now);
        self.port.save(&stored).map_err(store)?;
        Ok(UpdateOutcome { stored, changed })
    }

    pub fn soft_delete<E>(&self, id: i64, now: Timestamp) -> Result<Stored<E>, CrudError>
    where
        E: Entity,
        P: CrudPort<E>,
    {
        let deleted = self.load_active::<E>(id)?.deleted(now);
        self.port.save(&deleted).map_err(store)?;
        Ok(deleted)
    }

    fn load_active<E>(&self, id: i64) -> Result<Stored<E>, CrudError>
    where
        E: Entity,
        P: CrudPort<E>,
    {
        match self.port.find(id).map_err(store)? {
            Some(stored) if stored.is_active() => Ok(stored),
            _ => Err(CrudError::NotFound { kind: E::KIND, id }),
        }
    }
}

fn store(err: impl std::fmt::Display) -> CrudError {
    CrudError::Store(err.to_string())
}
