// SPDX-License-Identifier: Apache-2.0

use crate::table::{decode_stored, select_list, Table};
use crate::StoreError;
use canon_model::{format_timestamp, CrudPort, Lifecycle, Stored, Timestamp};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension};

/// [`CrudPort`] for every [`Table`] entity over one SQLite connection.
pub struct SqlitePort<'c> {
    conn: &'c Connection,
}

impl<'c> SqlitePort<'c> {
    #[must_use]
    pub const fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl<E: Table> CrudPort<E> for SqlitePort<'_> {
    type Error = StoreError;

    fn find(&self, id: i64) -> Result<Option<Stored<E>>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} t WHERE t.id = ?1",
            select_list::<E>("t"),
            E::TABLE
        );
        Ok(self
            .conn
            .query_row(&sql, [id], |row| decode_stored::<E>(row))
            .optional()?)
    }

    fn duplicate_exists(&self, entity: &E, exclude_id: Option<i64>) -> Result<bool, StoreError> {
        if E::UNIQUE_KEY.is_empty() {
            return Ok(false);
        }
        let values = entity.column_values();
        let mut where_parts = vec!["deleted_at IS NULL".to_string()];
        let mut params: Vec<Value> = Vec::with_capacity(E::UNIQUE_KEY.len() + 1);
        for &column in E::UNIQUE_KEY {
            let value = E::COLUMNS
                .iter()
                .position(|c| *c == column)
                .and_then(|idx| values.get(idx))
                .ok_or(StoreError::BusinessKey {
                    table: E::TABLE,
                    column,
                })?;
            params.push(value.clone());
            where_parts.push(format!("{column} = ?{}", params.len()));
        }
        if let Some(id) = exclude_id {
            params.push(Value::Integer(id));
            where_parts.push(format!("id <> ?{}", params.len()));
        }
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {})",
            E::TABLE,
            where_parts.join(" AND ")
        );
        let exists: i64 = self
            .conn
            .query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;
        Ok(exists == 1)
    }

    fn insert(&self, entity: &E, now: Timestamp) -> Result<i64, StoreError> {
        let stamp = format_timestamp(now)?;
        let mut params = entity.column_values();
        params.push(Value::Text(stamp.clone()));
        params.push(Value::Text(stamp));
        let placeholders = (1..=params.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}, created_at, updated_at) VALUES ({placeholders})",
            E::TABLE,
            E::COLUMNS.join(", ")
        );
        self.conn.execute(&sql, params_from_iter(params.iter()))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn save(&self, stored: &Stored<E>) -> Result<(), StoreError> {
        let mut params = stored.entity.column_values();
        let mut assignments = E::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c} = ?{}", i + 1))
            .collect::<Vec<_>>();
        params.push(Value::Text(format_timestamp(stored.updated_at)?));
        assignments.push(format!("updated_at = ?{}", params.len()));
        params.push(match stored.lifecycle {
            Lifecycle::Active => Value::Null,
            Lifecycle::DeletedAt(at) => Value::Text(format_timestamp(at)?),
        });
        assignments.push(format!("deleted_at = ?{}", params.len()));
        params.push(Value::Integer(stored.id));
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            E::TABLE,
            assignments.join(", "),
            params.len()
        );
        self.conn.execute(&sql, params_from_iter(params.iter()))?;
        Ok(())
    }
}
