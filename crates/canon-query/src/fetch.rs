// SPDX-License-Identifier: Apache-2.0

//! The one SQL builder every list query goes through.

use crate::slice::{paginate, Slice, SliceCriteria};
use crate::QueryError;
use canon_model::{LifecycleScope, Stored};
use canon_store::{decode_stored, select_list, Table};
use rusqlite::{params_from_iter, types::Value, Connection};

/// Entity-specific predicates appended to a slice query over alias `t`.
pub trait SliceFilter<E: Table> {
    fn append_predicates(&self, where_parts: &mut Vec<String>, params: &mut Vec<Value>);
}

impl<E: Table> SliceFilter<E> for () {
    fn append_predicates(&self, _: &mut Vec<String>, _: &mut Vec<Value>) {}
}

/// Rendered lifecycle predicate for `alias`, or `None` when every row is visible.
#[must_use]
pub fn lifecycle_predicate(scope: LifecycleScope, alias: &str) -> Option<String> {
    match scope {
        LifecycleScope::ActiveOnly => Some(format!("{alias}.deleted_at IS NULL")),
        LifecycleScope::IncludeDeleted => None,
    }
}

#[must_use]
pub fn build_slice_sql<E, F>(criteria: &SliceCriteria<F>) -> (String, Vec<Value>)
where
    E: Table,
    F: SliceFilter<E>,
{
    let mut sql = format!("SELECT {} FROM {} t", select_list::<E>("t"), E::TABLE);
    let mut where_parts: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(predicate) = lifecycle_predicate(criteria.lifecycle, "t") {
        where_parts.push(predicate);
    }
    criteria.filter.append_predicates(&mut where_parts, &mut params);

    if let Some(after) = criteria.cursor.after_id() {
        match E::ORDER_COLUMN {
            // keyset over (order column, id); the token stays the plain id
            Some(order) => {
                where_parts.push(format!(
                    "(t.{order}, t.id) > ((SELECT c.{order} FROM {} c WHERE c.id = ?), ?)",
                    E::TABLE
                ));
                params.push(Value::Integer(after));
                params.push(Value::Integer(after));
            }
            None => {
                where_parts.push("t.id > ?".to_string());
                params.push(Value::Integer(after));
            }
        }
    }

    if !where_parts.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&where_parts.join(" AND "));
    }
    match E::ORDER_COLUMN {
        Some(order) => sql.push_str(&format!(" ORDER BY t.{order} ASC, t.id ASC")),
        None => sql.push_str(" ORDER BY t.id ASC"),
    }
    sql.push_str(" LIMIT ?");
    params.push(Value::Integer(
        i64::try_from(criteria.fetch_limit()).unwrap_or(i64::MAX),
    ));
    (sql, params)
}

/// Fetches `size + 1` rows and paginates them.
pub fn fetch_slice<E, F>(
    conn: &Connection,
    criteria: &SliceCriteria<F>,
) -> Result<Slice<Stored<E>>, QueryError>
where
    E: Table,
    F: SliceFilter<E>,
{
    let (sql, params) = build_slice_sql::<E, F>(criteria);
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params.iter()), |row| decode_stored::<E>(row))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(paginate(rows, criteria.size, |row| row.id))
}

pub(crate) fn push_in_ids(
    column: &str,
    ids: &[i64],
    where_parts: &mut Vec<String>,
    params: &mut Vec<Value>,
) {
    if ids.is_empty() {
        return;
    }
    where_parts.push(format!("{column} IN ({})", placeholders(ids.len())));
    params.extend(ids.iter().map(|id| Value::Integer(*id)));
}

pub(crate) fn push_in_texts<'a>(
    column: &str,
    values: impl ExactSizeIterator<Item = &'a str>,
    where_parts: &mut Vec<String>,
    params: &mut Vec<Value>,
) {
    if values.len() == 0 {
        return;
    }
    where_parts.push(format!("{column} IN ({})", placeholders(values.len())));
    params.extend(values.map(|v| Value::Text(v.to_string())));
}

pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[must_use]
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '!' | '%' | '_' => {
                out.push('!');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use canon_model::{Layer, Module};

    #[test]
    fn active_only_is_rendered_by_default() {
        let criteria = SliceCriteria::<()>::first(3).expect("criteria");
        let (sql, params) = build_slice_sql::<Module, ()>(&criteria);
        assert!(sql.contains("WHERE t.deleted_at IS NULL ORDER BY t.id ASC LIMIT ?"));
        assert_eq!(params, vec![Value::Integer(4)]);
    }

    #[test]
    fn include_deleted_drops_the_lifecycle_predicate() {
        let criteria = SliceCriteria::<()>::first(3)
            .expect("criteria")
            .with_lifecycle(LifecycleScope::IncludeDeleted);
        let (sql, _) = build_slice_sql::<Module, ()>(&criteria);
        assert!(!sql.contains("deleted_at IS NULL"));
    }

    #[test]
    fn ordered_entities_use_keyset_cursor() {
        let criteria = SliceCriteria::<()>::after("3", 2).expect("criteria");
        let (sql, params) = build_slice_sql::<Layer, ()>(&criteria);
        assert!(sql.contains(
            "(t.order_index, t.id) > ((SELECT c.order_index FROM layer c WHERE c.id = ?), ?)"
        ));
        assert!(sql.ends_with("ORDER BY t.order_index ASC, t.id ASC LIMIT ?"));
        assert_eq!(
            params,
            vec![Value::Integer(3), Value::Integer(3), Value::Integer(3)]
        );
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("100%_done!"), "100!%!_done!!");
    }
}
