// SPDX-License-Identifier: Apache-2.0

use canon_model::ValidationError;
use canon_store::split_codes;
use rusqlite::types::Type;
use rusqlite::Row;

pub(crate) fn code_at<T>(
    row: &Row<'_>,
    idx: usize,
    parse: fn(&str) -> Result<T, ValidationError>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn optional_code_at<T>(
    row: &Row<'_>,
    idx: usize,
    parse: fn(&str) -> Result<T, ValidationError>,
) -> rusqlite::Result<Option<T>> {
    match row.get::<_, Option<String>>(idx)? {
        None => Ok(None),
        Some(raw) => parse(&raw).map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
        }),
    }
}

/// Comma-joined code list; NULL and empty both decode to no codes.
pub(crate) fn codes_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: Option<String> = row.get(idx)?;
    Ok(raw.as_deref().map(split_codes).unwrap_or_default())
}
