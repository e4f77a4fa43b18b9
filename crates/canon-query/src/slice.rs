// SPDX-License-Identifier: Apache-2.0

use crate::cursor::{CursorCodec, CursorPosition};
use crate::limits::QueryLimits;
use crate::QueryError;
use canon_model::LifecycleScope;
use serde::Serialize;

/// Validated request for one page: position, size, filter and lifecycle scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceCriteria<F> {
    pub cursor: CursorPosition,
    pub size: usize,
    pub filter: F,
    pub lifecycle: LifecycleScope,
}

impl<F: Default> SliceCriteria<F> {
    pub fn first(size: usize) -> Result<Self, QueryError> {
        Self::from_request(None, Some(size), F::default(), &QueryLimits::default())
    }

    pub fn after(token: &str, size: usize) -> Result<Self, QueryError> {
        Self::from_request(Some(token), Some(size), F::default(), &QueryLimits::default())
    }
}

impl<F> SliceCriteria<F> {
    /// Size is checked before the cursor is decoded; neither touches the store.
    pub fn from_request(
        cursor: Option<&str>,
        size: Option<usize>,
        filter: F,
        limits: &QueryLimits,
    ) -> Result<Self, QueryError> {
        let size = limits.check_size(size)?;
        let cursor = CursorCodec::decode(cursor)?;
        Ok(Self {
            cursor,
            size,
            filter,
            lifecycle: LifecycleScope::ActiveOnly,
        })
    }

    #[must_use]
    pub fn with_filter<G>(self, filter: G) -> SliceCriteria<G> {
        SliceCriteria {
            cursor: self.cursor,
            size: self.size,
            filter,
            lifecycle: self.lifecycle,
        }
    }

    #[must_use]
    pub fn with_lifecycle(self, lifecycle: LifecycleScope) -> Self {
        Self { lifecycle, ..self }
    }

    /// Rows to request from the store: one more than the page.
    #[must_use]
    pub const fn fetch_limit(&self) -> usize {
        self.size + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slice<T> {
    pub content: Vec<T>,
    pub size: usize,
    pub has_next: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Slice<T> {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            content: Vec::new(),
            size: 0,
            has_next: false,
            next_cursor: None,
        }
    }
}

/// Turns an over-fetched row list (at most `size + 1` rows) into one page.
///
/// This is the only place that decides whether another page exists. The next cursor is
/// taken from the last row kept, so `next_cursor.is_some() == has_next` always holds.
#[must_use]
pub fn paginate<T>(mut rows: Vec<T>, size: usize, sort_key: impl Fn(&T) -> i64) -> Slice<T> {
    let next_cursor = if rows.len() > size {
        rows.truncate(size);
        rows.last().map(|last| CursorCodec::encode(sort_key(last)))
    } else {
        None
    };
    Slice {
        size: rows.len(),
        has_next: next_cursor.is_some(),
        next_cursor,
        content: rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_fetched_row_signals_next_page() {
        let page = paginate(vec![1, 2, 3, 4], 3, |id| *id);
        assert_eq!(page.content, vec![1, 2, 3]);
        assert_eq!(page.size, 3);
        assert!(page.has_next);
        assert_eq!(page.next_cursor.as_deref(), Some("3"));
    }

    #[test]
    fn exact_page_has_no_next_cursor() {
        let page = paginate(vec![4, 5, 6], 3, |id| *id);
        assert!(!page.has_next);
        assert_eq!(page.next_cursor, None);
        assert_eq!(page.size, 3);
    }

    #[test]
    fn empty_rows_serialize_without_cursor() {
        let page = paginate(Vec::<i64>::new(), 20, |id| *id);
        assert_eq!(page, Slice::empty());
        let json = serde_json::to_value(&page).expect("json");
        assert_eq!(
            json,
            serde_json::json!({"content": [], "size": 0, "hasNext": false})
        );
    }

    #[test]
    fn criteria_reject_size_before_cursor() {
        let err = SliceCriteria::<()>::after("garbage", 0).expect_err("size first");
        assert_eq!(err.field, Some("size"));
        let err = SliceCriteria::<()>::after("garbage", 5).expect_err("cursor");
        assert_eq!(err.field, Some("cursor"));
        let ok = SliceCriteria::<()>::after("3", 5).expect("criteria");
        assert_eq!(ok.cursor, CursorPosition::After(3));
        assert_eq!(ok.fetch_limit(), 6);
    }
}
