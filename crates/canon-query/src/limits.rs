// SPDX-License-Identifier: Apache-2.0

use crate::QueryError;
use serde::{Deserialize, Serialize};

/// Hard ceiling for any page; deployments may only lower it.
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryLimits {
    pub default_size: usize,
    pub max_size: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_PAGE_SIZE,
            max_size: MAX_PAGE_SIZE,
        }
    }
}

impl QueryLimits {
    pub fn new(default_size: usize, max_size: usize) -> Result<Self, String> {
        if max_size == 0 || max_size > MAX_PAGE_SIZE {
            return Err(format!("max page size must be in 1..={MAX_PAGE_SIZE}"));
        }
        if default_size == 0 || default_size > max_size {
            return Err("default page size must be in 1..=max page size".to_string());
        }
        Ok(Self {
            default_size,
            max_size,
        })
    }

    /// Resolves a requested page size, rejecting anything outside `1..=max_size`.
    pub fn check_size(&self, requested: Option<usize>) -> Result<usize, QueryError> {
        let size = requested.unwrap_or(self.default_size);
        if size == 0 || size > self.max_size {
            return Err(QueryError::validation(
                "size",
                format!("size must be between 1 and {} (got {size})", self.max_size),
            ));
        }
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_cannot_exceed_the_hard_ceiling() {
        assert!(QueryLimits::new(20, 101).is_err());
        assert!(QueryLimits::new(50, 40).is_err());
        assert!(QueryLimits::new(0, 40).is_err());
        assert_eq!(
            QueryLimits::new(10, 50).expect("limits"),
            QueryLimits {
                default_size: 10,
                max_size: 50
            }
        );
    }

    #[test]
    fn size_bounds_are_inclusive() {
        let limits = QueryLimits::default();
        assert_eq!(limits.check_size(None).expect("default"), 20);
        assert_eq!(limits.check_size(Some(1)).expect("min"), 1);
        assert_eq!(limits.check_size(Some(100)).expect("max"), 100);
        let err = limits.check_size(Some(101)).expect_err("over");
        assert_eq!(err.field, Some("size"));
        assert!(limits.check_size(Some(0)).is_err());
    }
}
