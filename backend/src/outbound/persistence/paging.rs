//! `LIMIT`/`OFFSET` helpers for paged queries.

use crate::domain::PageRequest;

/// Limit and offset for `page`, as Diesel expects them.
pub(crate) fn window(page: PageRequest) -> (i64, i64) {
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (i64::from(page.limit()), offset)
}

/// Convert a `COUNT(*)` result.
pub(crate) fn total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}
