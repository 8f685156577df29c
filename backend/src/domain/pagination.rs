//! Page requests and paged results shared by list operations.

use serde::{Deserialize, Serialize};

/// Default number of items per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Upper bound on items per page.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Normalised page request; `page` is one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Build a page request, clamping values into the supported range.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// One-based page number.
    pub fn page(self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    pub fn limit(self) -> u32 {
        self.limit
    }

    /// Number of items skipped before this page.
    pub fn offset(self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// A page of results plus the total match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Slice an in-memory, already ordered collection.
    pub fn from_ordered(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let items = all
            .into_iter()
            .skip(skip)
            .take(request.limit() as usize)
            .collect();
        Self {
            items,
            page: request.page(),
            limit: request.limit(),
            total,
        }
    }

    /// Wrap one window fetched with `LIMIT`/`OFFSET` and its total count.
    pub fn from_window(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page(),
            limit: request.limit(),
            total,
        }
    }

    /// Transform every item, keeping paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
        }
    }

    /// Total number of pages for the current limit.
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.limit.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, DEFAULT_PAGE_SIZE)]
    #[case(Some(0), Some(0), 1, 1)]
    #[case(Some(3), Some(500), 3, MAX_PAGE_SIZE)]
    fn page_request_clamps(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected_page: u32,
        #[case] expected_limit: u32,
    ) {
        let request = PageRequest::new(page, limit);
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.limit(), expected_limit);
    }

    #[rstest]
    fn slices_the_requested_window() {
        let page = Page::from_ordered((1..=45).collect::<Vec<u32>>(), PageRequest::new(Some(3), Some(20)));
        assert_eq!(page.items, (41..=45).collect::<Vec<u32>>());
        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages(), 3);
    }
}
