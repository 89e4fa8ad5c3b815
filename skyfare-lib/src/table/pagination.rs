//! Pagination state

use std::ops::Range;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page sizes offered to the user.
pub const PAGE_SIZE_OPTIONS: [usize; 6] = [5, 10, 20, 30, 40, 50];

/// Current page of a table.
///
/// `page_index` is zero-based. The state itself does not know the row count;
/// methods that depend on it take the number of filtered rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PaginationState {
    /// Creates a pagination state on the first page. A zero `page_size`
    /// falls back to [`DEFAULT_PAGE_SIZE`].
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: if page_size == 0 { DEFAULT_PAGE_SIZE } else { page_size },
        }
    }

    /// Number of pages needed for `total` rows.
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    /// Index range of the current page within `total` rows.
    ///
    /// Empty when the page index lies beyond the last page.
    pub fn range(&self, total: usize) -> Range<usize> {
        let start = (self.page_index * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    /// Returns `true` if a previous page exists.
    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    /// Returns `true` if a next page exists for `total` rows.
    pub fn can_next(&self, total: usize) -> bool {
        self.page_index + 1 < self.page_count(total)
    }

    /// Moves to `index`, clamped to the pages available for `total` rows.
    pub fn set_page_index(&mut self, index: usize, total: usize) {
        let last = self.page_count(total).saturating_sub(1);
        self.page_index = index.min(last);
    }

    /// Summary of the current page for `total` rows.
    pub fn summary(&self, total: usize) -> PageSummary {
        let range = self.range(total);
        PageSummary {
            start: if range.is_empty() { 0 } else { range.start + 1 },
            end: range.end,
            total,
            page: self.page_index + 1,
            page_count: self.page_count(total),
        }
    }
}

/// Human-oriented description of the current page.
///
/// `start` and `end` are one-based and inclusive; both are zero when the
/// page is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    pub start: usize,
    pub end: usize,
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
}

impl std::fmt::Display for PageSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Showing {} to {} of {} results",
            self.start, self.end, self.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_and_range() {
        let mut state = PaginationState::new(10);
        assert_eq!(state.page_count(0), 0);
        assert_eq!(state.page_count(25), 3);
        assert_eq!(state.range(25), 0..10);

        state.set_page_index(2, 25);
        assert_eq!(state.range(25), 20..25);
        assert!(!state.can_next(25));
        assert!(state.can_previous());
    }

    #[test]
    fn test_set_page_index_clamps() {
        let mut state = PaginationState::new(5);
        state.set_page_index(99, 12);
        assert_eq!(state.page_index, 2);

        state.set_page_index(3, 0);
        assert_eq!(state.page_index, 0);
    }

    #[test]
    fn test_range_beyond_last_page_is_empty() {
        let state = PaginationState {
            page_index: 4,
            page_size: 10,
        };
        assert!(state.range(12).is_empty());
    }

    #[test]
    fn test_summary() {
        let mut state = PaginationState::new(10);
        state.set_page_index(1, 15);
        let summary = state.summary(15);

        assert_eq!((summary.start, summary.end, summary.total), (11, 15, 15));
        assert_eq!((summary.page, summary.page_count), (2, 2));
        assert_eq!(summary.to_string(), "Showing 11 to 15 of 15 results");

        let empty = PaginationState::default().summary(0);
        assert_eq!((empty.start, empty.end), (0, 0));
    }

    #[test]
    fn test_zero_page_size_falls_back() {
        assert_eq!(PaginationState::new(0).page_size, DEFAULT_PAGE_SIZE);
    }
}
