//! Paginated result page.

use serde::{Deserialize, Serialize};

/// One page of a paginated listing, as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based index of this page.
    pub current_page: u32,
    /// Total number of pages for the query.
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Whether further pages exist after this one.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }
}
