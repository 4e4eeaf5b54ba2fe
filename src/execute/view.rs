//! The displayed result page.

use crate::service::{ExecuteResponse, Row};

/// Shown in place of a table when a run returns no rows.
pub const EMPTY_MESSAGE: &str = "No results";

/// How the rows are paged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paging {
    Paged {
        page: u32,
        page_size: u32,
        total_pages: u32,
    },
    /// The executor sent no pagination metadata: everything on one page,
    /// no page controls.
    Single,
}

/// Rows and headers of the last successful run. Replaced wholesale on
/// every response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub paging: Paging,
    pub total_rows: Option<u64>,
}

impl ResultView {
    pub fn from_response(response: ExecuteResponse) -> Self {
        let paging = match response.pagination {
            Some(p) => Paging::Paged {
                page: p.current_page.max(1),
                page_size: p.page_size,
                total_pages: p.total_pages,
            },
            None => {
                if !response.rows.is_empty() {
                    tracing::debug!(rows = response.rows.len(), "no pagination metadata; single page");
                }
                Paging::Single
            }
        };
        Self {
            headers: response.headers,
            rows: response.rows,
            paging,
            total_rows: response.total_rows,
        }
    }

    /// Zero rows: render [`EMPTY_MESSAGE`], not an error.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_page_controls(&self) -> bool {
        matches!(self.paging, Paging::Paged { total_pages, .. } if total_pages > 1)
    }

    pub fn current_page(&self) -> u32 {
        match self.paging {
            Paging::Paged { page, .. } => page,
            Paging::Single => 1,
        }
    }

    pub fn total_pages(&self) -> Option<u32> {
        match self.paging {
            Paging::Paged { total_pages, .. } => Some(total_pages),
            Paging::Single => None,
        }
    }

    pub fn next_page(&self) -> Option<u32> {
        match self.paging {
            Paging::Paged {
                page, total_pages, ..
            } if page < total_pages => Some(page + 1),
            _ => None,
        }
    }

    pub fn previous_page(&self) -> Option<u32> {
        match self.paging {
            Paging::Paged { page, .. } if page > 1 => Some(page - 1),
            _ => None,
        }
    }

    /// `page` if it is a valid target from this view.
    pub fn page_in_range(&self, page: u32) -> Option<u32> {
        match self.paging {
            Paging::Paged { total_pages, .. } if (1..=total_pages.max(1)).contains(&page) => {
                Some(page)
            }
            _ => None,
        }
    }
}
