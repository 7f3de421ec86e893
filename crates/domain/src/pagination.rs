//! Cursor state for the paginated document browser.
//!
//! The backend exposes no total count and no offset paging; "page N"
//! is defined by replaying N−1 cursor advances from the start, where
//! each advance remembers the last-seen document id and the next
//! fetch filters on `id > after_id`.

use serde::{Deserialize, Serialize};

use crate::query::DocumentId;

/// Forward/backward cursor over an id-ascending document listing.
///
/// Invariant: `history.len() == current_page - 1`. Advancing pushes
/// the previous bound and replaces it with the just-fetched page's
/// last id; retreating pops.
///
/// The scheme assumes document ids are stable, unique, and sortable
/// ascending. Concurrent inserts at or below an already-returned page
/// boundary can cause skipped or duplicated rows across pages; there
/// is no snapshot isolation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    page_size: usize,
    after_id: Option<DocumentId>,
    history: Vec<Option<DocumentId>>,
    current_page: usize,
}

impl PageCursor {
    /// Creates a cursor at page 1 with the given page size (minimum
    /// of 1 enforced).
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            after_id: None,
            history: Vec::new(),
            current_page: 1,
        }
    }

    /// Current page size.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Lower-bound id for the current page, if any.
    #[must_use]
    pub const fn after_id(&self) -> Option<&DocumentId> {
        self.after_id.as_ref()
    }

    /// 1-based page counter.
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// Returns true if a previous page exists.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        !self.history.is_empty()
    }

    /// Heuristic "there might be more" signal: the last fetch
    /// returned a full page. The API gives no total count.
    #[must_use]
    pub const fn may_have_next(&self, fetched_rows: usize) -> bool {
        fetched_rows == self.page_size
    }

    /// Advances to the next page. Guarded: a no-op returning `false`
    /// unless the last fetch returned exactly `page_size` rows.
    pub fn advance(&mut self, last_id: DocumentId, fetched_rows: usize) -> bool {
        if !self.may_have_next(fetched_rows) {
            return false;
        }
        self.history.push(self.after_id.take());
        self.after_id = Some(last_id);
        self.current_page += 1;
        true
    }

    /// Retreats to the previous page. Guarded: a no-op returning
    /// `false` when there is no history.
    pub fn retreat(&mut self) -> bool {
        let Some(previous) = self.history.pop() else {
            return false;
        };
        self.after_id = previous;
        self.current_page -= 1;
        true
    }

    /// Unconditionally returns to page 1, clearing all cursor state.
    pub fn reset(&mut self) {
        self.after_id = None;
        self.history.clear();
        self.current_page = 1;
    }

    /// Changes the page size and resets to page 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.reset();
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(50)
    }
}
