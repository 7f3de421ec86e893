//! Cursor-paged namespace listing for the sidebar.

use tracing::debug;

use nimbus_domain::namespace::NamespaceListItem;

use crate::ports::{ApiError, Credentials, ListNamespacesParams, VectorDbApi};

/// Default page size for the namespace listing.
const LISTING_PAGE_SIZE: usize = 100;

/// Accumulates namespace listing pages with optional prefix search.
///
/// The sidebar shows every page loaded so far; "load more" appends
/// the next page using the server cursor. Changing the prefix starts
/// the accumulation over.
pub struct NamespaceDirectory<A> {
    api: A,
    items: Vec<NamespaceListItem>,
    next_cursor: Option<String>,
    prefix: Option<String>,
    page_size: usize,
}

impl<A: VectorDbApi> NamespaceDirectory<A> {
    /// Creates an empty directory.
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self {
            api,
            items: Vec::new(),
            next_cursor: None,
            prefix: None,
            page_size: LISTING_PAGE_SIZE,
        }
    }

    /// Namespaces loaded so far.
    #[must_use]
    pub fn items(&self) -> &[NamespaceListItem] {
        &self.items
    }

    /// Current prefix filter.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// True when the server reported another page.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Loads the first page, replacing any accumulated items. An
    /// empty prefix is treated as no prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing call fails.
    pub async fn load_first(
        &mut self,
        credentials: &Credentials,
        prefix: Option<String>,
    ) -> Result<&[NamespaceListItem], ApiError> {
        self.prefix = prefix.filter(|p| !p.is_empty());
        self.items.clear();
        self.next_cursor = None;

        let response = self
            .api
            .list_namespaces(
                credentials,
                ListNamespacesParams::first_page(self.prefix.clone(), self.page_size),
            )
            .await?;
        debug!(count = response.namespaces.len(), "namespace page loaded");

        self.items = response.namespaces;
        self.next_cursor = response.next_cursor;
        Ok(&self.items)
    }

    /// Appends the next page. Returns `false` without a network call
    /// when no cursor is pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing call fails.
    pub async fn load_more(&mut self, credentials: &Credentials) -> Result<bool, ApiError> {
        let Some(cursor) = self.next_cursor.clone() else {
            return Ok(false);
        };

        let response = self
            .api
            .list_namespaces(
                credentials,
                ListNamespacesParams {
                    cursor: Some(cursor),
                    prefix: self.prefix.clone(),
                    page_size: Some(self.page_size),
                },
            )
            .await?;

        self.items.extend(response.namespaces);
        self.next_cursor = response.next_cursor;
        Ok(true)
    }

    /// Drops the accumulated listing.
    pub fn clear(&mut self) {
        self.items.clear();
        self.next_cursor = None;
        self.prefix = None;
    }
}
