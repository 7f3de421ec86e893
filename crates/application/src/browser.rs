//! Paginated document browser for one namespace.
//!
//! The sort key is always the document id ascending; "page N" is
//! defined by replaying N−1 cursor advances from the start, each
//! advance filtering on `id > after_id`. The API returns no total
//! count, so "there might be a next page" is inferred from the last
//! fetch returning a full page.
//!
//! Known limitation (inherent to the scheme, documented rather than
//! fixed): ids must be stable, unique, and sortable ascending, and
//! concurrent inserts at or below an already-returned page boundary
//! can skip or duplicate rows across pages. There is no snapshot
//! isolation; recovery is retry-by-refetch only.

use tracing::debug;

use nimbus_domain::namespace::NamespaceMetadata;
use nimbus_domain::pagination::PageCursor;
use nimbus_domain::query::{
    Filter, IncludeAttributes, QueryRequest, QueryResponse, RankBy,
};

use crate::filters::FullTextSearch;
use crate::ports::{ApiError, Credentials, VectorDbApi};

/// Drives the namespace document view: query construction, the
/// forward/backward cursor, user filters, and full-text search.
///
/// Every operation is awaited to completion before the next state
/// transition that depends on it; there is no overlapping mutation of
/// cursor state.
pub struct DocumentBrowser<A> {
    api: A,
    namespace_id: Option<String>,
    cursor: PageCursor,
    user_filters: Vec<Filter>,
    full_text: Option<FullTextSearch>,
    last_page: Option<QueryResponse>,
}

impl<A: VectorDbApi> DocumentBrowser<A> {
    /// Creates a browser with the given default page size.
    #[must_use]
    pub fn new(api: A, page_size: usize) -> Self {
        Self {
            api,
            namespace_id: None,
            cursor: PageCursor::new(page_size),
            user_filters: Vec::new(),
            full_text: None,
            last_page: None,
        }
    }

    /// Opens a namespace, resetting all cursor, filter, and search
    /// state, and fetches its first page.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace id is empty or the fetch
    /// fails.
    pub async fn open(
        &mut self,
        credentials: &Credentials,
        namespace_id: impl Into<String>,
    ) -> Result<&QueryResponse, ApiError> {
        let namespace_id = namespace_id.into();
        if namespace_id.is_empty() {
            return Err(ApiError::Validation("Namespace ID required".to_string()));
        }
        self.namespace_id = Some(namespace_id);
        self.cursor.reset();
        self.user_filters.clear();
        self.full_text = None;
        self.last_page = None;
        self.fetch_current(credentials).await
    }

    /// The open namespace id, if any.
    #[must_use]
    pub fn namespace_id(&self) -> Option<&str> {
        self.namespace_id.as_deref()
    }

    /// Rows of the current page.
    #[must_use]
    pub fn rows(&self) -> &[nimbus_domain::query::QueryRow] {
        self.last_page
            .as_ref()
            .map_or(&[], |page| page.rows.as_slice())
    }

    /// The full response of the current page.
    #[must_use]
    pub const fn current_page_response(&self) -> Option<&QueryResponse> {
        self.last_page.as_ref()
    }

    /// 1-based page counter.
    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.cursor.current_page()
    }

    /// Current page size.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.cursor.page_size()
    }

    /// True when the last fetch suggests another page and cursor
    /// paging applies (full-text search disables it).
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.full_text.is_none()
            && self
                .last_page
                .as_ref()
                .is_some_and(|page| self.cursor.may_have_next(page.rows.len()))
    }

    /// True when a previous page exists.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.full_text.is_none() && self.cursor.has_previous()
    }

    /// Changes the page size: resets to page 1 and refetches.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    pub async fn set_page_size(
        &mut self,
        credentials: &Credentials,
        page_size: usize,
    ) -> Result<&QueryResponse, ApiError> {
        self.cursor.set_page_size(page_size);
        self.fetch_current(credentials).await
    }

    /// Advances to the next page. Guarded: returns `Ok(None)` without
    /// fetching when the last page was short or full-text search is
    /// active.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    pub async fn next_page(
        &mut self,
        credentials: &Credentials,
    ) -> Result<Option<&QueryResponse>, ApiError> {
        if !self.has_more() {
            return Ok(None);
        }
        let Some(last_id) = self.last_page.as_ref().and_then(QueryResponse::last_id) else {
            return Ok(None);
        };
        let fetched = self.last_page.as_ref().map_or(0, |page| page.rows.len());
        if !self.cursor.advance(last_id.clone(), fetched) {
            return Ok(None);
        }
        self.fetch_current(credentials).await.map(Some)
    }

    /// Retreats to the previous page. Guarded: returns `Ok(None)`
    /// without fetching when there is no history.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    pub async fn prev_page(
        &mut self,
        credentials: &Credentials,
    ) -> Result<Option<&QueryResponse>, ApiError> {
        if !self.cursor.retreat() {
            return Ok(None);
        }
        self.fetch_current(credentials).await.map(Some)
    }

    /// Unconditionally returns to page 1 and refetches.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    pub async fn first_page(
        &mut self,
        credentials: &Credentials,
    ) -> Result<&QueryResponse, ApiError> {
        self.cursor.reset();
        self.fetch_current(credentials).await
    }

    /// Re-issues the current page's query unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    pub async fn refresh(&mut self, credentials: &Credentials) -> Result<&QueryResponse, ApiError> {
        self.fetch_current(credentials).await
    }

    /// Replaces the user filters, resets the cursor, and refetches.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    pub async fn set_filters(
        &mut self,
        credentials: &Credentials,
        filters: Vec<Filter>,
    ) -> Result<&QueryResponse, ApiError> {
        self.user_filters = filters;
        self.cursor.reset();
        self.fetch_current(credentials).await
    }

    /// Sets or clears the full-text search. BM25 ordering is
    /// incompatible with the id cursor, so the cursor resets and
    /// next/prev paging stays disabled while a search is active.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    pub async fn set_full_text_search(
        &mut self,
        credentials: &Credentials,
        search: Option<FullTextSearch>,
    ) -> Result<&QueryResponse, ApiError> {
        self.full_text = search;
        self.cursor.reset();
        self.fetch_current(credentials).await
    }

    /// Fetches metadata for the open namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if no namespace is open or the fetch fails.
    pub async fn metadata(
        &self,
        credentials: &Credentials,
    ) -> Result<NamespaceMetadata, ApiError> {
        let namespace_id = self
            .namespace_id
            .as_deref()
            .ok_or_else(|| ApiError::Validation("Namespace ID required".to_string()))?;
        self.api.namespace_metadata(credentials, namespace_id).await
    }

    /// Builds the query request for the current cursor and filter
    /// state. A request is constructed fresh for every page.
    fn build_request(&self) -> QueryRequest {
        let page_size = u32::try_from(self.cursor.page_size()).unwrap_or(u32::MAX);

        if let Some(search) = &self.full_text {
            return QueryRequest {
                rank_by: Some(RankBy::Bm25 {
                    field: search.field.clone(),
                    query: search.query.clone(),
                    last_as_prefix: false,
                }),
                top_k: Some(page_size),
                filters: Filter::and(self.user_filters.clone()),
                include_attributes: Some(IncludeAttributes::All),
                ..QueryRequest::default()
            };
        }

        let mut filters = self.user_filters.clone();
        if let Some(after) = self.cursor.after_id() {
            filters.push(Filter::id_greater_than(after));
        }

        QueryRequest {
            rank_by: Some(RankBy::id_ascending()),
            limit: Some(page_size),
            filters: Filter::and(filters),
            include_attributes: Some(IncludeAttributes::All),
            ..QueryRequest::default()
        }
    }

    async fn fetch_current(&mut self, credentials: &Credentials) -> Result<&QueryResponse, ApiError> {
        let namespace_id = self
            .namespace_id
            .clone()
            .ok_or_else(|| ApiError::Validation("Namespace ID required".to_string()))?;
        let request = self.build_request();
        debug!(
            namespace = %namespace_id,
            page = self.cursor.current_page(),
            "fetching document page"
        );
        let response = self.api.query(credentials, &namespace_id, &request).await?;
        Ok(self.last_page.insert(response))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    use nimbus_domain::namespace::{NamespaceListResponse, NamespaceMetadata};
    use nimbus_domain::query::{DocumentId, QueryRow};

    use crate::ports::{ConnectionProbe, ListNamespacesParams};

    /// Serves an id-ascending corpus the way the real backend would:
    /// applies the `id > bound` filter and the limit, and records
    /// every request for assertions.
    struct CorpusApi {
        ids: Vec<u64>,
        requests: Mutex<Vec<serde_json::Value>>,
    }

    impl CorpusApi {
        fn new(ids: Vec<u64>) -> Self {
            Self {
                ids,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn request_count(&self) -> usize {
            self.requests.lock().expect("lock poisoned").len()
        }

        fn last_request(&self) -> serde_json::Value {
            self.requests
                .lock()
                .expect("lock poisoned")
                .last()
                .cloned()
                .expect("no requests recorded")
        }
    }

    #[async_trait]
    impl VectorDbApi for &CorpusApi {
        async fn list_namespaces(
            &self,
            _: &Credentials,
            _: ListNamespacesParams,
        ) -> Result<NamespaceListResponse, ApiError> {
            Ok(NamespaceListResponse::default())
        }

        async fn namespace_metadata(
            &self,
            _: &Credentials,
            namespace_id: &str,
        ) -> Result<NamespaceMetadata, ApiError> {
            Ok(NamespaceMetadata {
                id: namespace_id.to_string(),
                ..NamespaceMetadata::default()
            })
        }

        async fn query(
            &self,
            _: &Credentials,
            _: &str,
            request: &QueryRequest,
        ) -> Result<QueryResponse, ApiError> {
            let value = serde_json::to_value(request).expect("request serializes");
            self.requests
                .lock()
                .expect("lock poisoned")
                .push(value.clone());

            let after = match value.get("filters") {
                Some(filter) if filter[0] == json!("id") && filter[1] == json!("Gt") => {
                    filter[2].as_u64()
                }
                _ => None,
            };
            let limit = value["limit"].as_u64().unwrap_or(u64::MAX) as usize;

            let rows = self
                .ids
                .iter()
                .copied()
                .filter(|id| after.is_none_or(|bound| *id > bound))
                .take(limit)
                .map(|id| QueryRow {
                    id: DocumentId::from(id),
                    dist: None,
                    vector: None,
                    attributes: serde_json::Map::new(),
                })
                .collect();

            Ok(QueryResponse {
                rows,
                ..QueryResponse::default()
            })
        }

        async fn test_connection(&self, _: &Credentials) -> Result<ConnectionProbe, ApiError> {
            Ok(ConnectionProbe {
                latency_ms: 1,
                namespace_count: 0,
            })
        }
    }

    fn credentials() -> Credentials {
        Credentials {
            api_key: "nbk-1".to_string(),
            base_url: "https://api.driftvec.com".to_string(),
        }
    }

    fn row_ids(response: &QueryResponse) -> Vec<u64> {
        response
            .rows
            .iter()
            .map(|row| match &row.id {
                DocumentId::Uint(n) => *n,
                DocumentId::String(s) => panic!("unexpected string id {s}"),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_forward_back_replays_exact_page() {
        let api = CorpusApi::new(vec![1, 2, 3, 4, 5]);
        let mut browser = DocumentBrowser::new(&api, 2);
        let creds = credentials();

        let first = browser.open(&creds, "docs").await.unwrap();
        assert_eq!(row_ids(first), vec![1, 2]);

        let second = browser.next_page(&creds).await.unwrap().unwrap();
        assert_eq!(row_ids(second), vec![3, 4]);

        let third = browser.next_page(&creds).await.unwrap().unwrap();
        assert_eq!(row_ids(third), vec![5]);
        assert_eq!(browser.current_page(), 3);

        // prev must return to exactly the second page's result set.
        let back = browser.prev_page(&creds).await.unwrap().unwrap();
        assert_eq!(row_ids(back), vec![3, 4]);
        assert_eq!(browser.current_page(), 2);

        let start = browser.first_page(&creds).await.unwrap();
        assert_eq!(row_ids(start), vec![1, 2]);
        assert_eq!(browser.current_page(), 1);
    }

    #[tokio::test]
    async fn test_next_page_guarded_on_short_page() {
        let api = CorpusApi::new(vec![1, 2, 3]);
        let mut browser = DocumentBrowser::new(&api, 2);
        let creds = credentials();

        browser.open(&creds, "docs").await.unwrap();
        browser.next_page(&creds).await.unwrap().unwrap();
        // Page 2 has a single row; the guard must refuse to advance
        // without issuing a request.
        let requests_before = api.request_count();
        let outcome = browser.next_page(&creds).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(api.request_count(), requests_before);
        assert_eq!(browser.current_page(), 2);
    }

    #[tokio::test]
    async fn test_prev_page_guarded_on_first_page() {
        let api = CorpusApi::new(vec![1, 2, 3]);
        let mut browser = DocumentBrowser::new(&api, 2);
        let creds = credentials();

        browser.open(&creds, "docs").await.unwrap();
        let outcome = browser.prev_page(&creds).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(browser.current_page(), 1);
    }

    #[tokio::test]
    async fn test_request_shape_per_page() {
        let api = CorpusApi::new(vec![1, 2, 3, 4]);
        let mut browser = DocumentBrowser::new(&api, 2);
        let creds = credentials();

        browser.open(&creds, "docs").await.unwrap();
        assert_eq!(
            api.last_request(),
            json!({
                "rank_by": ["id", "asc"],
                "limit": 2,
                "include_attributes": true
            })
        );

        browser.next_page(&creds).await.unwrap();
        assert_eq!(
            api.last_request(),
            json!({
                "rank_by": ["id", "asc"],
                "limit": 2,
                "filters": ["id", "Gt", 2],
                "include_attributes": true
            })
        );
    }

    #[tokio::test]
    async fn test_user_filters_combined_with_cursor_bound() {
        let api = CorpusApi::new(vec![1, 2, 3, 4]);
        let mut browser = DocumentBrowser::new(&api, 2);
        let creds = credentials();

        browser.open(&creds, "docs").await.unwrap();
        browser
            .set_filters(
                &creds,
                vec![Filter::condition(
                    "status",
                    nimbus_domain::query::FilterOperator::Eq,
                    "live",
                )],
            )
            .await
            .unwrap();
        browser.next_page(&creds).await.unwrap();

        assert_eq!(
            api.last_request()["filters"],
            json!(["And", ["status", "Eq", "live"], ["id", "Gt", 2]])
        );
    }

    #[tokio::test]
    async fn test_full_text_search_switches_ranking_and_disables_paging() {
        let api = CorpusApi::new(vec![1, 2, 3, 4]);
        let mut browser = DocumentBrowser::new(&api, 2);
        let creds = credentials();

        browser.open(&creds, "docs").await.unwrap();
        browser.next_page(&creds).await.unwrap();
        browser
            .set_full_text_search(
                &creds,
                Some(FullTextSearch {
                    field: "title".to_string(),
                    query: "vector".to_string(),
                }),
            )
            .await
            .unwrap();

        let request = api.last_request();
        assert_eq!(request["rank_by"], json!(["title", "BM25", "vector"]));
        assert_eq!(request["top_k"], json!(2));
        assert!(request.get("limit").is_none());

        assert!(!browser.has_more());
        assert!(!browser.has_previous());
        let outcome = browser.next_page(&creds).await.unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_set_page_size_resets_to_first_page() {
        let api = CorpusApi::new(vec![1, 2, 3, 4, 5]);
        let mut browser = DocumentBrowser::new(&api, 2);
        let creds = credentials();

        browser.open(&creds, "docs").await.unwrap();
        browser.next_page(&creds).await.unwrap();

        let page = browser.set_page_size(&creds, 3).await.unwrap();
        assert_eq!(row_ids(page), vec![1, 2, 3]);
        assert_eq!(browser.current_page(), 1);
        assert_eq!(browser.page_size(), 3);
    }

    #[tokio::test]
    async fn test_open_resets_state_between_namespaces() {
        let api = CorpusApi::new(vec![1, 2, 3, 4]);
        let mut browser = DocumentBrowser::new(&api, 2);
        let creds = credentials();

        browser.open(&creds, "first").await.unwrap();
        browser.next_page(&creds).await.unwrap();
        assert_eq!(browser.current_page(), 2);

        browser.open(&creds, "second").await.unwrap();
        assert_eq!(browser.current_page(), 1);
        assert!(!browser.has_previous());
    }

    #[tokio::test]
    async fn test_open_rejects_empty_namespace() {
        let api = CorpusApi::new(vec![]);
        let mut browser = DocumentBrowser::new(&api, 2);

        let result = browser.open(&credentials(), "").await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert_eq!(api.request_count(), 0);
    }
}
