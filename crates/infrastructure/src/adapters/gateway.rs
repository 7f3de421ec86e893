//! HTTP gateway to the Driftvec API.
//!
//! Implements the `VectorDbApi` port with reqwest. The gateway plays
//! the role of the privileged request relay: it validates the
//! destination host against a fixed allow-list before any network
//! call, attaches bearer authorization, and converts transport and
//! non-2xx outcomes into the structured `ApiError` taxonomy. It is
//! not a general-purpose proxy.
//!
//! No timeout is configured beyond the transport default; a hung
//! remote request surfaces as a perpetual loading state upstream.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use nimbus_application::ports::{
    ApiError, ConnectionProbe, Credentials, ListNamespacesParams, VectorDbApi,
};
use nimbus_domain::namespace::{NamespaceListResponse, NamespaceMetadata};
use nimbus_domain::query::{QueryRequest, QueryResponse};

/// Maximum page size the listing endpoint accepts.
const MAX_LISTING_PAGE_SIZE: usize = 1000;

/// Host allow-list: loopback names plus the designated API domain and
/// its subdomains.
#[derive(Debug, Clone)]
pub struct AllowedHosts {
    exact: Vec<String>,
    suffix: String,
}

impl AllowedHosts {
    /// The production allow-list: `api.driftvec.com`, loopback, and
    /// any `*.driftvec.com` subdomain.
    #[must_use]
    pub fn driftvec() -> Self {
        Self {
            exact: vec![
                "api.driftvec.com".to_string(),
                "localhost".to_string(),
                "127.0.0.1".to_string(),
            ],
            suffix: ".driftvec.com".to_string(),
        }
    }

    /// A custom allow-list.
    #[must_use]
    pub fn new(exact: Vec<String>, suffix: impl Into<String>) -> Self {
        Self {
            exact,
            suffix: suffix.into(),
        }
    }

    /// Returns true if the host may be contacted.
    #[must_use]
    pub fn permits(&self, host: &str) -> bool {
        self.exact.iter().any(|allowed| allowed == host) || host.ends_with(&self.suffix)
    }
}

impl Default for AllowedHosts {
    fn default() -> Self {
        Self::driftvec()
    }
}

/// reqwest-backed implementation of the `VectorDbApi` port.
pub struct HttpApiGateway {
    client: Client,
    allowed: AllowedHosts,
}

impl HttpApiGateway {
    /// Creates a gateway with the production allow-list.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_allowed_hosts(AllowedHosts::driftvec())
    }

    /// Creates a gateway with a custom allow-list.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_allowed_hosts(allowed: AllowedHosts) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("Nimbus/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { client, allowed })
    }

    /// Validates and parses the base URL, rejecting disallowed hosts
    /// before any network activity.
    fn validate_base_url(&self, base_url: &str) -> Result<Url, ApiError> {
        let url = Url::parse(base_url)
            .map_err(|_| ApiError::Validation("Invalid base URL".to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| ApiError::Validation("Invalid base URL".to_string()))?
            .to_string();
        if !self.allowed.permits(&host) {
            debug!(%host, "rejected API host");
            return Err(ApiError::HostNotAllowed(host));
        }
        Ok(url)
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = base.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|()| ApiError::Validation("Invalid base URL".to_string()))?;
            parts.pop_if_empty();
            parts.extend(segments);
        }
        Ok(url)
    }

    async fn execute<T, B>(
        &self,
        method: Method,
        url: Url,
        api_key: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        debug!(%method, %url, "API request");

        let mut builder = self
            .client
            .request(method, url)
            .bearer_auth(api_key)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        debug!(status = status.as_u16(), "API response");

        if !status.is_success() {
            return Err(Self::failure_from(status, response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read response body: {e}")))
    }

    /// Builds the failure for a non-2xx response: the JSON body's
    /// `error` field when parseable, else the status text.
    async fn failure_from(status: StatusCode, response: reqwest::Response) -> ApiError {
        let message = match response.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("error")
                .and_then(serde_json::Value::as_str)
                .map_or_else(
                    || format!("API Error: {}", status.as_u16()),
                    ToString::to_string,
                ),
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
        };
        ApiError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Query-string shape for the listing endpoint.
#[derive(Serialize)]
struct ListQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<&'a str>,
    page_size: usize,
}

#[async_trait]
impl VectorDbApi for HttpApiGateway {
    async fn list_namespaces(
        &self,
        credentials: &Credentials,
        params: ListNamespacesParams,
    ) -> Result<NamespaceListResponse, ApiError> {
        let base = self.validate_base_url(&credentials.base_url)?;
        let mut url = Self::endpoint_url(&base, &["v1", "namespaces"])?;

        let query = ListQuery {
            cursor: params.cursor.as_deref(),
            prefix: params.prefix.as_deref(),
            page_size: params.page_size.unwrap_or(100).min(MAX_LISTING_PAGE_SIZE),
        };
        let query = serde_urlencoded::to_string(&query)
            .map_err(|e| ApiError::Validation(format!("Invalid listing parameters: {e}")))?;
        url.set_query(Some(&query));

        self.execute::<_, ()>(Method::GET, url, &credentials.api_key, None)
            .await
    }

    async fn namespace_metadata(
        &self,
        credentials: &Credentials,
        namespace_id: &str,
    ) -> Result<NamespaceMetadata, ApiError> {
        if namespace_id.is_empty() {
            return Err(ApiError::Validation("Namespace ID required".to_string()));
        }
        let base = self.validate_base_url(&credentials.base_url)?;
        let url = Self::endpoint_url(&base, &["v1", "namespaces", namespace_id, "metadata"])?;
        self.execute::<_, ()>(Method::GET, url, &credentials.api_key, None)
            .await
    }

    async fn query(
        &self,
        credentials: &Credentials,
        namespace_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, ApiError> {
        if namespace_id.is_empty() {
            return Err(ApiError::Validation("Namespace ID required".to_string()));
        }
        let base = self.validate_base_url(&credentials.base_url)?;
        let url = Self::endpoint_url(&base, &["v2", "namespaces", namespace_id, "query"])?;
        self.execute(Method::POST, url, &credentials.api_key, Some(request))
            .await
    }

    async fn test_connection(
        &self,
        credentials: &Credentials,
    ) -> Result<ConnectionProbe, ApiError> {
        let start = Instant::now();
        let response = self
            .list_namespaces(
                credentials,
                ListNamespacesParams {
                    cursor: None,
                    prefix: None,
                    page_size: Some(1),
                },
            )
            .await?;
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        Ok(ConnectionProbe {
            latency_ms,
            namespace_count: response.namespaces.len(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway() -> HttpApiGateway {
        HttpApiGateway::new().expect("client builds")
    }

    fn credentials(base_url: &str) -> Credentials {
        Credentials {
            api_key: "nbk-test".to_string(),
            base_url: base_url.to_string(),
        }
    }

    #[test]
    fn test_allow_list() {
        let allowed = AllowedHosts::driftvec();
        assert!(allowed.permits("api.driftvec.com"));
        assert!(allowed.permits("gcp-us-east1.driftvec.com"));
        assert!(allowed.permits("localhost"));
        assert!(allowed.permits("127.0.0.1"));
        assert!(!allowed.permits("evil.example.com"));
        assert!(!allowed.permits("driftvec.com.evil.example"));
    }

    #[test]
    fn test_validate_base_url() {
        let gateway = gateway();
        assert!(gateway.validate_base_url("https://api.driftvec.com").is_ok());
        assert!(matches!(
            gateway.validate_base_url("https://evil.example.com"),
            Err(ApiError::HostNotAllowed(_))
        ));
        assert!(matches!(
            gateway.validate_base_url("not a url"),
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_disallowed_host_dispatches_nothing() {
        let server = MockServer::start().await;
        // Any request reaching the server would be recorded.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"namespaces": []})))
            .mount(&server)
            .await;

        let gateway = HttpApiGateway::with_allowed_hosts(AllowedHosts::new(
            vec!["api.driftvec.com".to_string()],
            ".driftvec.com",
        ))
        .unwrap();

        let result = gateway
            .list_namespaces(&credentials(&server.uri()), ListNamespacesParams::default())
            .await;

        assert!(matches!(result, Err(ApiError::HostNotAllowed(_))));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_namespaces_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/namespaces"))
            .and(query_param("page_size", "100"))
            .and(header("authorization", "Bearer nbk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "namespaces": [{"id": "docs_prod"}],
                "next_cursor": "abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = gateway()
            .list_namespaces(&credentials(&server.uri()), ListNamespacesParams::default())
            .await
            .unwrap();

        assert_eq!(response.namespaces.len(), 1);
        assert_eq!(response.namespaces[0].id, "docs_prod");
        assert_eq!(response.next_cursor.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_listing_page_size_clamped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/namespaces"))
            .and(query_param("page_size", "1000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"namespaces": []})))
            .expect(1)
            .mount(&server)
            .await;

        gateway()
            .list_namespaces(
                &credentials(&server.uri()),
                ListNamespacesParams {
                    page_size: Some(5000),
                    ..ListNamespacesParams::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_metadata_percent_encodes_namespace_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/namespaces/team%2Fdocs/metadata"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "team/docs",
                "approx_row_count": 7
            })))
            .expect(1)
            .mount(&server)
            .await;

        let metadata = gateway()
            .namespace_metadata(&credentials(&server.uri()), "team/docs")
            .await
            .unwrap();
        assert_eq!(metadata.approx_row_count, 7);
    }

    #[tokio::test]
    async fn test_query_posts_request_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/namespaces/docs/query"))
            .and(body_partial_json(json!({
                "rank_by": ["id", "asc"],
                "limit": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "rows": [{"id": 1}, {"id": 2}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = QueryRequest {
            rank_by: Some(nimbus_domain::query::RankBy::id_ascending()),
            limit: Some(2),
            ..QueryRequest::default()
        };
        let response = gateway()
            .query(&credentials(&server.uri()), "docs", &request)
            .await
            .unwrap();
        assert_eq!(response.rows.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_namespace_id_rejected_before_dispatch() {
        let server = MockServer::start().await;
        let result = gateway()
            .query(
                &credentials(&server.uri()),
                "",
                &QueryRequest::default(),
            )
            .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_message_extracted_from_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"error": "forbidden namespace"})),
            )
            .mount(&server)
            .await;

        let result = gateway()
            .namespace_metadata(&credentials(&server.uri()), "docs")
            .await;

        match result {
            Err(ApiError::Api { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "forbidden namespace");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_without_json_body_uses_status_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = gateway()
            .namespace_metadata(&credentials(&server.uri()), "docs")
            .await;

        match result {
            Err(ApiError::Api { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_json_without_error_field_uses_status_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "nope"})))
            .mount(&server)
            .await;

        let result = gateway()
            .namespace_metadata(&credentials(&server.uri()), "docs")
            .await;

        match result {
            Err(ApiError::Api { status, message }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "API Error: 404");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_test_connection_measures_latency_and_counts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/namespaces"))
            .and(query_param("page_size", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "namespaces": [{"id": "a"}],
                "next_cursor": "more"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let probe = gateway()
            .test_connection(&credentials(&server.uri()))
            .await
            .unwrap();
        assert_eq!(probe.namespace_count, 1);
    }
}
