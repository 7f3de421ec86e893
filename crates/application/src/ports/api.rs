//! Vector-database API port.
//!
//! The original client tunnelled these calls over a process boundary
//! with a `{success, data?, error?, status?}` envelope; here the
//! boundary collapses into ordinary async calls returning
//! `Result<T, ApiError>`.

use async_trait::async_trait;

use nimbus_domain::namespace::{NamespaceListResponse, NamespaceMetadata};
use nimbus_domain::profile::ConnectionProfile;
use nimbus_domain::query::{QueryRequest, QueryResponse};

/// Errors produced by the API gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Rejected before any network call (missing id, bad base URL).
    #[error("{0}")]
    Validation(String),

    /// The base URL resolves to a host outside the allow-list.
    /// Rejected before any network call.
    #[error("Invalid API host: {0}")]
    HostNotAllowed(String),

    /// Network/transport failure.
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response from the API.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Best-effort message extracted from the response.
        message: String,
    },
}

impl ApiError {
    /// HTTP status code, for non-2xx responses.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Credentials for one API call: bearer key plus endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Bearer API key.
    pub api_key: String,
    /// Base URL of the endpoint.
    pub base_url: String,
}

impl From<&ConnectionProfile> for Credentials {
    fn from(profile: &ConnectionProfile) -> Self {
        Self {
            api_key: profile.api_key.clone(),
            base_url: profile.base_url.clone(),
        }
    }
}

/// Parameters for the namespace listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListNamespacesParams {
    /// Opaque continuation cursor from a previous page.
    pub cursor: Option<String>,
    /// Id prefix filter.
    pub prefix: Option<String>,
    /// Requested page size (the gateway clamps to the API maximum).
    pub page_size: Option<usize>,
}

impl ListNamespacesParams {
    /// Parameters for the first page with the given size.
    #[must_use]
    pub fn first_page(prefix: Option<String>, page_size: usize) -> Self {
        Self {
            cursor: None,
            prefix,
            page_size: Some(page_size),
        }
    }
}

/// Result of a connectivity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionProbe {
    /// Measured round-trip latency in milliseconds.
    pub latency_ms: u64,
    /// Number of namespaces on the probe page.
    pub namespace_count: usize,
}

/// Port for the remote vector-database API.
#[async_trait]
pub trait VectorDbApi: Send + Sync {
    /// Lists namespaces, optionally filtered by prefix and paged by
    /// cursor.
    async fn list_namespaces(
        &self,
        credentials: &Credentials,
        params: ListNamespacesParams,
    ) -> Result<NamespaceListResponse, ApiError>;

    /// Fetches schema and statistics for one namespace.
    async fn namespace_metadata(
        &self,
        credentials: &Credentials,
        namespace_id: &str,
    ) -> Result<NamespaceMetadata, ApiError>;

    /// Runs a document query against one namespace.
    async fn query(
        &self,
        credentials: &Credentials,
        namespace_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, ApiError>;

    /// Probes connectivity with a one-row namespace listing and
    /// measures the round trip.
    async fn test_connection(&self, credentials: &Credentials)
    -> Result<ConnectionProbe, ApiError>;
}

#[async_trait]
impl<T: VectorDbApi + ?Sized> VectorDbApi for std::sync::Arc<T> {
    async fn list_namespaces(
        &self,
        credentials: &Credentials,
        params: ListNamespacesParams,
    ) -> Result<NamespaceListResponse, ApiError> {
        (**self).list_namespaces(credentials, params).await
    }

    async fn namespace_metadata(
        &self,
        credentials: &Credentials,
        namespace_id: &str,
    ) -> Result<NamespaceMetadata, ApiError> {
        (**self).namespace_metadata(credentials, namespace_id).await
    }

    async fn query(
        &self,
        credentials: &Credentials,
        namespace_id: &str,
        request: &QueryRequest,
    ) -> Result<QueryResponse, ApiError> {
        (**self).query(credentials, namespace_id, request).await
    }

    async fn test_connection(
        &self,
        credentials: &Credentials,
    ) -> Result<ConnectionProbe, ApiError> {
        (**self).test_connection(credentials).await
    }
}
