//! Nimbus Domain - Core business types
//!
//! This crate defines the domain model for the Nimbus vector-database
//! client. All types here are pure Rust with no I/O dependencies.

pub mod connection;
pub mod credentials;
pub mod error;
pub mod id;
pub mod namespace;
pub mod pagination;
pub mod preferences;
pub mod profile;
pub mod query;
pub mod tree;

pub use connection::{ConnectionState, ConnectionStatus};
pub use credentials::CredentialVault;
pub use error::{DomainError, DomainResult};
pub use id::generate_id;
pub use namespace::{
    EncryptionInfo, FieldSchema, IndexStatus, NamespaceListItem, NamespaceListResponse,
    NamespaceMetadata, NamespaceSchema,
};
pub use pagination::PageCursor;
pub use preferences::{Preferences, Theme, ViewMode};
pub use profile::{ConnectionProfile, ProfileRegistry, ProfileUpdate, StoredProfiles};
pub use query::{
    Consistency, DocumentId, Filter, FilterOperator, IncludeAttributes, QueryRequest, QueryResponse,
    QueryRow, RankBy, SortDirection,
};
pub use tree::{NamespaceTreeNode, build_namespace_tree};
