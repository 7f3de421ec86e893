//! Nimbus Application - Use cases and ports
//!
//! This crate defines the ports (traits) the client core depends on
//! and the services that drive the domain model: profile management,
//! the connection lifecycle, namespace listing, and the paginated
//! document browser.

pub mod browser;
pub mod connect;
pub mod error;
pub mod filters;
pub mod namespaces;
pub mod ports;
pub mod preferences;
pub mod profiles;

pub use browser::DocumentBrowser;
pub use connect::ConnectionService;
pub use error::{ApplicationError, ApplicationResult};
pub use filters::{
    FilterBuildError, FilterField, FilterRow, FullTextSearch, compile_filter_rows,
    filterable_fields, full_text_fields, operators_for,
};
pub use namespaces::NamespaceDirectory;
pub use ports::{
    ApiError, CipherError, Clock, ConnectionProbe, Credentials, CredentialsRepository, FileSystem,
    FileSystemError, KeyCipher, ListNamespacesParams, PreferencesStore, ProfileStore, StorageError,
    VectorDbApi,
};
pub use preferences::PreferencesService;
pub use profiles::{NewProfile, ProfileService};
