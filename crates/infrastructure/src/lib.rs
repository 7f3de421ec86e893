//! Nimbus Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined
//! in the application layer: the HTTP API gateway, file-system-backed
//! persistence repositories, the credential cipher fallback, and the
//! system clock.

pub mod adapters;
pub mod cipher;
pub mod persistence;
pub mod serialization;

pub use adapters::{AllowedHosts, HttpApiGateway, SystemClock};
pub use cipher::PlaintextCipher;
pub use persistence::{
    FileCredentialsRepository, FilePreferencesStore, FileProfileStore, TokioFileSystem,
    default_config_dir,
};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
