//! Ports: the interfaces the application layer depends on.

pub mod api;
pub mod clock;
pub mod file_system;
pub mod storage;

pub use api::{ApiError, ConnectionProbe, Credentials, ListNamespacesParams, VectorDbApi};
pub use clock::Clock;
pub use file_system::{FileSystem, FileSystemError};
pub use storage::{
    CipherError, CredentialsRepository, KeyCipher, PreferencesStore, ProfileStore, StorageError,
};
