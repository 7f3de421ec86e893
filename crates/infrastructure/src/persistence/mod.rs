//! File-system-backed persistence repositories.
//!
//! All repositories write into a base directory (the platform config
//! directory by default, an injected path in tests), rewrite their
//! document in full on every save, and load defaults when the file
//! does not exist.

mod credentials;
mod file_system;
mod preferences;
mod profiles;

pub use credentials::FileCredentialsRepository;
pub use file_system::TokioFileSystem;
pub use preferences::FilePreferencesStore;
pub use profiles::FileProfileStore;

use std::path::PathBuf;

use nimbus_application::ports::StorageError;

/// Application-private directory under the platform config dir.
///
/// # Errors
///
/// Returns an error if the platform config directory cannot be
/// determined.
pub fn default_config_dir() -> Result<PathBuf, StorageError> {
    dirs::config_dir()
        .map(|dir| dir.join("nimbus"))
        .ok_or(StorageError::NoConfigDir)
}
