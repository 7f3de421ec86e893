//! Persistence ports for profiles, preferences, and credentials.

use async_trait::async_trait;

use nimbus_domain::preferences::Preferences;
use nimbus_domain::profile::StoredProfiles;

/// Errors that can occur during persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stored credential blob could not be decoded.
    #[error("Credential error: {0}")]
    Credential(#[from] CipherError),

    /// The platform config directory could not be determined.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Repository for the profile registry (secrets stripped).
///
/// Saved in full after every mutation; missing storage loads as the
/// empty default.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Loads the stored profiles.
    async fn load(&self) -> Result<StoredProfiles, StorageError>;

    /// Saves the stored profiles, replacing any previous contents.
    async fn save(&self, profiles: &StoredProfiles) -> Result<(), StorageError>;
}

/// Repository for user preferences.
#[async_trait]
pub trait PreferencesStore: Send + Sync {
    /// Loads the preferences; missing storage yields defaults.
    async fn load(&self) -> Result<Preferences, StorageError>;

    /// Saves the preferences, replacing any previous contents.
    async fn save(&self, preferences: &Preferences) -> Result<(), StorageError>;
}

/// Repository for API keys, keyed by profile id.
///
/// The backing store holds opaque blobs; protection and revelation
/// are the adapter's concern (see [`KeyCipher`]). The store is
/// rewritten in full on every mutation; there is no file locking
/// (single-window assumption).
#[async_trait]
pub trait CredentialsRepository: Send + Sync {
    /// Stores the API key for a profile, replacing any previous one.
    async fn store_key(&self, profile_id: &str, api_key: &str) -> Result<(), StorageError>;

    /// Retrieves the API key for a profile, if stored.
    async fn fetch_key(&self, profile_id: &str) -> Result<Option<String>, StorageError>;

    /// Removes the API key for a profile. Removing a missing key is
    /// not an error.
    async fn remove_key(&self, profile_id: &str) -> Result<(), StorageError>;
}

/// Error revealing a stored credential blob.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to decode credential blob: {0}")]
pub struct CipherError(pub String);

/// Seam for protecting credential blobs at rest.
///
/// Platform-encryption adapters (keychain, DPAPI, libsecret) plug in
/// here; the shipped default is the plaintext fallback used whenever
/// no platform facility is available.
pub trait KeyCipher: Send + Sync {
    /// Encodes a secret into a storage blob.
    fn protect(&self, secret: &str) -> String;

    /// Decodes a storage blob back into the secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be decoded.
    fn reveal(&self, blob: &str) -> Result<String, CipherError>;
}
