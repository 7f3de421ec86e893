//! File-based credentials repository.
//!
//! API keys persist as a vault document (`credentials.json`) mapping
//! profile id to a blob produced by the injected [`KeyCipher`]. The
//! vault is rewritten in full on every mutation and is not guarded by
//! any lock (single-window assumption).

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use nimbus_application::ports::{CredentialsRepository, FileSystem, KeyCipher, StorageError};
use nimbus_domain::credentials::CredentialVault;

use crate::persistence::default_config_dir;
use crate::serialization::{from_json_bytes, to_json_stable_bytes};

const CREDENTIALS_FILE: &str = "credentials.json";

/// File-backed [`CredentialsRepository`] with an injected cipher.
#[derive(Debug, Clone)]
pub struct FileCredentialsRepository<F, C> {
    fs: F,
    cipher: C,
    base_dir: PathBuf,
}

impl<F: FileSystem, C: KeyCipher> FileCredentialsRepository<F, C> {
    /// Creates a repository rooted at the given directory.
    pub fn new(fs: F, cipher: C, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            cipher,
            base_dir: base_dir.into(),
        }
    }

    /// Creates a repository rooted at the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn at_default_location(fs: F, cipher: C) -> Result<Self, StorageError> {
        Ok(Self::new(fs, cipher, default_config_dir()?))
    }

    fn path(&self) -> PathBuf {
        self.base_dir.join(CREDENTIALS_FILE)
    }

    async fn load_vault(&self) -> Result<CredentialVault, StorageError> {
        let path = self.path();
        if !self.fs.exists(&path).await {
            return Ok(CredentialVault::new());
        }

        let content = self
            .fs
            .read_file(&path)
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;
        let vault =
            from_json_bytes(&content).map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(vault)
    }

    async fn save_vault(&self, vault: &CredentialVault) -> Result<(), StorageError> {
        let content = to_json_stable_bytes(vault)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.fs
            .write_file(&self.path(), &content)
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;
        debug!(keys = vault.len(), "credential vault saved");
        Ok(())
    }
}

#[async_trait]
impl<F: FileSystem, C: KeyCipher> CredentialsRepository for FileCredentialsRepository<F, C> {
    async fn store_key(&self, profile_id: &str, api_key: &str) -> Result<(), StorageError> {
        let mut vault = self.load_vault().await?;
        vault.set_key(profile_id, self.cipher.protect(api_key));
        self.save_vault(&vault).await
    }

    async fn fetch_key(&self, profile_id: &str) -> Result<Option<String>, StorageError> {
        let vault = self.load_vault().await?;
        vault
            .get_key(profile_id)
            .map(|blob| self.cipher.reveal(blob).map_err(StorageError::Credential))
            .transpose()
    }

    async fn remove_key(&self, profile_id: &str) -> Result<(), StorageError> {
        let mut vault = self.load_vault().await?;
        if vault.remove_key(profile_id).is_some() {
            self.save_vault(&vault).await?;
        }
        Ok(())
    }
}
