//! File-based profile store.
//!
//! Profiles persist to `profiles.json` in the application-private
//! config directory, with API keys already stripped by the domain's
//! persisted shape.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use nimbus_application::ports::{FileSystem, ProfileStore, StorageError};
use nimbus_domain::profile::StoredProfiles;

use crate::persistence::default_config_dir;
use crate::serialization::{from_json_bytes, to_json_stable_bytes};

const PROFILES_FILE: &str = "profiles.json";

/// File-backed [`ProfileStore`].
#[derive(Debug, Clone)]
pub struct FileProfileStore<F> {
    fs: F,
    base_dir: PathBuf,
}

impl<F: FileSystem> FileProfileStore<F> {
    /// Creates a store rooted at the given directory.
    pub fn new(fs: F, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            base_dir: base_dir.into(),
        }
    }

    /// Creates a store rooted at the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn at_default_location(fs: F) -> Result<Self, StorageError> {
        Ok(Self::new(fs, default_config_dir()?))
    }

    fn path(&self) -> PathBuf {
        self.base_dir.join(PROFILES_FILE)
    }
}

#[async_trait]
impl<F: FileSystem> ProfileStore for FileProfileStore<F> {
    async fn load(&self) -> Result<StoredProfiles, StorageError> {
        let path = self.path();
        if !self.fs.exists(&path).await {
            return Ok(StoredProfiles::default());
        }

        let content = self
            .fs
            .read_file(&path)
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;
        let stored =
            from_json_bytes(&content).map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(stored)
    }

    async fn save(&self, profiles: &StoredProfiles) -> Result<(), StorageError> {
        let content = to_json_stable_bytes(profiles)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.fs
            .write_file(&self.path(), &content)
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;
        debug!(count = profiles.profiles.len(), "profiles saved");
        Ok(())
    }
}
