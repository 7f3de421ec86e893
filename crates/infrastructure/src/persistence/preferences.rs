//! File-based preferences store.
//!
//! Preferences persist to `preferences.json` in the application-
//! private config directory and load as defaults when the file does
//! not exist.

use std::path::PathBuf;

use async_trait::async_trait;

use nimbus_application::ports::{FileSystem, PreferencesStore, StorageError};
use nimbus_domain::preferences::Preferences;

use crate::persistence::default_config_dir;
use crate::serialization::{from_json_bytes, to_json_stable_bytes};

const PREFERENCES_FILE: &str = "preferences.json";

/// File-backed [`PreferencesStore`].
#[derive(Debug, Clone)]
pub struct FilePreferencesStore<F> {
    fs: F,
    base_dir: PathBuf,
}

impl<F: FileSystem> FilePreferencesStore<F> {
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
        self.base_dir.join(PREFERENCES_FILE)
    }
}

#[async_trait]
impl<F: FileSystem> PreferencesStore for FilePreferencesStore<F> {
    async fn load(&self) -> Result<Preferences, StorageError> {
        let path = self.path();
        if !self.fs.exists(&path).await {
            return Ok(Preferences::default());
        }

        let content = self
            .fs
            .read_file(&path)
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;
        let preferences =
            from_json_bytes(&content).map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(preferences)
    }

    async fn save(&self, preferences: &Preferences) -> Result<(), StorageError> {
        let content = to_json_stable_bytes(preferences)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.fs
            .write_file(&self.path(), &content)
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;
        Ok(())
    }
}
