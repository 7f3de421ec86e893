//! Connection profiles and the profile registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// A named set of credentials + endpoint for one Driftvec instance.
///
/// The API key lives only in memory; it is never serialized with the
/// profile. Persistence goes through [`StoredProfiles`], and the key
/// itself through the credential vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Opaque unique id (UUID v7).
    pub id: String,
    /// Display name, e.g. "Production".
    pub name: String,
    /// API key. In-memory only.
    #[serde(skip)]
    pub api_key: String,
    /// Base URL of the API endpoint.
    pub base_url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ConnectionProfile {
    /// Validates the profile fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank, the API key is empty,
    /// or the base URL is not a valid http(s) URL.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidProfileName(self.name.clone()));
        }
        if self.api_key.is_empty() {
            return Err(DomainError::InvalidApiKey);
        }
        let url = Url::parse(&self.base_url)
            .map_err(|e| DomainError::InvalidBaseUrl(format!("{e}: {}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::InvalidBaseUrl(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }
        Ok(())
    }
}

/// A partial profile update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New API key.
    pub api_key: Option<String>,
    /// New base URL.
    pub base_url: Option<String>,
}

/// In-memory registry of connection profiles.
///
/// Plain state struct with explicit mutation methods; persistence is
/// the caller's concern and happens after every mutation. Exactly one
/// profile may be active at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileRegistry {
    profiles: Vec<ConnectionProfile>,
    active_profile_id: Option<String>,
}

impl ProfileRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a validated profile to the registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile fails validation.
    pub fn add(&mut self, profile: ConnectionProfile) -> DomainResult<()> {
        profile.validate()?;
        self.profiles.push(profile);
        Ok(())
    }

    /// Applies a partial update to the profile with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if no such profile exists or the updated
    /// profile fails validation.
    pub fn update(&mut self, id: &str, update: ProfileUpdate) -> DomainResult<&ConnectionProfile> {
        let profile = self
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::UnknownProfile(id.to_string()))?;

        let mut updated = profile.clone();
        if let Some(name) = update.name {
            updated.name = name;
        }
        if let Some(api_key) = update.api_key {
            updated.api_key = api_key;
        }
        if let Some(base_url) = update.base_url {
            updated.base_url = base_url;
        }
        updated.validate()?;

        *profile = updated;
        Ok(profile)
    }

    /// Removes a profile, clearing the active id if it pointed at it.
    ///
    /// Returns the removed profile so the caller can cascade
    /// credential removal.
    pub fn remove(&mut self, id: &str) -> Option<ConnectionProfile> {
        let index = self.profiles.iter().position(|p| p.id == id)?;
        if self.active_profile_id.as_deref() == Some(id) {
            self.active_profile_id = None;
        }
        Some(self.profiles.remove(index))
    }

    /// Sets (or clears) the active profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the id does not name a known profile.
    pub fn set_active(&mut self, id: Option<&str>) -> DomainResult<()> {
        if let Some(id) = id {
            if !self.profiles.iter().any(|p| p.id == id) {
                return Err(DomainError::UnknownProfile(id.to_string()));
            }
            self.active_profile_id = Some(id.to_string());
        } else {
            self.active_profile_id = None;
        }
        Ok(())
    }

    /// Returns the profile with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ConnectionProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Returns the active profile, if any.
    #[must_use]
    pub fn active_profile(&self) -> Option<&ConnectionProfile> {
        self.active_profile_id
            .as_deref()
            .and_then(|id| self.get(id))
    }

    /// Returns the active profile id, if any.
    #[must_use]
    pub fn active_profile_id(&self) -> Option<&str> {
        self.active_profile_id.as_deref()
    }

    /// Stores an in-memory API key on the profile with the given id
    /// (used when rehydrating keys from the vault at startup).
    pub fn attach_api_key(&mut self, id: &str, api_key: impl Into<String>) {
        if let Some(profile) = self.profiles.iter_mut().find(|p| p.id == id) {
            profile.api_key = api_key.into();
        }
    }

    /// Iterates over all profiles.
    pub fn iter(&self) -> impl Iterator<Item = &ConnectionProfile> {
        self.profiles.iter()
    }

    /// Number of profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Returns true if the registry has no profiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Persisted shape of the registry. API keys are stripped by the
/// `#[serde(skip)]` on [`ConnectionProfile::api_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProfiles {
    /// Schema version for migration support.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Profiles without secrets.
    #[serde(default)]
    pub profiles: Vec<ConnectionProfile>,

    /// Active profile id, if any.
    #[serde(default)]
    pub active_profile_id: Option<String>,
}

const fn default_schema_version() -> u32 {
    1
}

impl StoredProfiles {
    /// Snapshots a registry for persistence.
    #[must_use]
    pub fn from_registry(registry: &ProfileRegistry) -> Self {
        Self {
            schema_version: 1,
            profiles: registry.profiles.clone(),
            active_profile_id: registry.active_profile_id.clone(),
        }
    }

    /// Restores a registry from the persisted shape.
    ///
    /// A stale active id that no longer names a profile is dropped.
    #[must_use]
    pub fn into_registry(self) -> ProfileRegistry {
        let active = self
            .active_profile_id
            .filter(|id| self.profiles.iter().any(|p| &p.id == id));
        ProfileRegistry {
            profiles: self.profiles,
            active_profile_id: active,
        }
    }
}

impl Default for StoredProfiles {
    fn default() -> Self {
        Self {
            schema_version: 1,
            profiles: Vec::new(),
            active_profile_id: None,
        }
    }
}
