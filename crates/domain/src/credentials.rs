//! Credential vault: API keys stored outside the profile registry.
//!
//! File location: `<config dir>/nimbus/credentials.json`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// API-key storage keyed by connection-profile id.
///
/// Values are opaque blobs produced by the configured key cipher:
/// platform-encrypted where an encryption adapter is available,
/// plaintext fallback otherwise. The vault is rewritten in full on
/// every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialVault {
    /// Schema version for migration support.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Key blobs by profile id.
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

const fn default_schema_version() -> u32 {
    1
}

impl CredentialVault {
    /// Creates an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema_version: 1,
            keys: BTreeMap::new(),
        }
    }

    /// Gets the stored blob for a profile id.
    #[must_use]
    pub fn get_key(&self, profile_id: &str) -> Option<&str> {
        self.keys.get(profile_id).map(String::as_str)
    }

    /// Sets the blob for a profile id, replacing any previous value.
    pub fn set_key(&mut self, profile_id: impl Into<String>, blob: impl Into<String>) {
        self.keys.insert(profile_id.into(), blob.into());
    }

    /// Removes the blob for a profile id.
    pub fn remove_key(&mut self, profile_id: &str) -> Option<String> {
        self.keys.remove(profile_id)
    }

    /// Returns true if a blob is stored for the profile id.
    #[must_use]
    pub fn contains(&self, profile_id: &str) -> bool {
        self.keys.contains_key(profile_id)
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for CredentialVault {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_new() {
        let vault = CredentialVault::new();
        assert_eq!(vault.schema_version, 1);
        assert!(vault.is_empty());
    }

    #[test]
    fn test_set_and_get_key() {
        let mut vault = CredentialVault::new();
        vault.set_key("profile-1", "nbk-dev-123");

        assert_eq!(vault.get_key("profile-1"), Some("nbk-dev-123"));
        assert!(vault.contains("profile-1"));
        assert_eq!(vault.len(), 1);
    }

    #[test]
    fn test_set_key_replaces_previous_value() {
        let mut vault = CredentialVault::new();
        vault.set_key("profile-1", "old");
        vault.set_key("profile-1", "new");

        assert_eq!(vault.get_key("profile-1"), Some("new"));
        assert_eq!(vault.len(), 1);
    }

    #[test]
    fn test_remove_key() {
        let mut vault = CredentialVault::new();
        vault.set_key("profile-1", "nbk-dev-123");
        vault.set_key("profile-2", "nbk-prod-456");

        let removed = vault.remove_key("profile-1");
        assert_eq!(removed, Some("nbk-dev-123".to_string()));
        assert_eq!(vault.get_key("profile-1"), None);
        assert_eq!(vault.get_key("profile-2"), Some("nbk-prod-456"));
    }

    #[test]
    fn test_remove_missing_key() {
        let mut vault = CredentialVault::new();
        assert_eq!(vault.remove_key("nope"), None);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut vault = CredentialVault::new();
        vault.set_key("profile-1", "nbk-dev-123");

        let json = serde_json::to_string(&vault).expect("Failed to serialize");
        let restored: CredentialVault = serde_json::from_str(&json).expect("Failed to deserialize");

        assert_eq!(vault, restored);
    }

    #[test]
    fn test_missing_fields_default() {
        let vault: CredentialVault = serde_json::from_str("{}").expect("Failed to deserialize");
        assert_eq!(vault.schema_version, 1);
        assert!(vault.is_empty());
    }
}
