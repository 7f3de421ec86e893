//! Connection-profile management.

use tracing::debug;

use nimbus_domain::connection::ConnectionState;
use nimbus_domain::id::generate_id;
use nimbus_domain::profile::{ConnectionProfile, ProfileRegistry, ProfileUpdate, StoredProfiles};

use crate::error::ApplicationResult;
use crate::ports::{Clock, CredentialsRepository, ProfileStore};

/// Input for creating a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    /// Display name.
    pub name: String,
    /// API key.
    pub api_key: String,
    /// Base URL of the endpoint.
    pub base_url: String,
}

/// Owns the in-memory profile registry and keeps it persisted.
///
/// The registry is saved after every mutation; API keys are routed to
/// the credentials repository and never reach the profile store.
pub struct ProfileService<S, C, K> {
    registry: ProfileRegistry,
    store: S,
    credentials: C,
    clock: K,
}

impl<S, C, K> ProfileService<S, C, K>
where
    S: ProfileStore,
    C: CredentialsRepository,
    K: Clock,
{
    /// Creates a service with an empty registry.
    pub fn new(store: S, credentials: C, clock: K) -> Self {
        Self {
            registry: ProfileRegistry::new(),
            store,
            credentials,
            clock,
        }
    }

    /// Loads the registry from storage and rehydrates API keys from
    /// the credentials repository.
    ///
    /// A profile whose key is missing from the vault keeps an empty
    /// in-memory key; connecting with it will fail validation until
    /// the user re-enters the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile store cannot be read.
    pub async fn load(&mut self) -> ApplicationResult<()> {
        self.registry = self.store.load().await?.into_registry();

        let ids: Vec<String> = self.registry.iter().map(|p| p.id.clone()).collect();
        for id in ids {
            match self.credentials.fetch_key(&id).await {
                Ok(Some(key)) => self.registry.attach_api_key(&id, key),
                Ok(None) => {}
                Err(e) => debug!(profile_id = %id, error = %e, "failed to load API key"),
            }
        }
        debug!(profiles = self.registry.len(), "profile registry loaded");
        Ok(())
    }

    /// Creates, validates, persists, and returns a new profile.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or persistence fails.
    pub async fn add_profile(&mut self, input: NewProfile) -> ApplicationResult<ConnectionProfile> {
        let profile = ConnectionProfile {
            id: generate_id(),
            name: input.name,
            api_key: input.api_key,
            base_url: input.base_url,
            created_at: self.clock.now(),
        };
        self.registry.add(profile.clone())?;
        self.persist().await?;
        self.credentials
            .store_key(&profile.id, &profile.api_key)
            .await?;
        Ok(profile)
    }

    /// Applies a partial update, re-storing the key only when it
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is unknown, validation fails,
    /// or persistence fails.
    pub async fn update_profile(
        &mut self,
        id: &str,
        update: ProfileUpdate,
    ) -> ApplicationResult<ConnectionProfile> {
        let new_key = update.api_key.clone();
        let updated = self.registry.update(id, update)?.clone();
        self.persist().await?;
        if let Some(key) = new_key {
            self.credentials.store_key(id, &key).await?;
        }
        Ok(updated)
    }

    /// Deletes a profile, cascading to credential removal. Deleting
    /// an unknown id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub async fn delete_profile(&mut self, id: &str) -> ApplicationResult<()> {
        if self.registry.remove(id).is_some() {
            self.persist().await?;
            self.credentials.remove_key(id).await?;
        }
        Ok(())
    }

    /// Activates a profile (or clears the active one) and resets the
    /// connection state to disconnected.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is unknown or persistence fails.
    pub async fn set_active_profile(
        &mut self,
        id: Option<&str>,
        connection: &mut ConnectionState,
    ) -> ApplicationResult<()> {
        self.registry.set_active(id)?;
        connection.reset();
        self.persist().await
    }

    /// Read access to the registry.
    #[must_use]
    pub const fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    async fn persist(&self) -> ApplicationResult<()> {
        let stored = StoredProfiles::from_registry(&self.registry);
        self.store.save(&stored).await?;
        Ok(())
    }
}
