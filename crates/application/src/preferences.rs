//! Preferences service: plain state plus persist-after-mutation.

use nimbus_domain::preferences::{Preferences, Theme, ViewMode};

use crate::error::ApplicationResult;
use crate::ports::PreferencesStore;

/// Owns the in-memory preferences and writes them back after every
/// mutating action.
pub struct PreferencesService<P> {
    preferences: Preferences,
    store: P,
}

impl<P: PreferencesStore> PreferencesService<P> {
    /// Creates a service with default preferences.
    pub fn new(store: P) -> Self {
        Self {
            preferences: Preferences::default(),
            store,
        }
    }

    /// Loads preferences from storage (defaults when missing).
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn load(&mut self) -> ApplicationResult<()> {
        self.preferences = self.store.load().await?;
        Ok(())
    }

    /// Read access to the current preferences.
    #[must_use]
    pub const fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Sets the theme.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub async fn set_theme(&mut self, theme: Theme) -> ApplicationResult<()> {
        self.preferences.theme = theme;
        self.persist().await
    }

    /// Toggles sidebar collapse.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub async fn toggle_sidebar(&mut self) -> ApplicationResult<()> {
        self.preferences.toggle_sidebar();
        self.persist().await
    }

    /// Sets the sidebar width (clamped).
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub async fn set_sidebar_width(&mut self, width: u32) -> ApplicationResult<()> {
        self.preferences.set_sidebar_width(width);
        self.persist().await
    }

    /// Sets the default page size.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub async fn set_default_page_size(&mut self, size: usize) -> ApplicationResult<()> {
        self.preferences.default_page_size = size.max(1);
        self.persist().await
    }

    /// Sets the default view mode.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub async fn set_default_view_mode(&mut self, mode: ViewMode) -> ApplicationResult<()> {
        self.preferences.default_view_mode = mode;
        self.persist().await
    }

    /// Records a namespace visit in the recent list.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub async fn add_recent_namespace(
        &mut self,
        namespace: impl Into<String> + Send,
    ) -> ApplicationResult<()> {
        self.preferences.add_recent_namespace(namespace);
        self.persist().await
    }

    /// Sets the namespace delimiter (empty values reset to default).
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub async fn set_namespace_delimiter(
        &mut self,
        delimiter: impl Into<String> + Send,
    ) -> ApplicationResult<()> {
        self.preferences.set_namespace_delimiter(delimiter);
        self.persist().await
    }

    /// Toggles between tree and flat sidebar listing.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub async fn set_namespace_tree_view(&mut self, enabled: bool) -> ApplicationResult<()> {
        self.preferences.namespace_tree_view = enabled;
        self.persist().await
    }

    async fn persist(&self) -> ApplicationResult<()> {
        self.store.save(&self.preferences).await?;
        Ok(())
    }
}
