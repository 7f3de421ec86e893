//! Async application controller.
//!
//! Processes `UiCommand`s one at a time and pushes `UiUpdate`s back
//! to the window shell. Every fetch is awaited before the next state
//! transition that depends on it, so cursor and tree state never see
//! overlapping mutation; every failure becomes an inline error
//! update, never a panic.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::debug;

use nimbus_application::browser::DocumentBrowser;
use nimbus_application::connect::ConnectionService;
use nimbus_application::error::ApplicationError;
use nimbus_application::filters::{FilterRow, FullTextSearch, compile_filter_rows};
use nimbus_application::namespaces::NamespaceDirectory;
use nimbus_application::ports::{
    Clock, Credentials, CredentialsRepository, PreferencesStore, ProfileStore, VectorDbApi,
};
use nimbus_application::preferences::PreferencesService;
use nimbus_application::profiles::{NewProfile, ProfileService};
use nimbus_domain::connection::ConnectionState;
use nimbus_domain::namespace::NamespaceSchema;
use nimbus_domain::preferences::ViewMode;
use nimbus_domain::profile::ProfileUpdate;
use nimbus_domain::tree::build_namespace_tree;

use crate::bridge::{ProfileSummary, UiCommand, UiUpdate};
use crate::state::{SidebarState, flat_rows, render_documents};

type UpdateSender = UnboundedSender<UiUpdate>;

/// The application controller: owns all services and view state.
pub struct AppController<A, S, C, K, P> {
    api: A,
    profiles: ProfileService<S, C, K>,
    connector: ConnectionService<A>,
    directory: NamespaceDirectory<A>,
    browser: DocumentBrowser<A>,
    preferences: PreferencesService<P>,
    connection: ConnectionState,
    sidebar: SidebarState,
    view_mode: ViewMode,
    open_schema: Option<NamespaceSchema>,
}

impl<A, S, C, K, P> AppController<A, S, C, K, P>
where
    A: VectorDbApi + Clone,
    S: ProfileStore,
    C: CredentialsRepository,
    K: Clock,
    P: PreferencesStore,
{
    /// Wires the controller over the given adapters.
    pub fn new(
        api: A,
        profile_store: S,
        credentials: C,
        clock: K,
        preferences_store: P,
    ) -> Self {
        Self {
            profiles: ProfileService::new(profile_store, credentials, clock),
            connector: ConnectionService::new(api.clone()),
            directory: NamespaceDirectory::new(api.clone()),
            browser: DocumentBrowser::new(api.clone(), 50),
            preferences: PreferencesService::new(preferences_store),
            connection: ConnectionState::new(),
            sidebar: SidebarState::new(),
            view_mode: ViewMode::default(),
            open_schema: None,
            api,
        }
    }

    /// Startup sequence: load persisted state, publish it, and run
    /// the one-shot connectivity probe for the active profile.
    pub async fn startup(&mut self, updates: &UpdateSender) {
        if let Err(e) = self.preferences.load().await {
            send_error(updates, "Failed to load preferences", &e);
        }
        let preferences = self.preferences.preferences().clone();
        self.view_mode = preferences.default_view_mode;
        self.browser = DocumentBrowser::new(self.api.clone(), preferences.default_page_size);
        send(updates, UiUpdate::PreferencesChanged(Box::new(preferences)));

        if let Err(e) = self.profiles.load().await {
            send_error(updates, "Failed to load profiles", &e);
        }
        self.emit_profiles(updates);

        let probe_ready = self
            .profiles
            .registry()
            .active_profile()
            .is_some_and(|p| !p.api_key.is_empty());
        if probe_ready {
            self.connection.begin_connect();
            self.emit_connection(updates);
        }
        let outcome = self
            .connector
            .startup_probe(self.profiles.registry(), &mut self.connection)
            .await;
        self.emit_connection(updates);

        if matches!(outcome, Some(Ok(_))) {
            self.reload_namespaces(updates, None).await;
        }
    }

    /// Runs the command loop until `Shutdown` or channel close.
    pub async fn run(
        mut self,
        mut commands: UnboundedReceiver<UiCommand>,
        updates: UpdateSender,
    ) {
        while let Some(command) = commands.recv().await {
            if matches!(command, UiCommand::Shutdown) {
                debug!("controller shutting down");
                break;
            }
            self.handle(command, &updates).await;
        }
    }

    async fn handle(&mut self, command: UiCommand, updates: &UpdateSender) {
        match command {
            UiCommand::AddProfile {
                name,
                api_key,
                base_url,
            } => {
                match self
                    .profiles
                    .add_profile(NewProfile {
                        name,
                        api_key,
                        base_url,
                    })
                    .await
                {
                    Ok(profile) => {
                        // Mirror "Add & Connect": activate the new
                        // profile and probe it immediately.
                        self.connect_to(&profile.id, updates).await;
                    }
                    Err(e) => send_error(updates, "Failed to save profile", &e),
                }
            }

            UiCommand::UpdateProfile {
                id,
                name,
                api_key,
                base_url,
            } => {
                let update = ProfileUpdate {
                    name,
                    api_key,
                    base_url,
                };
                match self.profiles.update_profile(&id, update).await {
                    Ok(_) => {
                        self.emit_profiles(updates);
                        if self.profiles.registry().active_profile_id() == Some(id.as_str()) {
                            self.probe_active(updates).await;
                        }
                    }
                    Err(e) => send_error(updates, "Failed to save profile", &e),
                }
            }

            UiCommand::DeleteProfile { id } => {
                let was_active =
                    self.profiles.registry().active_profile_id() == Some(id.as_str());
                match self.profiles.delete_profile(&id).await {
                    Ok(()) => {
                        if was_active {
                            self.connection.reset();
                            self.emit_connection(updates);
                        }
                        self.emit_profiles(updates);
                    }
                    Err(e) => send_error(updates, "Failed to delete profile", &e),
                }
            }

            UiCommand::Connect { id } => {
                self.connect_to(&id, updates).await;
            }

            UiCommand::RefreshNamespaces => {
                let prefix = self.directory.prefix().map(ToString::to_string);
                self.reload_namespaces(updates, prefix).await;
            }

            UiCommand::SearchNamespaces { prefix } => {
                self.reload_namespaces(updates, Some(prefix)).await;
            }

            UiCommand::LoadMoreNamespaces => match self.credentials() {
                Ok(creds) => {
                    if let Err(e) = self.directory.load_more(&creds).await {
                        send_error(updates, "Failed to list namespaces", &e);
                    } else {
                        self.emit_sidebar(updates);
                    }
                }
                Err(e) => send_error(updates, "Failed to list namespaces", &e),
            },

            UiCommand::ToggleTreeNode { path } => {
                self.sidebar.toggle(&path);
                self.emit_sidebar(updates);
            }

            UiCommand::SetDelimiter { delimiter } => {
                if let Err(e) = self.preferences.set_namespace_delimiter(delimiter).await {
                    send_error(updates, "Failed to save preferences", &e);
                }
                // The hierarchy changed shape; stale expansion paths
                // would point at nodes that no longer exist.
                self.sidebar.collapse_all();
                self.emit_preferences(updates);
                self.emit_sidebar(updates);
            }

            UiCommand::SetTreeView { enabled } => {
                if let Err(e) = self.preferences.set_namespace_tree_view(enabled).await {
                    send_error(updates, "Failed to save preferences", &e);
                }
                self.emit_preferences(updates);
                self.emit_sidebar(updates);
            }

            UiCommand::OpenNamespace { id } => {
                self.open_namespace(&id, updates).await;
            }

            UiCommand::NextPage => match self.credentials() {
                Ok(creds) => match self.browser.next_page(&creds).await.map(|page| page.map(|_| ())) {
                    Ok(Some(())) => self.emit_page(updates),
                    Ok(None) => {}
                    Err(e) => send_error(updates, "Failed to load documents", &e),
                },
                Err(e) => send_error(updates, "Failed to load documents", &e),
            },

            UiCommand::PrevPage => match self.credentials() {
                Ok(creds) => match self.browser.prev_page(&creds).await.map(|page| page.map(|_| ())) {
                    Ok(Some(())) => self.emit_page(updates),
                    Ok(None) => {}
                    Err(e) => send_error(updates, "Failed to load documents", &e),
                },
                Err(e) => send_error(updates, "Failed to load documents", &e),
            },

            UiCommand::FirstPage => match self.credentials() {
                Ok(creds) => match self.browser.first_page(&creds).await.map(|_| ()) {
                    Ok(()) => self.emit_page(updates),
                    Err(e) => send_error(updates, "Failed to load documents", &e),
                },
                Err(e) => send_error(updates, "Failed to load documents", &e),
            },

            UiCommand::SetPageSize { size } => match self.credentials() {
                Ok(creds) => match self.browser.set_page_size(&creds, size).await.map(|_| ()) {
                    Ok(()) => self.emit_page(updates),
                    Err(e) => send_error(updates, "Failed to load documents", &e),
                },
                Err(e) => send_error(updates, "Failed to load documents", &e),
            },

            UiCommand::RefreshDocuments => match self.credentials() {
                Ok(creds) => match self.browser.refresh(&creds).await.map(|_| ()) {
                    Ok(()) => self.emit_page(updates),
                    Err(e) => send_error(updates, "Failed to load documents", &e),
                },
                Err(e) => send_error(updates, "Failed to load documents", &e),
            },

            UiCommand::SetViewMode { mode } => {
                self.view_mode = mode;
                if self.browser.namespace_id().is_some() {
                    self.emit_page(updates);
                }
            }

            UiCommand::SetFilters { rows } => {
                self.apply_filters(&rows, updates).await;
            }

            UiCommand::SetFullTextSearch { search } => {
                self.apply_full_text_search(search, updates).await;
            }

            UiCommand::SetTheme { theme } => {
                if let Err(e) = self.preferences.set_theme(theme).await {
                    send_error(updates, "Failed to save preferences", &e);
                }
                self.emit_preferences(updates);
            }

            UiCommand::SetSidebarWidth { width } => {
                if let Err(e) = self.preferences.set_sidebar_width(width).await {
                    send_error(updates, "Failed to save preferences", &e);
                }
                self.emit_preferences(updates);
            }

            UiCommand::ToggleSidebar => {
                if let Err(e) = self.preferences.toggle_sidebar().await {
                    send_error(updates, "Failed to save preferences", &e);
                }
                self.emit_preferences(updates);
            }

            UiCommand::Shutdown => {}
        }
    }

    /// Activates a profile and probes it, publishing each transition.
    async fn connect_to(&mut self, id: &str, updates: &UpdateSender) {
        if let Err(e) = self
            .profiles
            .set_active_profile(Some(id), &mut self.connection)
            .await
        {
            send_error(updates, "Connection failed", &e);
            return;
        }
        self.emit_profiles(updates);
        self.probe_active(updates).await;
    }

    /// Probes the active profile, publishing connecting and final
    /// states. On success the namespace listing reloads.
    async fn probe_active(&mut self, updates: &UpdateSender) {
        let Some(profile) = self.profiles.registry().active_profile().cloned() else {
            return;
        };
        self.connection.begin_connect();
        self.emit_connection(updates);

        let outcome = self.connector.connect(&profile, &mut self.connection).await;
        self.emit_connection(updates);

        if outcome.is_ok() {
            self.reload_namespaces(updates, None).await;
        }
    }

    async fn open_namespace(&mut self, id: &str, updates: &UpdateSender) {
        let creds = match self.credentials() {
            Ok(creds) => creds,
            Err(e) => {
                send_error(updates, "Failed to load namespace", &e);
                return;
            }
        };

        if let Err(e) = self.browser.open(&creds, id).await.map(|_| ()) {
            send_error(updates, "Failed to load namespace", &e);
            return;
        }

        if let Err(e) = self.preferences.add_recent_namespace(id).await {
            send_error(updates, "Failed to save preferences", &e);
        }
        self.emit_preferences(updates);

        match self.browser.metadata(&creds).await {
            Ok(metadata) => {
                self.open_schema = Some(metadata.schema.clone());
                send(updates, UiUpdate::MetadataLoaded(Box::new(metadata)));
            }
            Err(e) => {
                self.open_schema = None;
                send_error(updates, "Failed to load namespace", &e);
            }
        }

        self.emit_page(updates);
    }

    async fn apply_filters(&mut self, rows: &[FilterRow], updates: &UpdateSender) {
        let schema = self.open_schema.clone().unwrap_or_default();
        let filters = match compile_filter_rows(rows, &schema) {
            Ok(filters) => filters,
            Err(e) => {
                send(
                    updates,
                    UiUpdate::Error {
                        title: "Invalid filter".to_string(),
                        message: e.to_string(),
                    },
                );
                return;
            }
        };

        match self.credentials() {
            Ok(creds) => {
                if let Err(e) = self.browser.set_filters(&creds, filters).await.map(|_| ()) {
                    send_error(updates, "Failed to load documents", &e);
                } else {
                    self.emit_page(updates);
                }
            }
            Err(e) => send_error(updates, "Failed to load documents", &e),
        }
    }

    async fn apply_full_text_search(
        &mut self,
        search: Option<FullTextSearch>,
        updates: &UpdateSender,
    ) {
        match self.credentials() {
            Ok(creds) => {
                if let Err(e) = self.browser.set_full_text_search(&creds, search).await.map(|_| ()) {
                    send_error(updates, "Failed to load documents", &e);
                } else {
                    self.emit_page(updates);
                }
            }
            Err(e) => send_error(updates, "Failed to load documents", &e),
        }
    }

    /// Runs a browser fetch and publishes the resulting page.
    async fn with_page_fetch<F>(&mut self, updates: &UpdateSender, fetch: F)
    where
        F: for<'a> FnOnce(
            &'a mut DocumentBrowser<A>,
            Credentials,
        ) -> std::pin::Pin<
            Box<
                dyn std::future::Future<
                        Output = Result<(), nimbus_application::ports::ApiError>,
                    > + Send
                    + 'a,
            >,
        >,
    {
        match self.credentials() {
            Ok(creds) => {
                if let Err(e) = fetch(&mut self.browser, creds).await {
                    send_error(updates, "Failed to load documents", &e);
                } else {
                    self.emit_page(updates);
                }
            }
            Err(e) => send_error(updates, "Failed to load documents", &e),
        }
    }

    async fn reload_namespaces(&mut self, updates: &UpdateSender, prefix: Option<String>) {
        match self.credentials() {
            Ok(creds) => {
                if let Err(e) = self.directory.load_first(&creds, prefix).await.map(|_| ()) {
                    send_error(updates, "Failed to list namespaces", &e);
                } else {
                    self.emit_sidebar(updates);
                }
            }
            Err(e) => send_error(updates, "Failed to list namespaces", &e),
        }
    }

    fn credentials(&self) -> Result<Credentials, ApplicationError> {
        self.profiles
            .registry()
            .active_profile()
            .map(Credentials::from)
            .ok_or_else(|| ApplicationError::NotFound("no active connection profile".to_string()))
    }

    fn emit_connection(&self, updates: &UpdateSender) {
        send(updates, UiUpdate::ConnectionChanged(self.connection.clone()));
    }

    fn emit_preferences(&self, updates: &UpdateSender) {
        send(
            updates,
            UiUpdate::PreferencesChanged(Box::new(self.preferences.preferences().clone())),
        );
    }

    fn emit_profiles(&self, updates: &UpdateSender) {
        let active = self.profiles.registry().active_profile_id();
        let summaries = self
            .profiles
            .registry()
            .iter()
            .map(|profile| ProfileSummary {
                id: profile.id.clone(),
                name: profile.name.clone(),
                base_url: profile.base_url.clone(),
                created_at: profile.created_at.format("%b %-d, %Y %H:%M").to_string(),
                active: Some(profile.id.as_str()) == active,
            })
            .collect();
        send(updates, UiUpdate::ProfilesChanged(summaries));
    }

    fn emit_sidebar(&self, updates: &UpdateSender) {
        let preferences = self.preferences.preferences();
        let rows = if preferences.namespace_tree_view {
            build_namespace_tree(self.directory.items(), &preferences.namespace_delimiter)
                .map_or_else(|_| flat_rows(self.directory.items()), |tree| self.sidebar.flatten(&tree))
        } else {
            flat_rows(self.directory.items())
        };

        send(
            updates,
            UiUpdate::SidebarChanged {
                rows,
                loaded: self.directory.items().len(),
                has_more: self.directory.has_more(),
            },
        );
    }

    fn emit_page(&self, updates: &UpdateSender) {
        let view = render_documents(self.browser.rows(), self.view_mode);
        send(
            updates,
            UiUpdate::PageLoaded {
                namespace_id: self.browser.namespace_id().unwrap_or_default().to_string(),
                page: self.browser.current_page(),
                row_count: self.browser.rows().len(),
                has_more: self.browser.has_more(),
                has_previous: self.browser.has_previous(),
                view,
            },
        );
    }
}

fn send(updates: &UpdateSender, update: UiUpdate) {
    // A closed channel means the shell is gone; nothing to do.
    let _ = updates.send(update);
}

fn send_error(updates: &UpdateSender, title: &str, error: &impl std::fmt::Display) {
    debug!(%title, error = %error, "operation failed");
    send(
        updates,
        UiUpdate::Error {
            title: title.to_string(),
            message: error.to_string(),
        },
    );
}
