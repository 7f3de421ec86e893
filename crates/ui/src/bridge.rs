//! UI Bridge Module
//!
//! Defines the communication protocol between the window shell and
//! the async controller: commands flow in, updates flow out, over
//! tokio mpsc channels.

use nimbus_application::filters::{FilterRow, FullTextSearch};
use nimbus_domain::connection::ConnectionState;
use nimbus_domain::namespace::NamespaceMetadata;
use nimbus_domain::preferences::{Preferences, Theme, ViewMode};

use crate::state::{DocumentView, TreeRow};

/// Commands sent from the window shell to the controller.
#[derive(Debug, Clone)]
pub enum UiCommand {
    // --- Profiles & connection ---
    /// User saved a new connection profile.
    AddProfile {
        /// Display name.
        name: String,
        /// API key.
        api_key: String,
        /// Base URL.
        base_url: String,
    },

    /// User edited an existing profile. `None` fields are unchanged.
    UpdateProfile {
        /// Profile id.
        id: String,
        /// New name.
        name: Option<String>,
        /// New API key.
        api_key: Option<String>,
        /// New base URL.
        base_url: Option<String>,
    },

    /// User deleted a profile.
    DeleteProfile {
        /// Profile id.
        id: String,
    },

    /// User clicked Connect on a profile: activates it and probes.
    Connect {
        /// Profile id.
        id: String,
    },

    // --- Sidebar ---
    /// User clicked refresh on the namespace listing.
    RefreshNamespaces,

    /// User typed in the namespace filter box.
    SearchNamespaces {
        /// Prefix text; empty clears the filter.
        prefix: String,
    },

    /// User clicked "Load more" at the bottom of the listing.
    LoadMoreNamespaces,

    /// User toggled expansion of a tree row.
    ToggleTreeNode {
        /// Full path of the row.
        path: String,
    },

    /// User changed the hierarchy delimiter.
    SetDelimiter {
        /// New delimiter; empty resets to the default.
        delimiter: String,
    },

    /// User switched between tree and flat listing.
    SetTreeView {
        /// Tree view on/off.
        enabled: bool,
    },

    // --- Namespace browser ---
    /// User navigated to a namespace.
    OpenNamespace {
        /// Namespace id.
        id: String,
    },

    /// User requested the next page.
    NextPage,

    /// User requested the previous page.
    PrevPage,

    /// User jumped back to the first page.
    FirstPage,

    /// User changed the page size.
    SetPageSize {
        /// New page size.
        size: usize,
    },

    /// User clicked refresh on the document view.
    RefreshDocuments,

    /// User switched the document view mode.
    SetViewMode {
        /// New mode.
        mode: ViewMode,
    },

    /// User applied filter rows from the filter panel.
    SetFilters {
        /// Raw filter rows; compiled against the open namespace's
        /// schema.
        rows: Vec<FilterRow>,
    },

    /// User started or cleared a full-text search.
    SetFullTextSearch {
        /// The search, or `None` to clear it.
        search: Option<FullTextSearch>,
    },

    // --- Preferences ---
    /// User changed the theme.
    SetTheme {
        /// New theme.
        theme: Theme,
    },

    /// User dragged the sidebar resize handle.
    SetSidebarWidth {
        /// New width in pixels (clamped).
        width: u32,
    },

    /// User collapsed or expanded the sidebar.
    ToggleSidebar,

    /// Shell is closing; the controller loop exits.
    Shutdown,
}

/// A profile as shown in the connection list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSummary {
    /// Profile id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Base URL.
    pub base_url: String,
    /// Formatted creation date.
    pub created_at: String,
    /// Whether this is the active profile.
    pub active: bool,
}

/// Updates sent from the controller to the window shell.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    /// Connection state changed.
    ConnectionChanged(ConnectionState),

    /// Profile list changed.
    ProfilesChanged(Vec<ProfileSummary>),

    /// Sidebar contents changed.
    SidebarChanged {
        /// Display rows (tree or flat).
        rows: Vec<TreeRow>,
        /// Namespaces loaded so far.
        loaded: usize,
        /// Whether the listing has another page.
        has_more: bool,
    },

    /// Metadata for the open namespace arrived.
    MetadataLoaded(Box<NamespaceMetadata>),

    /// A document page arrived.
    PageLoaded {
        /// Open namespace id.
        namespace_id: String,
        /// 1-based page counter.
        page: usize,
        /// Rows on this page.
        row_count: usize,
        /// Whether a next page is available.
        has_more: bool,
        /// Whether a previous page is available.
        has_previous: bool,
        /// The rendered view.
        view: DocumentView,
    },

    /// Preferences changed.
    PreferencesChanged(Box<Preferences>),

    /// An operation failed; shown as an inline error state.
    Error {
        /// Short title, e.g. "Failed to load namespace".
        title: String,
        /// Error message, verbatim from the failure.
        message: String,
    },
}
