//! User preferences.

use serde::{Deserialize, Serialize};

/// Theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme.
    Light,
    /// Dark theme (default).
    #[default]
    Dark,
    /// Follow the system preference.
    System,
}

/// Document view mode for the namespace browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Tabular view (default).
    #[default]
    Table,
    /// Raw JSON view.
    Json,
    /// Card grid view.
    Card,
}

/// Minimum sidebar width in pixels.
pub const MIN_SIDEBAR_WIDTH: u32 = 200;
/// Maximum sidebar width in pixels.
pub const MAX_SIDEBAR_WIDTH: u32 = 500;
/// Default sidebar width in pixels.
pub const DEFAULT_SIDEBAR_WIDTH: u32 = 256;
/// Default namespace path delimiter.
pub const DEFAULT_DELIMITER: &str = "_";
/// Maximum number of remembered recent namespaces.
pub const RECENT_NAMESPACE_LIMIT: usize = 10;

/// Persisted user preferences.
///
/// Every field carries a serde default so partial documents from
/// older versions load cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Theme preference.
    #[serde(default)]
    pub theme: Theme,

    /// Whether the sidebar is collapsed.
    #[serde(default)]
    pub sidebar_collapsed: bool,

    /// Sidebar width in pixels, clamped to
    /// [`MIN_SIDEBAR_WIDTH`]..=[`MAX_SIDEBAR_WIDTH`].
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width: u32,

    /// Default page size for the document browser.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Default document view mode.
    #[serde(default)]
    pub default_view_mode: ViewMode,

    /// Recently visited namespaces, most recent first.
    #[serde(default)]
    pub recent_namespaces: Vec<String>,

    /// Delimiter used to split namespace ids into a hierarchy.
    /// Never empty.
    #[serde(default = "default_delimiter")]
    pub namespace_delimiter: String,

    /// Whether the sidebar shows the hierarchy tree (vs. flat list).
    #[serde(default = "default_tree_view")]
    pub namespace_tree_view: bool,
}

fn default_sidebar_width() -> u32 {
    DEFAULT_SIDEBAR_WIDTH
}

fn default_page_size() -> usize {
    50
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

fn default_tree_view() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            sidebar_collapsed: false,
            sidebar_width: default_sidebar_width(),
            default_page_size: default_page_size(),
            default_view_mode: ViewMode::default(),
            recent_namespaces: Vec::new(),
            namespace_delimiter: default_delimiter(),
            namespace_tree_view: default_tree_view(),
        }
    }
}

impl Preferences {
    /// Sets the sidebar width, clamped to the allowed range.
    pub fn set_sidebar_width(&mut self, width: u32) {
        self.sidebar_width = width.clamp(MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH);
    }

    /// Toggles sidebar collapse.
    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
    }

    /// Records a namespace visit: moves it to the front, deduplicated
    /// and capped at [`RECENT_NAMESPACE_LIMIT`].
    pub fn add_recent_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.recent_namespaces.retain(|n| n != &namespace);
        self.recent_namespaces.insert(0, namespace);
        self.recent_namespaces.truncate(RECENT_NAMESPACE_LIMIT);
    }

    /// Sets the namespace delimiter. An empty value is refused and
    /// replaced with the default, matching the tree builder's
    /// rejection of empty delimiters.
    pub fn set_namespace_delimiter(&mut self, delimiter: impl Into<String>) {
        let delimiter = delimiter.into();
        self.namespace_delimiter = if delimiter.is_empty() {
            default_delimiter()
        } else {
            delimiter
        };
    }
}
