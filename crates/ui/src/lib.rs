//! Nimbus UI - Toolkit-independent user interface layer
//!
//! The window toolkit itself is an external collaborator; this crate
//! stops at the seam it plugs into: view-model state (sidebar tree,
//! document renderings, display formatting) and the bridge protocol
//! (`UiCommand`/`UiUpdate`) driven by an async controller loop.

pub mod bridge;
pub mod controller;
pub mod format;
pub mod state;

pub use bridge::{ProfileSummary, UiCommand, UiUpdate};
pub use controller::AppController;
pub use format::{format_bytes, format_count, format_timestamp, truncate};
pub use state::{
    CardView, DocumentCard, DocumentView, JsonView, RowControl, SidebarState, TableRow, TableView,
    TreeRow, flat_rows, render_documents,
};
