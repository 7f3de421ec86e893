//! UI view-model state.

mod documents;
mod sidebar;

pub use documents::{
    CardView, DocumentCard, DocumentView, JsonView, TableRow, TableView, render_documents,
};
pub use sidebar::{RowControl, SidebarState, TreeRow, flat_rows};
