//! Sidebar state: tree expansion plus flattening into display rows.

use std::collections::HashSet;

use nimbus_domain::namespace::NamespaceListItem;
use nimbus_domain::tree::NamespaceTreeNode;

/// How a sidebar row responds to interaction.
///
/// A node that is both a namespace and a branch gets two independent
/// interactions on one row: clicking navigates to its namespace view,
/// the chevron toggles expansion of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowControl {
    /// Namespace with no children: a single click-to-navigate row.
    Leaf {
        /// Target namespace id.
        namespace_id: String,
    },
    /// Children only: expand/collapse, nothing to navigate to.
    Branch,
    /// Namespace that is also a branch: navigate and toggle are both
    /// available.
    BranchNamespace {
        /// Target namespace id.
        namespace_id: String,
    },
}

/// One row of the rendered sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    /// Segment name to display.
    pub name: String,
    /// Full path, the expansion key.
    pub full_path: String,
    /// Nesting depth for indentation.
    pub depth: u32,
    /// Whether the row is currently expanded.
    pub expanded: bool,
    /// Interaction role.
    pub control: RowControl,
}

/// Expansion state plus flattening of the namespace tree.
#[derive(Debug, Clone, Default)]
pub struct SidebarState {
    expanded: HashSet<String>,
}

impl SidebarState {
    /// Creates a state with everything collapsed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles expansion of a path.
    pub fn toggle(&mut self, path: &str) {
        if !self.expanded.remove(path) {
            self.expanded.insert(path.to_string());
        }
    }

    /// Returns true if the path is expanded.
    #[must_use]
    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    /// Collapses everything.
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Flattens the tree into display rows. Children render in their
    /// map order (lexicographic by segment); collapsed branches
    /// contribute no descendant rows. An empty tree flattens to no
    /// rows, which the shell renders as the "no namespaces" state.
    #[must_use]
    pub fn flatten(&self, root: &NamespaceTreeNode) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        self.flatten_children(root, 0, &mut rows);
        rows
    }

    fn flatten_children(&self, node: &NamespaceTreeNode, depth: u32, rows: &mut Vec<TreeRow>) {
        for child in node.children.values() {
            let expanded = self.is_expanded(&child.full_path);
            let control = match (&child.namespace, child.has_children()) {
                (Some(ns), false) => RowControl::Leaf {
                    namespace_id: ns.id.clone(),
                },
                (Some(ns), true) => RowControl::BranchNamespace {
                    namespace_id: ns.id.clone(),
                },
                (None, _) => RowControl::Branch,
            };

            rows.push(TreeRow {
                name: child.name.clone(),
                full_path: child.full_path.clone(),
                depth,
                expanded,
                control,
            });

            if expanded && child.has_children() {
                self.flatten_children(child, depth + 1, rows);
            }
        }
    }
}

/// Rows for the flat (non-tree) listing: every namespace as a
/// depth-0 leaf, in listing order.
#[must_use]
pub fn flat_rows(items: &[NamespaceListItem]) -> Vec<TreeRow> {
    items
        .iter()
        .map(|item| TreeRow {
            name: item.id.clone(),
            full_path: item.id.clone(),
            depth: 0,
            expanded: false,
            control: RowControl::Leaf {
                namespace_id: item.id.clone(),
            },
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use nimbus_domain::tree::build_namespace_tree;

    fn items(ids: &[&str]) -> Vec<NamespaceListItem> {
        ids.iter().map(|id| NamespaceListItem::new(*id)).collect()
    }

    #[test]
    fn test_collapsed_tree_shows_top_level_only() {
        let tree = build_namespace_tree(&items(&["a_b", "a_c", "z"]), "_").unwrap();
        let state = SidebarState::new();

        let rows = state.flatten(&tree);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "a");
        assert_eq!(rows[0].control, RowControl::Branch);
        assert!(!rows[0].expanded);
        assert_eq!(rows[1].name, "z");
        assert_eq!(
            rows[1].control,
            RowControl::Leaf {
                namespace_id: "z".to_string()
            }
        );
    }

    #[test]
    fn test_expansion_reveals_sorted_children() {
        let tree = build_namespace_tree(&items(&["a_c", "a_b"]), "_").unwrap();
        let mut state = SidebarState::new();
        state.toggle("a");

        let rows = state.flatten(&tree);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows[1].full_path, "a_b");
    }

    #[test]
    fn test_dual_role_row() {
        let tree = build_namespace_tree(&items(&["a", "a_b"]), "_").unwrap();
        let state = SidebarState::new();

        let rows = state.flatten(&tree);
        assert_eq!(rows.len(), 1);
        // "a" navigates to its own namespace AND expands separately.
        assert_eq!(
            rows[0].control,
            RowControl::BranchNamespace {
                namespace_id: "a".to_string()
            }
        );
    }

    #[test]
    fn test_collapsed_subtree_contributes_no_rows() {
        let tree = build_namespace_tree(&items(&["a_b_c", "a_b_d"]), "_").unwrap();
        let mut state = SidebarState::new();
        state.toggle("a");

        let rows = state.flatten(&tree);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        // "a_b" stays collapsed, so "c" and "d" are hidden.
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_toggle_roundtrip() {
        let mut state = SidebarState::new();
        state.toggle("x");
        assert!(state.is_expanded("x"));
        state.toggle("x");
        assert!(!state.is_expanded("x"));
    }

    #[test]
    fn test_empty_tree_flattens_to_nothing() {
        let tree = build_namespace_tree(&[], "_").unwrap();
        assert!(SidebarState::new().flatten(&tree).is_empty());
    }

    #[test]
    fn test_flat_rows() {
        let rows = flat_rows(&items(&["b", "a"]));
        // Flat view preserves listing order.
        assert_eq!(rows[0].name, "b");
        assert_eq!(rows[1].name, "a");
        assert!(rows.iter().all(|r| r.depth == 0));
    }
}
