//! Namespace hierarchy tree builder.
//!
//! Converts the flat namespace listing into a tree by splitting each
//! identifier on a configurable delimiter. A node plays up to two
//! roles at once: it carries a namespace when some identifier ends at
//! it, and it is a branch when other identifiers pass through it.
//! Both roles are modelled explicitly rather than inferred.

use std::collections::BTreeMap;

use crate::error::{DomainError, DomainResult};
use crate::namespace::NamespaceListItem;

/// A node in the namespace hierarchy.
///
/// Children are kept in a `BTreeMap` keyed by segment name, which
/// yields the lexicographic ordering the sidebar renders in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTreeNode {
    /// Segment name (empty at the root).
    pub name: String,

    /// Full namespace path up to this node: the parent's path plus
    /// the delimiter plus this segment, or just the segment at
    /// depth 0.
    pub full_path: String,

    /// Set when an identifier ends exactly at this node.
    pub namespace: Option<NamespaceListItem>,

    /// Child nodes by segment name.
    pub children: BTreeMap<String, NamespaceTreeNode>,
}

impl NamespaceTreeNode {
    /// Returns true when this node carries a namespace.
    #[must_use]
    pub const fn is_namespace(&self) -> bool {
        self.namespace.is_some()
    }

    /// Returns true when this node has children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Builds the namespace tree from a flat listing.
///
/// The structure is purely a function of `(items, delimiter)`:
/// rebuilding from the same input yields an identical tree. The tree
/// is rebuilt from scratch on every listing or delimiter change;
/// there is no incremental mutation.
///
/// An empty-string identifier produces a single child named `""`.
///
/// # Errors
///
/// Returns [`DomainError::EmptyDelimiter`] when the delimiter is
/// empty: splitting on an empty delimiter has no sensible meaning, so
/// it is rejected outright instead of being left undefined.
pub fn build_namespace_tree(
    items: &[NamespaceListItem],
    delimiter: &str,
) -> DomainResult<NamespaceTreeNode> {
    if delimiter.is_empty() {
        return Err(DomainError::EmptyDelimiter);
    }

    let mut root = NamespaceTreeNode::default();

    for item in items {
        let mut current = &mut root;
        let mut path_so_far = String::new();

        let segments: Vec<&str> = item.id.split(delimiter).collect();
        let last = segments.len() - 1;

        for (i, segment) in segments.into_iter().enumerate() {
            if path_so_far.is_empty() && i == 0 {
                path_so_far.push_str(segment);
            } else {
                path_so_far.push_str(delimiter);
                path_so_far.push_str(segment);
            }

            current = current
                .children
                .entry(segment.to_string())
                .or_insert_with(|| NamespaceTreeNode {
                    name: segment.to_string(),
                    full_path: path_so_far.clone(),
                    namespace: None,
                    children: BTreeMap::new(),
                });

            if i == last {
                current.namespace = Some(item.clone());
            }
        }
    }

    Ok(root)
}
