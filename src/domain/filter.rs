//! Filter tree entities.
//!
//! A filter node is either an expression filter (predicate text matched
//! against layer records) or a layer group (explicit member handles).
//! Nodes are append-only: a merge adds children but never rewrites the
//! name, kind, expression, or members of an existing node.

use std::collections::BTreeSet;

use crate::domain::layer::LayerId;

/// The two filter variants, as a tagged type rather than a class hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    /// Predicate text, opaque to the merge; evaluated by [`crate::domain::expr`].
    Expression(String),
    /// Explicit member ids in the owning document's namespace.
    Group(BTreeSet<LayerId>),
}

/// A named node in a filter tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterNode {
    pub name: String,
    pub kind: FilterKind,
    /// Insertion order is creation order and is preserved.
    pub children: Vec<FilterNode>,
}

impl FilterNode {
    pub fn expression(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FilterKind::Expression(expr.into()),
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>, members: BTreeSet<LayerId>) -> Self {
        Self {
            name: name.into(),
            kind: FilterKind::Group(members),
            children: Vec::new(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, FilterKind::Group(_))
    }

    /// First child with the given name, in sibling order.
    /// Duplicate names are tolerated; later duplicates are never matched.
    pub fn find_child(&self, name: &str) -> Option<&FilterNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// The filter hierarchy of one document.
///
/// The root is implicit and never takes part in matching; only the
/// top-level nodes and their descendants are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterTree {
    pub nodes: Vec<FilterNode>,
}

impl FilterTree {
    pub fn new(nodes: Vec<FilterNode>) -> Self {
        Self { nodes }
    }

    /// First top-level node with the given name.
    pub fn find(&self, name: &str) -> Option<&FilterNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Total node count across all levels.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[FilterNode]) -> usize {
            nodes.len() + nodes.iter().map(|n| count(&n.children)).sum::<usize>()
        }
        count(&self.nodes)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_duplicate_child_names_when_looking_up_then_first_wins() {
        let mut parent = FilterNode::expression("parent", "NAME == \"*\"");
        let mut first = FilterNode::expression("X", "NAME == \"first\"");
        first.children.push(FilterNode::expression("marker", ""));
        parent.children.push(first);
        parent
            .children
            .push(FilterNode::expression("X", "NAME == \"second\""));

        let hit = parent.find_child("X").unwrap();
        assert_eq!(hit.kind, FilterKind::Expression("NAME == \"first\"".into()));
        assert!(hit.find_child("marker").is_some());
    }

    #[test]
    fn given_nested_tree_when_counting_then_all_levels_included() {
        let mut a = FilterNode::expression("A", "");
        a.children.push(FilterNode::expression("A1", ""));
        let tree = FilterTree::new(vec![a, FilterNode::group("B", BTreeSet::new())]);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn test_name_matching_is_case_sensitive() {
        let parent = FilterTree::new(vec![FilterNode::expression("Walls", "")]);
        assert!(parent.find("Walls").is_some());
        assert!(parent.find("walls").is_none());
    }
}
