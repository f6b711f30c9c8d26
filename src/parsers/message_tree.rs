//! Edit-history graph of a branching conversation
//!
//! Every node is stored in an arena keyed by its identifier and links to its parent and
//! children by identifier. Regenerations and edits show up as extra children; the
//! canonical reading order follows the first child at every branch point.

use std::collections::HashSet;

use indexmap::IndexMap;

/// Identifier exports use for the synthetic root node
pub const ROOT_MARKER: &str = "client-created-root";

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<T> {
    pub parent: Option<String>,
    pub children: Vec<String>,
    pub payload: Option<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageTree<T> {
    nodes: IndexMap<String, TreeNode<T>>,
}

impl<T> MessageTree<T> {
    pub fn new(nodes: IndexMap<String, TreeNode<T>>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Locate the root node
    ///
    /// Preference order: the [`ROOT_MARKER`] node, the first node without a parent, then the
    /// first node whose parent is not part of the graph. Ties go to mapping order.
    pub fn root(&self) -> Option<&str> {
        if self.nodes.contains_key(ROOT_MARKER) {
            return Some(ROOT_MARKER);
        }

        self.nodes
            .iter()
            .find(|(_, node)| node.parent.is_none())
            .or_else(|| {
                self.nodes.iter().find(|(_, node)| {
                    node.parent.as_deref().is_some_and(|p| !self.nodes.contains_key(p))
                })
            })
            .map(|(id, _)| id.as_str())
    }

    /// Node identifiers along the canonical path from the root
    ///
    /// At each node the walk continues into the first listed child. The walk stops at a
    /// leaf, at a child reference missing from the graph, or on reaching a node twice.
    pub fn first_child_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        let mut current = self.root();

        while let Some(id) = current {
            let Some((key, node)) = self.nodes.get_key_value(id) else {
                break;
            };
            if !visited.insert(key.as_str()) {
                break;
            }
            path.push(key.as_str());
            current = node.children.first().map(String::as_str);
        }

        path
    }

    /// Payloads along the canonical path, skipping nodes that carry none
    pub fn linearize(&self) -> Vec<&T> {
        self.first_child_path()
            .into_iter()
            .filter_map(|id| self.nodes.get(id).and_then(|node| node.payload.as_ref()))
            .collect()
    }
}
