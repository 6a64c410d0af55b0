//! Depth-first search over a storage tree by type tag and field name.

use crate::types::StorageNode;

/// Type tag of big map nodes.
pub const BIG_MAP: &str = "big_map";

/// Match criteria: a node matches when both its type tag and name are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector<'a> {
    pub node_type: &'a str,
    pub name: &'a str,
}

impl<'a> Selector<'a> {
    pub fn new(node_type: &'a str, name: &'a str) -> Self {
        Self { node_type, name }
    }

    /// Selector for a big map annotated with `name`.
    pub fn big_map(name: &'a str) -> Self {
        Self::new(BIG_MAP, name)
    }

    pub fn matches(&self, node: &StorageNode) -> bool {
        node.node_type == self.node_type && node.name.as_deref() == Some(self.name)
    }
}

/// Returns the first node in pre-order that matches `criteria`.
///
/// The tree is acyclic by construction, so no visited set is kept.
pub fn select<'t>(tree: &'t StorageNode, criteria: &Selector<'_>) -> Option<&'t StorageNode> {
    if criteria.matches(tree) {
        return Some(tree);
    }
    tree.children().iter().find_map(|child| select(child, criteria))
}

/// Returns every matching node in pre-order.
pub fn select_all<'t>(tree: &'t StorageNode, criteria: &Selector<'_>) -> Vec<&'t StorageNode> {
    let mut out = Vec::new();
    collect(tree, criteria, &mut out);
    out
}

fn collect<'t>(node: &'t StorageNode, criteria: &Selector<'_>, out: &mut Vec<&'t StorageNode>) {
    if criteria.matches(node) {
        out.push(node);
    }
    for child in node.children() {
        collect(child, criteria, out);
    }
}
