//! Node type and related structures.
//!
//! Nodes are the labeled units of the mind map. Each node has:
//! - A stable unique identifier (regenerated only when a subtree is pasted)
//! - Display content (topic text, or an image payload)
//! - An ordered list of children it exclusively owns
//! - A weak back-reference to its parent's id

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable node identifier.
///
/// Ids come from an [`IdGenerator`](crate::engine::IdGenerator) or from
/// deserialized data and are unique within one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new NodeId from anything string-like.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw string value.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<NodeId> for String {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Which side of the root a first-level branch is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutSide {
    Left,
    Right,
}

impl LayoutSide {
    /// Side implied by a root child's position when nothing explicit is set.
    #[inline]
    pub fn from_parity(index: usize) -> Self {
        if index % 2 == 0 {
            LayoutSide::Right
        } else {
            LayoutSide::Left
        }
    }
}

/// Presentation hints (font size, weight, colors, ...).
///
/// Opaque to the core: stored and round-tripped, never interpreted.
pub type NodeStyle = BTreeMap<String, String>;

/// A node of the mind map together with its owned subtree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Display text. Empty for image nodes.
    pub topic: String,
    /// Ordered children. Order is sibling order; there is no rank field.
    pub children: Vec<Node>,
    /// Id of the node whose `children` holds this one. `None` only for the root.
    pub parent_id: Option<NodeId>,
    /// True for exactly one node per tree.
    pub is_root: bool,
    /// Opaque presentation hints.
    pub style: NodeStyle,
    /// Opaque image payload; marks this node as an image node.
    pub image: Option<serde_json::Value>,
    /// Explicit side for root children in "both" layout mode.
    pub layout_side: Option<LayoutSide>,
    /// Descendants are hidden from layout when set.
    pub is_folded: bool,
    /// Key into an external icon set.
    pub icon: Option<String>,
}

impl Node {
    /// Create a detached, childless node.
    pub fn new(id: NodeId, topic: impl Into<String>) -> Self {
        Self {
            id,
            topic: topic.into(),
            children: Vec::new(),
            parent_id: None,
            is_root: false,
            style: NodeStyle::new(),
            image: None,
            layout_side: None,
            is_folded: false,
            icon: None,
        }
    }

    /// Create a root node.
    pub fn new_root(id: NodeId, topic: impl Into<String>) -> Self {
        Self {
            is_root: true,
            ..Self::new(id, topic)
        }
    }

    /// Whether this node carries an image instead of text.
    #[inline]
    pub fn is_image(&self) -> bool {
        self.image.is_some()
    }

    /// Whether the node has children that are currently laid out.
    #[inline]
    pub fn has_visible_children(&self) -> bool {
        !self.is_folded && !self.children.is_empty()
    }

    /// Append a child and point its back-reference at this node.
    pub fn add_child(&mut self, mut node: Node) {
        node.parent_id = Some(self.id.clone());
        self.children.push(node);
    }

    /// Insert a child at `index`, clamped into `[0, len]`.
    pub fn insert_child(&mut self, mut node: Node, index: usize) {
        node.parent_id = Some(self.id.clone());
        let index = index.min(self.children.len());
        self.children.insert(index, node);
    }

    /// Detach the direct child with `id`. Returns `None` if there is none.
    pub fn remove_child(&mut self, id: &NodeId) -> Option<Node> {
        let index = self.child_index(id)?;
        let mut child = self.children.remove(index);
        child.parent_id = None;
        Some(child)
    }

    /// Position of the direct child with `id`.
    pub fn child_index(&self, id: &NodeId) -> Option<usize> {
        self.children.iter().position(|child| &child.id == id)
    }

    /// Whether `id` is this node or one of its descendants.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.descendants().any(|node| &node.id == id)
    }

    /// Depth-first search within this subtree (self included).
    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Mutable depth-first search within this subtree (self included).
    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Pre-order iterator over this node and all of its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Number of nodes in this subtree, self included.
    pub fn count(&self) -> usize {
        self.descendants().count()
    }
}

/// Pre-order traversal that ignores folding.
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str) -> Node {
        Node::new(NodeId::from(id), id)
    }

    #[test]
    fn test_node_id() {
        let id = NodeId::new("abc");
        assert_eq!(id.as_str(), "abc");
        assert_eq!(format!("{}", id), "abc");
        let raw: String = id.into();
        assert_eq!(raw, "abc");
    }

    #[test]
    fn test_side_parity() {
        assert_eq!(LayoutSide::from_parity(0), LayoutSide::Right);
        assert_eq!(LayoutSide::from_parity(1), LayoutSide::Left);
        assert_eq!(LayoutSide::from_parity(4), LayoutSide::Right);
    }

    #[test]
    fn test_add_child_sets_parent() {
        let mut parent = node("p");
        parent.add_child(node("a"));
        assert_eq!(parent.children[0].parent_id, Some(NodeId::from("p")));
    }

    #[test]
    fn test_insert_child_clamps_index() {
        let mut parent = node("p");
        parent.add_child(node("a"));
        parent.insert_child(node("b"), 0);
        parent.insert_child(node("c"), 99);

        let order: Vec<_> = parent.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_remove_child_missing_is_noop() {
        let mut parent = node("p");
        parent.add_child(node("a"));

        assert!(parent.remove_child(&NodeId::from("zzz")).is_none());
        assert_eq!(parent.children.len(), 1);

        let removed = parent.remove_child(&NodeId::from("a")).unwrap();
        assert!(removed.parent_id.is_none());
        assert!(parent.children.is_empty());
    }

    #[test]
    fn test_descendants_preorder() {
        let mut a = node("a");
        a.add_child(node("a1"));
        let mut root = node("r");
        root.add_child(a);
        root.add_child(node("b"));

        let order: Vec<_> = root.descendants().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["r", "a", "a1", "b"]);
        assert_eq!(root.count(), 4);
        assert!(root.contains(&NodeId::from("a1")));
        assert!(!root.children[1].contains(&NodeId::from("a1")));
    }

    #[test]
    fn test_folded_node_has_no_visible_children() {
        let mut a = node("a");
        a.add_child(node("a1"));
        assert!(a.has_visible_children());
        a.is_folded = true;
        assert!(!a.has_visible_children());
    }
}
