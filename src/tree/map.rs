//! MindMap - the aggregate that owns the root node.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::node::{Node, NodeId};
use crate::engine::IdGenerator;
use crate::error::InvariantViolation;

/// Presentation theme. Only `Colorful` changes what the core computes
/// (branch colors); the rest is passed through to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Colorful,
}

/// A mind map: one root node plus its theme.
#[derive(Debug, Clone, PartialEq)]
pub struct MindMap {
    pub root: Node,
    pub theme: Theme,
}

impl MindMap {
    /// Create a map holding a single root node.
    pub fn new(topic: impl Into<String>, ids: &mut dyn IdGenerator) -> Self {
        Self::with_root(Node::new_root(ids.next_id(), topic))
    }

    /// Wrap an existing node as the root of a new map.
    pub fn with_root(mut root: Node) -> Self {
        root.is_root = true;
        root.parent_id = None;
        root.layout_side = None;
        Self {
            root,
            theme: Theme::default(),
        }
    }

    #[inline]
    pub fn root_id(&self) -> &NodeId {
        &self.root.id
    }

    /// Depth-first search from the root.
    pub fn find_node(&self, id: &NodeId) -> Option<&Node> {
        self.root.find(id)
    }

    /// Mutable depth-first search from the root.
    pub fn find_node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.root.find_mut(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.find_node(id).is_some()
    }

    /// The node whose `children` holds `id`, following the back-reference.
    pub fn parent_of(&self, id: &NodeId) -> Option<&Node> {
        let parent_id = self.find_node(id)?.parent_id.as_ref()?;
        self.find_node(parent_id)
    }

    /// Ids on the parent chain of `id`, nearest first, root last.
    pub fn ancestors(&self, id: &NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.find_node(id).and_then(|n| n.parent_id.clone());
        while let Some(parent_id) = current {
            current = self.find_node(&parent_id).and_then(|n| n.parent_id.clone());
            chain.push(parent_id);
        }
        chain
    }

    /// Index among root's children of the first-level branch containing `id`.
    ///
    /// `None` for the root itself or for unknown ids.
    pub fn branch_index(&self, id: &NodeId) -> Option<usize> {
        self.root
            .children
            .iter()
            .position(|branch| branch.contains(id))
    }

    /// Total node count.
    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    /// Verify the structural invariants: a single root without parent,
    /// consistent parent links and unique ids (which also rules out cycles
    /// in an owned tree).
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if !self.root.is_root || self.root.parent_id.is_some() {
            return Err(InvariantViolation::RootFlag(self.root.id.clone()));
        }

        let mut seen = HashSet::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if !seen.insert(&node.id) {
                return Err(InvariantViolation::DuplicateId(node.id.clone()));
            }
            for child in &node.children {
                if child.is_root {
                    return Err(InvariantViolation::RootFlag(child.id.clone()));
                }
                if child.parent_id.as_ref() != Some(&node.id) {
                    return Err(InvariantViolation::ParentLink {
                        node: child.id.clone(),
                        expected: node.id.clone(),
                    });
                }
                stack.push(child);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SequentialIds;

    fn sample() -> MindMap {
        // r -> (a -> a1), b
        let mut a = Node::new(NodeId::from("a"), "A");
        a.add_child(Node::new(NodeId::from("a1"), "A1"));
        let mut root = Node::new_root(NodeId::from("r"), "Root");
        root.add_child(a);
        root.add_child(Node::new(NodeId::from("b"), "B"));
        MindMap::with_root(root)
    }

    #[test]
    fn test_new_map_has_single_root() {
        let mut ids = SequentialIds::new("n");
        let map = MindMap::new("Central", &mut ids);
        assert!(map.root.is_root);
        assert_eq!(map.root.topic, "Central");
        assert_eq!(map.node_count(), 1);
        assert!(map.check_invariants().is_ok());
    }

    #[test]
    fn test_find_and_parent() {
        let map = sample();
        assert_eq!(map.find_node(&"a1".into()).unwrap().topic, "A1");
        assert_eq!(map.parent_of(&"a1".into()).unwrap().id, NodeId::from("a"));
        assert!(map.parent_of(&"r".into()).is_none());
        assert!(map.find_node(&"missing".into()).is_none());
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let map = sample();
        assert_eq!(
            map.ancestors(&"a1".into()),
            vec![NodeId::from("a"), NodeId::from("r")]
        );
        assert!(map.ancestors(&"r".into()).is_empty());
    }

    #[test]
    fn test_branch_index() {
        let map = sample();
        assert_eq!(map.branch_index(&"a1".into()), Some(0));
        assert_eq!(map.branch_index(&"b".into()), Some(1));
        assert_eq!(map.branch_index(&"r".into()), None);
    }

    #[test]
    fn test_invariants_detect_bad_parent_link() {
        let mut map = sample();
        map.root.children[1].parent_id = Some(NodeId::from("a"));
        assert!(matches!(
            map.check_invariants(),
            Err(InvariantViolation::ParentLink { .. })
        ));
    }

    #[test]
    fn test_invariants_detect_duplicate_id() {
        let mut map = sample();
        map.root.children[1].id = NodeId::from("a1");
        assert!(matches!(
            map.check_invariants(),
            Err(InvariantViolation::DuplicateId(_))
        ));
    }

    #[test]
    fn test_invariants_detect_second_root() {
        let mut map = sample();
        map.root.children[0].is_root = true;
        assert!(matches!(
            map.check_invariants(),
            Err(InvariantViolation::RootFlag(_))
        ));
    }
}
