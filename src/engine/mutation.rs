//! MutationEngine - structural edits on a [`MindMap`].
//!
//! Every operation validates completely before touching the tree, so an
//! `Err` always means the map is exactly as it was. The engine owns the id
//! generator and the single-slot clipboard; the tree itself is borrowed per
//! call.

use std::collections::HashSet;
use std::fmt;

use tracing::instrument;

use super::ids::IdGenerator;
use crate::error::EditError;
use crate::tree::{LayoutSide, MindMap, Node, NodeId, NodeStyle};

/// Where to put a node relative to a reference sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Before,
    After,
}

impl Position {
    #[inline]
    fn offset(self) -> usize {
        match self {
            Position::Before => 0,
            Position::After => 1,
        }
    }
}

/// Single-slot clipboard. Each copy overwrites the previous contents.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    slot: Option<Node>,
}

impl Clipboard {
    /// Whether nothing has been copied yet.
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// The stored subtree, detached and with its original ids.
    pub fn peek(&self) -> Option<&Node> {
        self.slot.as_ref()
    }

    fn store(&mut self, mut subtree: Node) {
        subtree.parent_id = None;
        subtree.is_root = false;
        self.slot = Some(subtree);
    }
}

/// Applies structural edits to a mind map.
pub struct MutationEngine {
    ids: Box<dyn IdGenerator>,
    clipboard: Clipboard,
}

impl fmt::Debug for MutationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationEngine")
            .field("clipboard", &self.clipboard)
            .finish_non_exhaustive()
    }
}

impl MutationEngine {
    /// Create an engine that draws new node ids from `ids`.
    pub fn new(ids: impl IdGenerator + 'static) -> Self {
        Self {
            ids: Box::new(ids),
            clipboard: Clipboard::default(),
        }
    }

    /// Draw an id from the generator that is not used in `map` yet.
    pub fn fresh_id(&mut self, map: &MindMap) -> NodeId {
        fresh_id(self.ids.as_mut(), |id| map.contains(id))
    }

    /// The single-slot clipboard.
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    // =========================================================================
    // Creation and removal
    // =========================================================================

    /// Append a new node under `parent_id`. Unfolds the parent.
    #[instrument(level = "trace", skip(self, map))]
    pub fn add_child(
        &mut self,
        map: &mut MindMap,
        parent_id: &NodeId,
        topic: &str,
    ) -> Result<NodeId, EditError> {
        require(map, parent_id)?;
        let id = self.fresh_id(map);
        let parent = require_mut(map, parent_id)?;
        parent.is_folded = false;
        parent.add_child(Node::new(id.clone(), topic));
        Ok(id)
    }

    /// Insert a new node next to `reference_id`.
    ///
    /// A new first-level node takes the reference's side so the branch does
    /// not jump across the root.
    #[instrument(level = "trace", skip(self, map))]
    pub fn add_sibling(
        &mut self,
        map: &mut MindMap,
        reference_id: &NodeId,
        position: Position,
        topic: &str,
    ) -> Result<NodeId, EditError> {
        let reference = require(map, reference_id)?;
        let parent_id = parent_of(reference)?;
        let side = reference.layout_side;

        let id = self.fresh_id(map);
        let mut node = Node::new(id.clone(), topic);
        let parent = require_mut(map, &parent_id)?;
        let index = parent
            .child_index(reference_id)
            .ok_or_else(|| EditError::NotFound(reference_id.clone()))?;
        if parent.is_root {
            node.layout_side = side;
        }
        parent.insert_child(node, index + position.offset());
        Ok(id)
    }

    /// Detach `id` and its subtree. The root cannot be removed.
    #[instrument(level = "trace", skip(self, map))]
    pub fn remove_node(&mut self, map: &mut MindMap, id: &NodeId) -> Result<Node, EditError> {
        let node = require(map, id)?;
        parent_of(node)?;
        detach(map, id)
    }

    // =========================================================================
    // Structural moves
    // =========================================================================

    /// Re-parent `node_id` as the last child of `new_parent_id`.
    #[instrument(level = "trace", skip(self, map))]
    pub fn move_node(
        &mut self,
        map: &mut MindMap,
        node_id: &NodeId,
        new_parent_id: &NodeId,
    ) -> Result<(), EditError> {
        let node = require(map, node_id)?;
        let old_parent = parent_of(node)?;
        require(map, new_parent_id)?;
        if &old_parent == new_parent_id {
            return Err(EditError::AlreadyChild {
                node: node_id.clone(),
                parent: new_parent_id.clone(),
            });
        }
        if node.contains(new_parent_id) {
            return Err(EditError::WouldCycle {
                node: node_id.clone(),
                target: new_parent_id.clone(),
            });
        }

        let node = detach(map, node_id)?;
        attach(map, new_parent_id, node, None)
    }

    /// Place `node_id` directly before or after `target_id`, possibly under a
    /// different parent.
    #[instrument(level = "trace", skip(self, map))]
    pub fn reorder_node(
        &mut self,
        map: &mut MindMap,
        node_id: &NodeId,
        target_id: &NodeId,
        position: Position,
    ) -> Result<(), EditError> {
        if node_id == target_id {
            return Err(EditError::SameNode(node_id.clone()));
        }
        let node = require(map, node_id)?;
        let node_parent = parent_of(node)?;
        let target = require(map, target_id)?;
        let target_parent = parent_of(target)?;
        let target_side = target.layout_side;

        if node_parent != target_parent && node.contains(&target_parent) {
            return Err(EditError::WouldCycle {
                node: node_id.clone(),
                target: target_id.clone(),
            });
        }

        let mut node = detach(map, node_id)?;
        let parent = require_mut(map, &target_parent)?;
        // Detaching an earlier sibling shifts the target, so look it up again.
        let index = parent
            .child_index(target_id)
            .ok_or_else(|| EditError::NotFound(target_id.clone()))?;
        node.layout_side = if parent.is_root { target_side } else { None };
        parent.insert_child(node, index + position.offset());
        Ok(())
    }

    /// Swap `id` with its previous sibling.
    pub fn move_up(&mut self, map: &mut MindMap, id: &NodeId) -> Result<(), EditError> {
        self.swap_with_sibling(map, id, Position::Before)
    }

    /// Swap `id` with its next sibling.
    pub fn move_down(&mut self, map: &mut MindMap, id: &NodeId) -> Result<(), EditError> {
        self.swap_with_sibling(map, id, Position::After)
    }

    fn swap_with_sibling(
        &mut self,
        map: &mut MindMap,
        id: &NodeId,
        direction: Position,
    ) -> Result<(), EditError> {
        let parent_id = parent_of(require(map, id)?)?;
        let parent = require_mut(map, &parent_id)?;
        let index = parent
            .child_index(id)
            .ok_or_else(|| EditError::NotFound(id.clone()))?;
        let other = match direction {
            Position::Before => index.checked_sub(1),
            Position::After => Some(index + 1).filter(|&i| i < parent.children.len()),
        }
        .ok_or_else(|| EditError::NoSibling(id.clone()))?;
        parent.children.swap(index, other);
        Ok(())
    }

    /// Make `node_id` the new parent of `target_id`: the node takes the
    /// target's slot and the target becomes the node's last child.
    #[instrument(level = "trace", skip(self, map))]
    pub fn insert_node_as_parent(
        &mut self,
        map: &mut MindMap,
        node_id: &NodeId,
        target_id: &NodeId,
    ) -> Result<(), EditError> {
        if node_id == target_id {
            return Err(EditError::SameNode(node_id.clone()));
        }
        let target = require(map, target_id)?;
        parent_of(target)?;
        require(map, node_id)?;
        if map.ancestors(target_id).contains(node_id) {
            return Err(EditError::WouldCycle {
                node: node_id.clone(),
                target: target_id.clone(),
            });
        }

        let node = detach(map, node_id)?;
        wrap_target(map, node, target_id)
    }

    /// Like [`insert_node_as_parent`](Self::insert_node_as_parent) for a node
    /// that is not part of the map yet.
    ///
    /// Ids anywhere in `node`'s subtree must be unique and unused in `map`,
    /// otherwise this fails with [`EditError::DuplicateId`]. Parent links are
    /// rebuilt from `node` down and any root flag inside the subtree is cleared.
    #[instrument(level = "trace", skip(self, map, node), fields(node = %node.id))]
    pub fn insert_detached_as_parent(
        &mut self,
        map: &mut MindMap,
        mut node: Node,
        target_id: &NodeId,
    ) -> Result<NodeId, EditError> {
        let target = require(map, target_id)?;
        parent_of(target)?;
        if &node.id == target_id || map.ancestors(target_id).contains(&node.id) {
            return Err(EditError::WouldCycle {
                node: node.id.clone(),
                target: target_id.clone(),
            });
        }
        check_detached_ids(map, &node)?;

        relink(&mut node, None);
        let id = node.id.clone();
        wrap_target(map, node, target_id)?;
        Ok(id)
    }

    /// Wrap `target_id` with a fresh node titled `topic`.
    pub fn insert_parent(
        &mut self,
        map: &mut MindMap,
        target_id: &NodeId,
        topic: &str,
    ) -> Result<NodeId, EditError> {
        parent_of(require(map, target_id)?)?;
        let node = Node::new(self.fresh_id(map), topic);
        self.insert_detached_as_parent(map, node, target_id)
    }

    // =========================================================================
    // Clipboard
    // =========================================================================

    /// Deep-copy the subtree at `id` into the clipboard.
    #[instrument(level = "trace", skip(self, map))]
    pub fn copy_node(&mut self, map: &MindMap, id: &NodeId) -> Result<(), EditError> {
        let node = require(map, id)?;
        self.clipboard.store(node.clone());
        Ok(())
    }

    /// Attach a copy of the clipboard under `parent_id`, with every id
    /// regenerated. The clipboard keeps its contents for further pastes.
    #[instrument(level = "trace", skip(self, map))]
    pub fn paste_node(&mut self, map: &mut MindMap, parent_id: &NodeId) -> Result<NodeId, EditError> {
        let mut subtree = self
            .clipboard
            .peek()
            .cloned()
            .ok_or(EditError::EmptyClipboard)?;
        require(map, parent_id)?;

        let mut taken = HashSet::new();
        regenerate_ids(&mut subtree, self.ids.as_mut(), map, &mut taken, None);
        let id = subtree.id.clone();
        attach(map, parent_id, subtree, None)?;
        Ok(id)
    }

    /// Copy then remove. The root cannot be cut, and a failed cut leaves the
    /// clipboard untouched.
    pub fn cut_node(&mut self, map: &mut MindMap, id: &NodeId) -> Result<Node, EditError> {
        parent_of(require(map, id)?)?;
        self.copy_node(map, id)?;
        self.remove_node(map, id)
    }

    // =========================================================================
    // Content edits
    // =========================================================================

    /// Replace the topic text of `id`.
    pub fn update_topic(&mut self, map: &mut MindMap, id: &NodeId, topic: &str) -> Result<(), EditError> {
        require_mut(map, id)?.topic = topic.to_owned();
        Ok(())
    }

    /// Replace the whole style map of `id`.
    pub fn set_style(&mut self, map: &mut MindMap, id: &NodeId, style: NodeStyle) -> Result<(), EditError> {
        require_mut(map, id)?.style = style;
        Ok(())
    }

    /// Set or clear the icon of `id`.
    pub fn set_icon(&mut self, map: &mut MindMap, id: &NodeId, icon: Option<String>) -> Result<(), EditError> {
        require_mut(map, id)?.icon = icon;
        Ok(())
    }

    /// Set or clear the image payload. Image nodes carry no topic text.
    pub fn set_image(
        &mut self,
        map: &mut MindMap,
        id: &NodeId,
        image: Option<serde_json::Value>,
    ) -> Result<(), EditError> {
        let node = require_mut(map, id)?;
        if image.is_some() {
            node.topic.clear();
        }
        node.image = image;
        Ok(())
    }

    /// Fold or unfold `id`. Folding a leaf is allowed and has no visible effect.
    pub fn set_folded(&mut self, map: &mut MindMap, id: &NodeId, folded: bool) -> Result<(), EditError> {
        require_mut(map, id)?.is_folded = folded;
        Ok(())
    }

    /// Flip the fold state; returns the new state.
    pub fn toggle_fold(&mut self, map: &mut MindMap, id: &NodeId) -> Result<bool, EditError> {
        let node = require_mut(map, id)?;
        node.is_folded = !node.is_folded;
        Ok(node.is_folded)
    }

    /// Pin a first-level branch to one side of the root.
    pub fn set_layout_side(
        &mut self,
        map: &mut MindMap,
        id: &NodeId,
        side: LayoutSide,
    ) -> Result<(), EditError> {
        if map.root.child_index(id).is_none() {
            require(map, id)?;
            return Err(EditError::NotFirstLevel(id.clone()));
        }
        require_mut(map, id)?.layout_side = Some(side);
        Ok(())
    }
}

impl Default for MutationEngine {
    fn default() -> Self {
        Self::new(super::SequentialIds::default())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn require<'a>(map: &'a MindMap, id: &NodeId) -> Result<&'a Node, EditError> {
    map.find_node(id).ok_or_else(|| EditError::NotFound(id.clone()))
}

fn require_mut<'a>(map: &'a mut MindMap, id: &NodeId) -> Result<&'a mut Node, EditError> {
    map.find_node_mut(id)
        .ok_or_else(|| EditError::NotFound(id.clone()))
}

/// Parent id of a non-root node.
fn parent_of(node: &Node) -> Result<NodeId, EditError> {
    match &node.parent_id {
        Some(parent) if !node.is_root => Ok(parent.clone()),
        _ => Err(EditError::RootProtected),
    }
}

/// Remove `id` from its parent's children and hand it back.
fn detach(map: &mut MindMap, id: &NodeId) -> Result<Node, EditError> {
    let parent_id = parent_of(require(map, id)?)?;
    require_mut(map, &parent_id)?
        .remove_child(id)
        .ok_or_else(|| EditError::NotFound(id.clone()))
}

/// Attach a detached node under `parent_id`, appending when `index` is `None`.
/// Sides only mean something on first-level nodes.
fn attach(
    map: &mut MindMap,
    parent_id: &NodeId,
    mut node: Node,
    index: Option<usize>,
) -> Result<(), EditError> {
    let parent = require_mut(map, parent_id)?;
    if !parent.is_root {
        node.layout_side = None;
    }
    match index {
        Some(index) => parent.insert_child(node, index),
        None => parent.add_child(node),
    }
    Ok(())
}

/// Put `wrapper` into `target_id`'s slot and move the target underneath it.
fn wrap_target(map: &mut MindMap, mut wrapper: Node, target_id: &NodeId) -> Result<(), EditError> {
    let parent_id = parent_of(require(map, target_id)?)?;
    let parent = require_mut(map, &parent_id)?;
    let index = parent
        .child_index(target_id)
        .ok_or_else(|| EditError::NotFound(target_id.clone()))?;
    let mut target = parent
        .remove_child(target_id)
        .ok_or_else(|| EditError::NotFound(target_id.clone()))?;

    wrapper.is_root = false;
    wrapper.layout_side = if parent.is_root {
        target.layout_side
    } else {
        None
    };
    target.layout_side = None;
    wrapper.add_child(target);
    parent.insert_child(wrapper, index);
    Ok(())
}

/// Next generated id for which `is_taken` is false. A colliding id gets a
/// numeric suffix rather than being handed out twice.
fn fresh_id(ids: &mut dyn IdGenerator, is_taken: impl Fn(&NodeId) -> bool) -> NodeId {
    let base = ids.next_id();
    if !is_taken(&base) {
        return base;
    }
    let mut suffix = 1u64;
    loop {
        let candidate = NodeId::new(format!("{base}-{suffix}"));
        if !is_taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Give every node in the subtree a fresh id and relink parent references.
fn regenerate_ids(
    node: &mut Node,
    ids: &mut dyn IdGenerator,
    map: &MindMap,
    taken: &mut HashSet<NodeId>,
    parent: Option<&NodeId>,
) {
    node.id = fresh_id(ids, |id| map.contains(id) || taken.contains(id));
    taken.insert(node.id.clone());
    node.parent_id = parent.cloned();
    node.is_root = false;
    if parent.is_some() {
        node.layout_side = None;
    }
    let id = node.id.clone();
    for child in &mut node.children {
        regenerate_ids(child, ids, map, taken, Some(&id));
    }
}

/// Every id in a detached subtree must be unique within the subtree and
/// unused in `map`.
fn check_detached_ids(map: &MindMap, node: &Node) -> Result<(), EditError> {
    let mut seen = HashSet::new();
    for n in node.descendants() {
        if map.contains(&n.id) || !seen.insert(&n.id) {
            return Err(EditError::DuplicateId(n.id.clone()));
        }
    }
    Ok(())
}

/// Rebuild parent links top-down. Only the top node may keep a side, and no
/// node below it can claim to be a root.
fn relink(node: &mut Node, parent: Option<&NodeId>) {
    node.parent_id = parent.cloned();
    node.is_root = false;
    if parent.is_some() {
        node.layout_side = None;
    }
    let id = node.id.clone();
    for child in &mut node.children {
        relink(child, Some(&id));
    }
}
