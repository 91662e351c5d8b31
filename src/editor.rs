//! Editor - the stateful front door to the core.
//!
//! Wires the map, the mutation engine, the undo history and the layout
//! together:
//! - every successful edit records the pre-edit snapshot (failed edits
//!   record nothing and leave the map untouched)
//! - in `Both` mode, first-level sides are locked before edits and layout so
//!   insertions never flip existing branches
//! - batches collapse several edits into one undo step and one notification

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::dropzone::{self, DropAction, DropZone};
use crate::engine::{History, IdGenerator, MutationEngine, Position, SequentialIds};
use crate::error::EditError;
use crate::layout::{lock_sides, DirectionalLayout, LayoutMode, LayoutResult, Measure};
use crate::persist::MindMapData;
use crate::tree::{LayoutSide, MindMap, Node, NodeId, NodeStyle, Theme};

/// A change that listeners are told about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "name", content = "id", rename_all = "camelCase")]
pub enum Operation {
    AddChild(NodeId),
    AddSibling(NodeId),
    RemoveNode(NodeId),
    MoveNode(NodeId),
    ReorderNode(NodeId),
    InsertAsParent(NodeId),
    InsertParent(NodeId),
    PasteNode(NodeId),
    CutNode(NodeId),
    UpdateTopic(NodeId),
    SetStyle(NodeId),
    SetIcon(NodeId),
    SetImage(NodeId),
    Fold(NodeId),
    SetLayoutSide(NodeId),
    SetTheme,
    Undo,
    Redo,
    Load,
    /// Several edits applied inside [`Editor::batch`].
    Batch,
}

type Listener = Box<dyn FnMut(&Operation)>;

#[derive(Debug, Default)]
struct BatchState {
    depth: usize,
    /// Pre-batch snapshot, taken when the outermost batch starts.
    snapshot: Option<MindMapData>,
    changed: bool,
    /// A document was loaded while the batch was open.
    loaded: bool,
}

/// Stateful mind-map editor.
pub struct Editor {
    map: MindMap,
    engine: MutationEngine,
    history: History<MindMapData>,
    layout: DirectionalLayout,
    mode: LayoutMode,
    batch: BatchState,
    revision: u64,
    listeners: Vec<Listener>,
}

impl Editor {
    /// Create an editor over `map` with sequential ids.
    pub fn new(map: MindMap, config: EditorConfig) -> Self {
        Self::with_ids(map, config, SequentialIds::default())
    }

    /// Create an editor that draws new node ids from `ids`.
    pub fn with_ids(map: MindMap, config: EditorConfig, ids: impl IdGenerator + 'static) -> Self {
        Self {
            map,
            engine: MutationEngine::new(ids),
            history: History::new(config.history_capacity),
            layout: DirectionalLayout::new(config.layout),
            mode: config.layout_mode,
            batch: BatchState::default(),
            revision: 0,
            listeners: Vec::new(),
        }
    }

    /// The current document.
    pub fn map(&self) -> &MindMap {
        &self.map
    }

    /// The mutation engine, for clipboard inspection.
    pub fn engine(&self) -> &MutationEngine {
        &self.engine
    }

    /// The current layout mode.
    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// Change the layout mode. Not an undoable edit.
    pub fn set_mode(&mut self, mode: LayoutMode) {
        self.mode = mode;
        self.revision += 1;
    }

    /// Counter bumped on every change, for cache invalidation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Serialized snapshot of the current document.
    pub fn data(&self) -> MindMapData {
        self.map.to_data()
    }

    /// Register a change listener.
    pub fn on_change(&mut self, listener: impl FnMut(&Operation) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Replace the whole document. Clears the undo history.
    ///
    /// Inside a batch the loaded document becomes the batch's starting
    /// point, so closing the batch can never undo back past the load.
    pub fn load(&mut self, map: MindMap) {
        self.map = map;
        self.history.clear();
        if self.batch.depth > 0 {
            self.batch.snapshot = Some(self.map.to_data());
            self.batch.changed = false;
            self.batch.loaded = true;
        }
        self.revision += 1;
        debug!(nodes = self.map.node_count(), "document loaded");
        self.notify(Operation::Load);
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Append a new node titled `topic` under `parent`. Unfolds the parent.
    pub fn add_child(&mut self, parent: &NodeId, topic: &str) -> Result<NodeId, EditError> {
        self.edit(
            |engine, map| engine.add_child(map, parent, topic),
            |id| Operation::AddChild(id.clone()),
        )
    }

    /// Insert a new node before or after `reference`. Fails on the root.
    pub fn add_sibling(
        &mut self,
        reference: &NodeId,
        position: Position,
        topic: &str,
    ) -> Result<NodeId, EditError> {
        self.edit(
            |engine, map| engine.add_sibling(map, reference, position, topic),
            |id| Operation::AddSibling(id.clone()),
        )
    }

    /// Remove `id` and its subtree, returning it. The root cannot be removed.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<Node, EditError> {
        self.edit(
            |engine, map| engine.remove_node(map, id),
            |_| Operation::RemoveNode(id.clone()),
        )
    }

    /// Re-parent `id` as the last child of `new_parent`.
    ///
    /// Fails if `new_parent` is inside the moved subtree or already its parent.
    pub fn move_node(&mut self, id: &NodeId, new_parent: &NodeId) -> Result<(), EditError> {
        self.edit(
            |engine, map| engine.move_node(map, id, new_parent),
            |_| Operation::MoveNode(id.clone()),
        )
    }

    /// Place `id` directly before or after `target`, under the target's parent.
    pub fn reorder_node(
        &mut self,
        id: &NodeId,
        target: &NodeId,
        position: Position,
    ) -> Result<(), EditError> {
        self.edit(
            |engine, map| engine.reorder_node(map, id, target, position),
            |_| Operation::ReorderNode(id.clone()),
        )
    }

    /// Swap `id` with its previous sibling.
    pub fn move_up(&mut self, id: &NodeId) -> Result<(), EditError> {
        self.edit(
            |engine, map| engine.move_up(map, id),
            |_| Operation::ReorderNode(id.clone()),
        )
    }

    /// Swap `id` with its next sibling.
    pub fn move_down(&mut self, id: &NodeId) -> Result<(), EditError> {
        self.edit(
            |engine, map| engine.move_down(map, id),
            |_| Operation::ReorderNode(id.clone()),
        )
    }

    /// Move the existing node `id` into `target`'s slot and make `target`
    /// its last child.
    pub fn insert_node_as_parent(&mut self, id: &NodeId, target: &NodeId) -> Result<(), EditError> {
        self.edit(
            |engine, map| engine.insert_node_as_parent(map, id, target),
            |_| Operation::InsertAsParent(id.clone()),
        )
    }

    /// Wrap `target` with a node that is not in the map yet.
    ///
    /// Every id in `node`'s subtree must be new. The subtree is relinked on
    /// the way in, so stray root flags and parent links are dropped.
    pub fn insert_detached_as_parent(&mut self, node: Node, target: &NodeId) -> Result<NodeId, EditError> {
        self.edit(
            |engine, map| engine.insert_detached_as_parent(map, node, target),
            |id| Operation::InsertAsParent(id.clone()),
        )
    }

    /// Wrap `target` with a fresh node titled `topic`.
    pub fn insert_parent(&mut self, target: &NodeId, topic: &str) -> Result<NodeId, EditError> {
        self.edit(
            |engine, map| engine.insert_parent(map, target, topic),
            |id| Operation::InsertParent(id.clone()),
        )
    }

    /// Copy into the clipboard. Does not change the document.
    pub fn copy_node(&mut self, id: &NodeId) -> Result<(), EditError> {
        self.engine.copy_node(&self.map, id)
    }

    /// Paste the clipboard under `parent` with fresh ids.
    pub fn paste_node(&mut self, parent: &NodeId) -> Result<NodeId, EditError> {
        self.edit(
            |engine, map| engine.paste_node(map, parent),
            |id| Operation::PasteNode(id.clone()),
        )
    }

    /// Copy and remove as one undo step.
    pub fn cut_node(&mut self, id: &NodeId) -> Result<Node, EditError> {
        self.edit(
            |engine, map| engine.cut_node(map, id),
            |_| Operation::CutNode(id.clone()),
        )
    }

    /// Replace the topic text of `id`.
    pub fn update_topic(&mut self, id: &NodeId, topic: &str) -> Result<(), EditError> {
        self.edit(
            |engine, map| engine.update_topic(map, id, topic),
            |_| Operation::UpdateTopic(id.clone()),
        )
    }

    /// Replace the style map of `id`.
    pub fn set_style(&mut self, id: &NodeId, style: NodeStyle) -> Result<(), EditError> {
        self.edit(
            |engine, map| engine.set_style(map, id, style),
            |_| Operation::SetStyle(id.clone()),
        )
    }

    /// Set or clear the icon of `id`.
    pub fn set_icon(&mut self, id: &NodeId, icon: Option<String>) -> Result<(), EditError> {
        self.edit(
            |engine, map| engine.set_icon(map, id, icon),
            |_| Operation::SetIcon(id.clone()),
        )
    }

    /// Set or clear the image payload. Setting an image clears the topic.
    pub fn set_image(&mut self, id: &NodeId, image: Option<serde_json::Value>) -> Result<(), EditError> {
        self.edit(
            |engine, map| engine.set_image(map, id, image),
            |_| Operation::SetImage(id.clone()),
        )
    }

    /// Fold or unfold `id`.
    pub fn set_folded(&mut self, id: &NodeId, folded: bool) -> Result<(), EditError> {
        self.edit(
            |engine, map| engine.set_folded(map, id, folded),
            |_| Operation::Fold(id.clone()),
        )
    }

    /// Returns the new fold state.
    pub fn toggle_fold(&mut self, id: &NodeId) -> Result<bool, EditError> {
        self.edit(
            |engine, map| engine.toggle_fold(map, id),
            |_| Operation::Fold(id.clone()),
        )
    }

    /// Pin a first-level branch to one side of the root.
    pub fn set_layout_side(&mut self, id: &NodeId, side: LayoutSide) -> Result<(), EditError> {
        self.edit(
            |engine, map| engine.set_layout_side(map, id, side),
            |_| Operation::SetLayoutSide(id.clone()),
        )
    }

    /// Switch the color theme. Setting the current theme again is a no-op.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.map.theme == theme {
            return;
        }
        let snapshot = self.map.to_data();
        self.map.theme = theme;
        self.commit(snapshot, Operation::SetTheme);
    }

    /// Make `id` a first-level node on `side`, moving it under the root if
    /// needed. One undo step.
    pub fn attach_to_root(&mut self, id: &NodeId, side: LayoutSide) -> Result<(), EditError> {
        self.edit(
            |engine, map| {
                let root = map.root_id().clone();
                if map.root.child_index(id).is_none() {
                    engine.move_node(map, id, &root)?;
                }
                engine.set_layout_side(map, id, side)
            },
            |_| Operation::MoveNode(id.clone()),
        )
    }

    /// Drop `dragged` on `target` in `zone`.
    pub fn apply_drop(&mut self, dragged: &NodeId, target: &NodeId, zone: DropZone) -> Result<(), EditError> {
        let action = dropzone::resolve(&self.map, self.mode, target, zone)
            .ok_or_else(|| EditError::NotFound(target.clone()))?;
        debug!(%dragged, %target, ?zone, ?action, "drop");
        match action {
            DropAction::Reorder(position) => self.reorder_node(dragged, target, position),
            DropAction::AttachToRoot(side) => self.attach_to_root(dragged, side),
            DropAction::MoveInto => self.move_node(dragged, target),
            DropAction::InsertAsParent => self.insert_node_as_parent(dragged, target),
        }
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Whether [`undo`](Self::undo) has anything to restore.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether [`redo`](Self::redo) has anything to re-apply.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restore the state before the last edit. Not available inside a batch.
    pub fn undo(&mut self) -> bool {
        if self.batch.depth > 0 {
            return false;
        }
        let current = self.map.to_data();
        match self.history.undo(current) {
            Some(previous) => self.restore(previous, Operation::Undo),
            None => false,
        }
    }

    /// Re-apply the last undone edit. Not available inside a batch.
    pub fn redo(&mut self) -> bool {
        if self.batch.depth > 0 {
            return false;
        }
        let current = self.map.to_data();
        match self.history.redo(current) {
            Some(next) => self.restore(next, Operation::Redo),
            None => false,
        }
    }

    fn restore(&mut self, snapshot: MindMapData, op: Operation) -> bool {
        match MindMap::from_data(snapshot) {
            Ok(map) => {
                self.map = map;
                self.revision += 1;
                debug!(?op, undo = self.history.undo_len(), redo = self.history.redo_len(), "restored snapshot");
                self.notify(op);
                true
            }
            Err(err) => {
                warn!(%err, "history snapshot could not be restored");
                false
            }
        }
    }

    // =========================================================================
    // Batching
    // =========================================================================

    /// Run several edits as one unit: a single undo step and a single
    /// [`Operation::Batch`] notification. Nested batches join the outer one.
    pub fn batch<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.begin_batch();
        let result = f(self);
        self.end_batch();
        result
    }

    /// Open a batch. Every call must be paired with [`end_batch`](Self::end_batch).
    pub fn begin_batch(&mut self) {
        if self.batch.depth == 0 {
            self.batch.snapshot = Some(self.map.to_data());
            self.batch.changed = false;
            self.batch.loaded = false;
        }
        self.batch.depth += 1;
    }

    /// Close a batch. Closing the outermost batch records one history entry
    /// if anything changed. Unbalanced calls are ignored.
    pub fn end_batch(&mut self) {
        if self.batch.depth == 0 {
            warn!("end_batch without begin_batch");
            return;
        }
        self.batch.depth -= 1;
        if self.batch.depth > 0 {
            return;
        }
        let snapshot = self.batch.snapshot.take();
        let loaded = std::mem::take(&mut self.batch.loaded);
        if let (Some(snapshot), true) = (snapshot, self.batch.changed) {
            self.history.push(snapshot);
            debug!(undo = self.history.undo_len(), "batch committed");
            self.notify(Operation::Batch);
        } else if loaded {
            self.notify(Operation::Load);
        }
    }

    /// Whether a batch is currently open.
    pub fn in_batch(&self) -> bool {
        self.batch.depth > 0
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Lay out the current map. In `Both` mode this first pins parity-derived
    /// sides onto first-level nodes, so the result stays stable across later
    /// insertions.
    pub fn layout(&mut self, measure: &dyn Measure) -> LayoutResult {
        if self.mode == LayoutMode::Both {
            lock_sides(&mut self.map);
        }
        self.layout.compute(&self.map, self.mode, measure)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Run one engine edit. On success the pre-edit snapshot is committed;
    /// on failure the side locks taken for this edit are released again so
    /// the map is exactly as before.
    fn edit<T>(
        &mut self,
        apply: impl FnOnce(&mut MutationEngine, &mut MindMap) -> Result<T, EditError>,
        describe: impl FnOnce(&T) -> Operation,
    ) -> Result<T, EditError> {
        let snapshot = self.map.to_data();
        let locked = if self.mode == LayoutMode::Both {
            lock_sides(&mut self.map)
        } else {
            Vec::new()
        };

        match apply(&mut self.engine, &mut self.map) {
            Ok(value) => {
                let op = describe(&value);
                self.commit(snapshot, op);
                Ok(value)
            }
            Err(err) => {
                for index in locked {
                    if let Some(child) = self.map.root.children.get_mut(index) {
                        child.layout_side = None;
                    }
                }
                debug!(%err, "edit rejected");
                Err(err)
            }
        }
    }

    fn commit(&mut self, snapshot: MindMapData, op: Operation) {
        self.revision += 1;
        if self.batch.depth > 0 {
            self.batch.changed = true;
            debug!(?op, "edit applied in batch");
            return;
        }
        self.history.push(snapshot);
        debug!(?op, undo = self.history.undo_len(), "edit committed");
        self.notify(op);
    }

    fn notify(&mut self, op: Operation) {
        if self.batch.depth > 0 {
            return;
        }
        for listener in &mut self.listeners {
            listener(&op);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Size;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor() -> Editor {
        let mut root = Node::new_root("r".into(), "Root");
        root.add_child(Node::new("a".into(), "A"));
        root.add_child(Node::new("b".into(), "B"));
        Editor::new(MindMap::with_root(root), EditorConfig::default())
    }

    fn fixed(_: &Node) -> Size {
        Size::new(80.0, 20.0)
    }

    #[test]
    fn test_edit_records_history() {
        let mut ed = editor();
        assert!(!ed.can_undo());
        let before = ed.data();

        let id = ed.add_child(&"a".into(), "A1").unwrap();
        assert!(ed.can_undo());
        assert!(ed.map().contains(&id));

        assert!(ed.undo());
        assert!(!ed.map().contains(&id));
        // sides locked by the edit are not part of the restored state
        assert_eq!(ed.data(), before);

        assert!(ed.redo());
        assert!(ed.map().contains(&id));
    }

    #[test]
    fn test_failed_edit_changes_nothing() {
        let mut ed = editor();
        let before = ed.data();
        assert_eq!(
            ed.move_node(&"a".into(), &"a".into()).unwrap_err().kind(),
            crate::error::ErrorKind::Invariant
        );
        assert_eq!(ed.data(), before);
        assert!(!ed.can_undo());
        assert_eq!(ed.revision(), 0);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut ed = editor();
        ed.update_topic(&"a".into(), "A!").unwrap();
        ed.undo();
        assert!(ed.can_redo());
        ed.update_topic(&"b".into(), "B!").unwrap();
        assert!(!ed.can_redo());
        assert!(!ed.redo());
    }

    #[test]
    fn test_sibling_insert_keeps_sides() {
        let mut ed = editor();
        ed.add_sibling(&"b".into(), Position::Before, "x").unwrap();
        let map = ed.map();
        assert_eq!(map.find_node(&"a".into()).unwrap().layout_side, Some(LayoutSide::Right));
        assert_eq!(map.find_node(&"b".into()).unwrap().layout_side, Some(LayoutSide::Left));
    }

    #[test]
    fn test_single_direction_mode_does_not_lock() {
        let mut ed = editor();
        ed.set_mode(LayoutMode::Right);
        ed.add_child(&"r".into(), "c").unwrap();
        assert!(ed.map().root.children.iter().all(|c| c.layout_side.is_none()));
    }

    #[test]
    fn test_cut_is_one_undo_step() {
        let mut ed = editor();
        let before = ed.data();
        ed.cut_node(&"a".into()).unwrap();
        assert!(!ed.map().contains(&"a".into()));
        assert!(ed.undo());
        assert_eq!(ed.data(), before);
        assert!(!ed.can_undo());

        let pasted = ed.paste_node(&"b".into()).unwrap();
        assert_eq!(ed.map().find_node(&pasted).unwrap().topic, "A");
    }

    #[test]
    fn test_batch_single_undo_and_notification() {
        let mut ed = editor();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        ed.on_change(move |op| sink.borrow_mut().push(op.clone()));

        let before = ed.data();
        let ids = ed.batch(|ed| {
            let x = ed.add_child(&"a".into(), "x").unwrap();
            let y = ed.batch(|ed| ed.add_child(&x, "y").unwrap());
            assert!(ed.in_batch());
            assert!(!ed.undo());
            (x, y)
        });

        assert_eq!(*seen.borrow(), vec![Operation::Batch]);
        assert!(ed.map().contains(&ids.1));
        assert!(ed.undo());
        assert_eq!(ed.data(), before);
        assert!(!ed.can_undo());
    }

    #[test]
    fn test_empty_batch_records_nothing() {
        let mut ed = editor();
        ed.batch(|ed| {
            let _ = ed.remove_node(&"r".into());
        });
        assert!(!ed.can_undo());
    }

    #[test]
    fn test_listeners_get_operations() {
        let mut ed = editor();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        ed.on_change(move |op| sink.borrow_mut().push(op.clone()));

        ed.toggle_fold(&"a".into()).unwrap();
        ed.undo();
        let _ = ed.remove_node(&"zz".into());

        assert_eq!(
            *seen.borrow(),
            vec![Operation::Fold("a".into()), Operation::Undo]
        );
    }

    #[test]
    fn test_history_capacity() {
        let config = EditorConfig {
            history_capacity: 3,
            ..EditorConfig::default()
        };
        let mut ed = Editor::new(editor().map().clone(), config);
        for i in 0..5 {
            ed.update_topic(&"a".into(), &format!("A{i}")).unwrap();
        }
        assert!(ed.undo());
        assert!(ed.undo());
        assert!(ed.undo());
        assert!(!ed.undo());
        assert_eq!(ed.map().find_node(&"a".into()).unwrap().topic, "A1");
    }

    #[test]
    fn test_layout_locks_sides() {
        let mut ed = editor();
        let result = ed.layout(&fixed);
        assert_eq!(result.nodes.len(), 3);
        assert_eq!(
            ed.map().find_node(&"b".into()).unwrap().layout_side,
            Some(LayoutSide::Left)
        );
        // layout itself is not an undoable edit
        assert!(!ed.can_undo());
    }

    #[test]
    fn test_apply_drop() {
        let mut ed = editor();
        let a1 = ed.add_child(&"a".into(), "A1").unwrap();

        // b grows left; dropping a1 on b's left edge nests it under b
        ed.apply_drop(&a1, &"b".into(), DropZone::Left).unwrap();
        assert_eq!(ed.map().parent_of(&a1).unwrap().id, NodeId::from("b"));

        // dropping a on b's right edge (inward) makes a the parent of b
        ed.apply_drop(&"a".into(), &"b".into(), DropZone::Right).unwrap();
        assert_eq!(ed.map().parent_of(&"b".into()).unwrap().id, NodeId::from("a"));
        assert_eq!(
            ed.map().find_node(&"a".into()).unwrap().layout_side,
            Some(LayoutSide::Left)
        );

        // dropping on the root's left edge attaches on the left
        ed.apply_drop(&a1, &"r".into(), DropZone::Left).unwrap();
        let node = ed.map().find_node(&a1).unwrap();
        assert_eq!(node.parent_id, Some(NodeId::from("r")));
        assert_eq!(node.layout_side, Some(LayoutSide::Left));

        // and a first-level node can switch sides in place
        ed.apply_drop(&a1, &"r".into(), DropZone::Right).unwrap();
        assert_eq!(
            ed.map().find_node(&a1).unwrap().layout_side,
            Some(LayoutSide::Right)
        );

        assert!(ed.apply_drop(&a1, &"zz".into(), DropZone::Top).is_err());
        assert!(ed.map().check_invariants().is_ok());
    }

    #[test]
    fn test_set_theme_is_undoable() {
        let mut ed = editor();
        ed.set_theme(Theme::Colorful);
        assert_eq!(ed.map().theme, Theme::Colorful);
        ed.undo();
        assert_eq!(ed.map().theme, Theme::Light);
    }

    #[test]
    fn test_set_same_theme_records_nothing() {
        let mut ed = editor();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        ed.on_change(move |op| sink.borrow_mut().push(op.clone()));

        let theme = ed.map().theme;
        ed.set_theme(theme);
        assert!(!ed.can_undo());
        assert_eq!(ed.revision(), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_load_inside_batch_cannot_be_undone() {
        let mut ed = editor();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        ed.on_change(move |op| sink.borrow_mut().push(op.clone()));

        let fresh = MindMap::with_root(Node::new_root("fresh".into(), "Fresh"));
        ed.begin_batch();
        ed.update_topic(&"a".into(), "changed").unwrap();
        ed.load(fresh.clone());
        ed.end_batch();

        assert!(!ed.can_undo());
        assert!(!ed.undo());
        assert_eq!(ed.map(), &fresh);
        assert_eq!(*seen.borrow(), vec![Operation::Load]);
    }

    #[test]
    fn test_edits_after_load_in_batch_undo_to_loaded_map() {
        let mut ed = editor();
        let fresh = MindMap::with_root(Node::new_root("fresh".into(), "Fresh"));
        ed.batch(|ed| {
            ed.load(fresh.clone());
            ed.add_child(&"fresh".into(), "x").unwrap();
        });
        assert!(ed.undo());
        assert_eq!(ed.map(), &fresh);
        assert!(!ed.can_undo());
    }

    #[test]
    fn test_load_clears_history() {
        let mut ed = editor();
        ed.update_topic(&"a".into(), "x").unwrap();
        ed.load(editor().map().clone());
        assert!(!ed.can_undo());
        assert_eq!(ed.map().find_node(&"a".into()).unwrap().topic, "A");
    }
}
