//! Mind Map - WASM Module
//!
//! This module provides the core data structures and algorithms for the mind
//! map editor. It is compiled to WebAssembly and exposes a JavaScript-friendly
//! API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `tree`: Owned node tree with parent links and the document root
//! - `persist`: The `{ nodeData, theme }` serialized form
//! - `engine`: Structural mutations, clipboard, id generation, undo history
//! - `editor`: Stateful editor tying edits, history and notifications together
//! - `layout`: Directional left/right layout with connectors
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing
//! - `dropzone`: Drag-and-drop zone classification

use js_sys::Function;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod dropzone;
pub mod editor;
pub mod engine;
pub mod error;
pub mod layout;
pub mod persist;
pub mod spatial;
pub mod tree;

use config::EditorConfig;
use dropzone::DropZone;
use editor::Editor;
use engine::{IdGenerator, Position};
use layout::{CharWidthMeasure, LayoutResult, Measure, Size};
use persist::{MindMapData, NodeData};
use spatial::SpatialIndex;
use tree::{MindMap, Node, NodeId, NodeStyle};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for the mind map editor.
///
/// This struct wraps the internal [`Editor`] and provides the public API
/// exposed to JavaScript. Edits report failure as `false` / `undefined`
/// instead of throwing; only malformed input (bad JSON, unknown enum
/// strings) raises an exception.
#[wasm_bindgen]
pub struct MindMapWasm {
    editor: Editor,
    /// Result of the last `layout()` call, used for hit testing.
    last_layout: Option<LayoutResult>,
    spatial: SpatialIndex,
}

#[wasm_bindgen]
impl MindMapWasm {
    /// Create a map with a single root node.
    ///
    /// `config` is an optional partial `EditorConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(topic: &str, config: JsValue) -> Result<MindMapWasm, JsError> {
        let mut ids = JsIds;
        let map = MindMap::new(topic, &mut ids);
        Ok(Self::from_map(map, parse_config(config)?))
    }

    /// Open a map from its JSON string (`{ nodeData, theme }`).
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str, config: JsValue) -> Result<MindMapWasm, JsError> {
        let map = MindMap::from_json(json)?;
        Ok(Self::from_map(map, parse_config(config)?))
    }

    /// Open a map from a plain JS object (`{ nodeData, theme }`).
    #[wasm_bindgen(js_name = fromData)]
    pub fn from_data(data: JsValue, config: JsValue) -> Result<MindMapWasm, JsError> {
        let data: MindMapData = from_js(data)?;
        let map = MindMap::from_data(data)?;
        Ok(Self::from_map(map, parse_config(config)?))
    }

    // =========================================================================
    // Document
    // =========================================================================

    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsError> {
        Ok(self.editor.map().to_json()?)
    }

    #[wasm_bindgen(js_name = getData)]
    pub fn get_data(&self) -> Result<JsValue, JsError> {
        to_js(&self.editor.data())
    }

    /// Replace the document. Clears undo history.
    #[wasm_bindgen(js_name = loadData)]
    pub fn load_data(&mut self, data: JsValue) -> Result<(), JsError> {
        let data: MindMapData = from_js(data)?;
        self.editor.load(MindMap::from_data(data)?);
        self.invalidate();
        Ok(())
    }

    /// A single node without its children, or `undefined`.
    #[wasm_bindgen(js_name = getNode)]
    pub fn get_node(&self, id: &str) -> Result<JsValue, JsError> {
        match self.editor.map().find_node(&NodeId::from(id)) {
            Some(node) => {
                let mut data = NodeData::from(node);
                data.children = None;
                to_js(&data)
            }
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = rootId)]
    pub fn root_id(&self) -> String {
        self.editor.map().root_id().to_string()
    }

    /// Parent id, or `undefined` for the root and unknown ids.
    #[wasm_bindgen(js_name = parentId)]
    pub fn parent_id(&self, id: &str) -> Option<String> {
        self.editor
            .map()
            .parent_of(&NodeId::from(id))
            .map(|parent| parent.id.to_string())
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.editor.map().node_count() as u32
    }

    /// Bumped on every change.
    pub fn revision(&self) -> f64 {
        self.editor.revision() as f64
    }

    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&mut self, theme: JsValue) -> Result<(), JsError> {
        self.editor.set_theme(from_js(theme)?);
        self.invalidate();
        Ok(())
    }

    /// `"left"`, `"right"` or `"both"`.
    #[wasm_bindgen(js_name = setLayoutMode)]
    pub fn set_layout_mode(&mut self, mode: JsValue) -> Result<(), JsError> {
        self.editor.set_mode(from_js(mode)?);
        self.invalidate();
        Ok(())
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Append a child. Returns the new node's id.
    #[wasm_bindgen(js_name = addChild)]
    pub fn add_child(&mut self, parent: &str, topic: &str) -> Option<String> {
        let result = self.editor.add_child(&parent.into(), topic);
        self.settle(result).map(String::from)
    }

    /// Insert a sibling before (`before = true`) or after `reference`.
    #[wasm_bindgen(js_name = addSibling)]
    pub fn add_sibling(&mut self, reference: &str, before: bool, topic: &str) -> Option<String> {
        let result = self
            .editor
            .add_sibling(&reference.into(), position(before), topic);
        self.settle(result).map(String::from)
    }

    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, id: &str) -> bool {
        let result = self.editor.remove_node(&id.into());
        self.settle(result).is_some()
    }

    #[wasm_bindgen(js_name = moveNode)]
    pub fn move_node(&mut self, id: &str, new_parent: &str) -> bool {
        let result = self.editor.move_node(&id.into(), &new_parent.into());
        self.settle(result).is_some()
    }

    #[wasm_bindgen(js_name = reorderNode)]
    pub fn reorder_node(&mut self, id: &str, target: &str, before: bool) -> bool {
        let result = self
            .editor
            .reorder_node(&id.into(), &target.into(), position(before));
        self.settle(result).is_some()
    }

    #[wasm_bindgen(js_name = moveUp)]
    pub fn move_up(&mut self, id: &str) -> bool {
        let result = self.editor.move_up(&id.into());
        self.settle(result).is_some()
    }

    #[wasm_bindgen(js_name = moveDown)]
    pub fn move_down(&mut self, id: &str) -> bool {
        let result = self.editor.move_down(&id.into());
        self.settle(result).is_some()
    }

    /// Make `id` the parent of `target`, taking the target's place.
    #[wasm_bindgen(js_name = insertNodeAsParent)]
    pub fn insert_node_as_parent(&mut self, id: &str, target: &str) -> bool {
        let result = self.editor.insert_node_as_parent(&id.into(), &target.into());
        self.settle(result).is_some()
    }

    /// Wrap `target` with a new node. Returns the new node's id.
    #[wasm_bindgen(js_name = insertParent)]
    pub fn insert_parent(&mut self, target: &str, topic: &str) -> Option<String> {
        let result = self.editor.insert_parent(&target.into(), topic);
        self.settle(result).map(String::from)
    }

    #[wasm_bindgen(js_name = copyNode)]
    pub fn copy_node(&mut self, id: &str) -> bool {
        self.editor.copy_node(&id.into()).is_ok()
    }

    #[wasm_bindgen(js_name = hasClipboard)]
    pub fn has_clipboard(&self) -> bool {
        !self.editor.engine().clipboard().is_empty()
    }

    /// Paste the clipboard under `parent`. Returns the pasted root's new id.
    #[wasm_bindgen(js_name = pasteNode)]
    pub fn paste_node(&mut self, parent: &str) -> Option<String> {
        let result = self.editor.paste_node(&parent.into());
        self.settle(result).map(String::from)
    }

    #[wasm_bindgen(js_name = cutNode)]
    pub fn cut_node(&mut self, id: &str) -> bool {
        let result = self.editor.cut_node(&id.into());
        self.settle(result).is_some()
    }

    #[wasm_bindgen(js_name = updateTopic)]
    pub fn update_topic(&mut self, id: &str, topic: &str) -> bool {
        let result = self.editor.update_topic(&id.into(), topic);
        self.settle(result).is_some()
    }

    /// Replace the style map (`{ "color": "#333", ... }`).
    #[wasm_bindgen(js_name = setStyle)]
    pub fn set_style(&mut self, id: &str, style: JsValue) -> Result<bool, JsError> {
        let style: NodeStyle = from_js(style)?;
        let result = self.editor.set_style(&id.into(), style);
        Ok(self.settle(result).is_some())
    }

    #[wasm_bindgen(js_name = setIcon)]
    pub fn set_icon(&mut self, id: &str, icon: Option<String>) -> bool {
        let result = self.editor.set_icon(&id.into(), icon);
        self.settle(result).is_some()
    }

    /// Set the image payload; `null` or `undefined` clears it.
    #[wasm_bindgen(js_name = setImage)]
    pub fn set_image(&mut self, id: &str, image: JsValue) -> Result<bool, JsError> {
        let image = if image.is_null() || image.is_undefined() {
            None
        } else {
            Some(from_js::<serde_json::Value>(image)?)
        };
        let result = self.editor.set_image(&id.into(), image);
        Ok(self.settle(result).is_some())
    }

    #[wasm_bindgen(js_name = setFolded)]
    pub fn set_folded(&mut self, id: &str, folded: bool) -> bool {
        let result = self.editor.set_folded(&id.into(), folded);
        self.settle(result).is_some()
    }

    /// Returns the new fold state, or `undefined` for an unknown id.
    #[wasm_bindgen(js_name = toggleFold)]
    pub fn toggle_fold(&mut self, id: &str) -> Option<bool> {
        let result = self.editor.toggle_fold(&id.into());
        self.settle(result)
    }

    /// Pin a first-level node to `"left"` or `"right"`.
    #[wasm_bindgen(js_name = setLayoutSide)]
    pub fn set_layout_side(&mut self, id: &str, side: JsValue) -> Result<bool, JsError> {
        let result = self.editor.set_layout_side(&id.into(), from_js(side)?);
        Ok(self.settle(result).is_some())
    }

    // =========================================================================
    // History
    // =========================================================================

    pub fn undo(&mut self) -> bool {
        let done = self.editor.undo();
        if done {
            self.invalidate();
        }
        done
    }

    pub fn redo(&mut self) -> bool {
        let done = self.editor.redo();
        if done {
            self.invalidate();
        }
        done
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// Start grouping edits into one undo step. Pair with `endBatch`.
    #[wasm_bindgen(js_name = beginBatch)]
    pub fn begin_batch(&mut self) {
        self.editor.begin_batch();
    }

    #[wasm_bindgen(js_name = endBatch)]
    pub fn end_batch(&mut self) {
        self.editor.end_batch();
    }

    /// Register `callback(operation)`, called after every change.
    ///
    /// The callback runs while the editor is borrowed; it must not call back
    /// into this object synchronously.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&mut self, callback: Function) {
        self.editor.on_change(move |op| {
            let arg = match to_js(op) {
                Ok(arg) => arg,
                Err(_) => return,
            };
            if let Err(err) = callback.call1(&JsValue::NULL, &arg) {
                warn!(?err, "change listener threw");
            }
        });
    }

    // =========================================================================
    // Layout and Hit Testing
    // =========================================================================

    /// Compute the layout and rebuild the hit-test index.
    ///
    /// `measure(id, topic)` should return `{ width, height }`; without it a
    /// fixed-width text estimate is used. Returns `{ nodes, connectors, bounds }`.
    pub fn layout(&mut self, measure: Option<Function>) -> Result<JsValue, JsError> {
        let result = match measure {
            Some(function) => self.editor.layout(&JsMeasure::new(function)),
            None => self.editor.layout(&CharWidthMeasure::default()),
        };
        self.spatial = SpatialIndex::from_layout(&result);
        let value = to_js(&result);
        self.last_layout = Some(result);
        value
    }

    /// Topmost node at a point of the last layout.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&self, x: f32, y: f32) -> Option<String> {
        self.spatial.node_at(x, y).map(|hit| hit.id.to_string())
    }

    /// Ids of the nodes intersecting a rectangle, in draw order.
    #[wasm_bindgen(js_name = nodesInRect)]
    pub fn nodes_in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<String> {
        self.spatial
            .in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Zone (`"top"`, `"bottom"`, `"left"`, `"right"`) of the node under the
    /// pointer while dragging `dragged`, or `undefined` if there is no
    /// valid target.
    #[wasm_bindgen(js_name = dropZoneAt)]
    pub fn drop_zone_at(&self, dragged: &str, x: f32, y: f32) -> Result<JsValue, JsError> {
        match drop_target(self.editor.map(), &self.spatial, &dragged.into(), x, y) {
            Some((_, zone)) => to_js(&zone),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Drop `dragged` at a point of the last layout.
    #[wasm_bindgen(js_name = dropAt)]
    pub fn drop_at(&mut self, dragged: &str, x: f32, y: f32) -> bool {
        let dragged = NodeId::from(dragged);
        let Some((target, zone)) = drop_target(self.editor.map(), &self.spatial, &dragged, x, y)
        else {
            return false;
        };
        let result = self.editor.apply_drop(&dragged, &target, zone);
        self.settle(result).is_some()
    }
}

impl MindMapWasm {
    fn from_map(map: MindMap, config: EditorConfig) -> Self {
        Self {
            editor: Editor::with_ids(map, config, JsIds),
            last_layout: None,
            spatial: SpatialIndex::new(),
        }
    }

    /// Turn an edit result into the facade's `Option`, dropping the stale
    /// hit-test index on success.
    fn settle<T>(&mut self, result: Result<T, error::EditError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.invalidate();
                Some(value)
            }
            Err(_) => None,
        }
    }

    fn invalidate(&mut self) {
        if self.last_layout.take().is_some() {
            self.spatial = SpatialIndex::new();
        }
    }
}

/// Pick the drop target under the pointer. The dragged node itself and its
/// own subtree are never targets.
fn drop_target(
    map: &MindMap,
    spatial: &SpatialIndex,
    dragged: &NodeId,
    x: f32,
    y: f32,
) -> Option<(NodeId, DropZone)> {
    let hit = spatial.node_at(x, y)?;
    let subtree = map.find_node(dragged)?;
    if subtree.contains(&hit.id) {
        return None;
    }
    Some((hit.id.clone(), dropzone::classify(&hit.rect, x, y)))
}

fn position(before: bool) -> Position {
    if before {
        Position::Before
    } else {
        Position::After
    }
}

fn parse_config(config: JsValue) -> Result<EditorConfig, JsError> {
    if config.is_undefined() || config.is_null() {
        return Ok(EditorConfig::default());
    }
    from_js(config)
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(value.serialize(&serializer)?)
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsError> {
    Ok(serde_wasm_bindgen::from_value(value)?)
}

/// Time-plus-random hex ids, 16 characters.
struct JsIds;

impl IdGenerator for JsIds {
    fn next_id(&mut self) -> NodeId {
        let time = js_sys::Date::now() as u64;
        let salt = (js_sys::Math::random() * u32::MAX as f64) as u64;
        NodeId::new(random_id(time, salt))
    }
}

fn random_id(time: u64, salt: u64) -> String {
    let raw = format!("{time:x}{salt:08x}");
    raw.chars().rev().take(16).collect::<Vec<_>>().into_iter().rev().collect()
}

/// Measures nodes by calling a JS function `(id, topic) => { width, height }`.
struct JsMeasure {
    function: Function,
    fallback: CharWidthMeasure,
}

impl JsMeasure {
    fn new(function: Function) -> Self {
        Self {
            function,
            fallback: CharWidthMeasure::default(),
        }
    }
}

impl Measure for JsMeasure {
    fn measure(&self, node: &Node) -> Size {
        let id = JsValue::from_str(node.id.as_str());
        let topic = JsValue::from_str(&node.topic);
        let size = self
            .function
            .call2(&JsValue::NULL, &id, &topic)
            .ok()
            .and_then(|value| serde_wasm_bindgen::from_value::<Size>(value).ok());
        match size {
            Some(size) => size,
            None => {
                warn!(id = %node.id, "measure callback failed, using estimate");
                self.fallback.measure(node)
            }
        }
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::engine::SequentialIds;
    use crate::layout::{LayoutMode, Rect};
    use crate::tree::LayoutSide;

    fn fixed(_: &Node) -> Size {
        Size::new(100.0, 20.0)
    }

    /// Editor -> layout -> spatial index -> drop, the path `dropAt` takes,
    /// without JS types.
    #[test]
    fn test_layout_hit_test_and_drop() {
        let json = r#"{"nodeData":{"id":"r","topic":"Root","root":true,"children":[
            {"id":"a","topic":"A","children":[{"id":"a1","topic":"A1"}]},
            {"id":"b","topic":"B"}
        ]}}"#;
        let map = MindMap::from_json(json).unwrap();
        let mut editor = Editor::with_ids(map, EditorConfig::default(), SequentialIds::new("n"));

        let result = editor.layout(&fixed);
        let spatial = SpatialIndex::from_layout(&result);
        assert_eq!(spatial.len(), 4);

        // a grows to the right, b to the left
        let a = result.get(&"a".into()).unwrap().rect;
        let b = result.get(&"b".into()).unwrap().rect;
        assert!(a.x > 0.0);
        assert!(b.right() < 0.0);

        let center = |r: Rect| (r.x + r.width / 2.0, r.center_y());

        // dragging a onto itself or its child finds no target
        let (x, y) = center(a);
        assert_eq!(drop_target(editor.map(), &spatial, &"a".into(), x, y), None);

        // a1 dropped on the outer (left) edge of b nests under b
        let (x, y) = (b.x + 2.0, b.center_y());
        let (target, zone) = drop_target(editor.map(), &spatial, &"a1".into(), x, y).unwrap();
        assert_eq!(target, NodeId::from("b"));
        assert_eq!(zone, DropZone::Left);
        editor.apply_drop(&"a1".into(), &target, zone).unwrap();
        assert_eq!(editor.map().parent_of(&"a1".into()).unwrap().id, NodeId::from("b"));

        // one undo step per drop
        assert!(editor.undo());
        assert_eq!(editor.map().parent_of(&"a1".into()).unwrap().id, NodeId::from("a"));
    }

    #[test]
    fn test_stable_sides_across_layouts() {
        let mut editor = Editor::new(
            MindMap::with_root(Node::new_root("r".into(), "R")),
            EditorConfig::default(),
        );
        let root = editor.map().root_id().clone();
        let first = editor.add_child(&root, "first").unwrap();
        let second = editor.add_child(&root, "second").unwrap();
        let before = editor.layout(&fixed);

        // a new node at the front must not flip the existing branches
        editor.add_sibling(&first, Position::Before, "zero").unwrap();
        let after = editor.layout(&fixed);

        for id in [&first, &second] {
            assert_eq!(before.get(id).unwrap().side, after.get(id).unwrap().side);
        }
        assert_eq!(after.get(&first).unwrap().side, Some(LayoutSide::Right));
        assert_eq!(after.get(&second).unwrap().side, Some(LayoutSide::Left));
    }

    #[test]
    fn test_single_direction_layout() {
        let config = EditorConfig {
            layout_mode: LayoutMode::Left,
            ..EditorConfig::default()
        };
        let mut editor = Editor::new(MindMap::with_root(Node::new_root("r".into(), "R")), config);
        for topic in ["a", "b", "c"] {
            editor.add_child(&"r".into(), topic).unwrap();
        }
        let result = editor.layout(&fixed);
        let root = result.get(&"r".into()).unwrap().rect;
        for placed in result.nodes.iter().filter(|n| n.depth == 1) {
            assert!(placed.rect.right() < root.x);
        }
    }

    #[test]
    fn test_random_id_shape() {
        let id = random_id(0x18f2_a3b4_c5d6, 0xdead_beef);
        assert_eq!(id.len(), 16);
        assert!(id.ends_with("deadbeef"));
        assert_eq!(random_id(1, 2), "100000002");
    }

    #[test]
    fn test_position_flag() {
        assert_eq!(position(true), Position::Before);
        assert_eq!(position(false), Position::After);
    }
}
