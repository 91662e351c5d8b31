//! Browser tests for the JS facade. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use mindmap_wasm::MindMapWasm;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const SAMPLE: &str = r#"{"nodeData":{"id":"r","topic":"Root","root":true,"children":[
    {"id":"a","topic":"A","children":[{"id":"a1","topic":"A1"}]},
    {"id":"b","topic":"B"}
]},"theme":"colorful"}"#;

#[wasm_bindgen_test]
fn edits_report_success_as_values() {
    let mut map = MindMapWasm::from_json(SAMPLE, JsValue::UNDEFINED).unwrap();
    assert_eq!(map.node_count(), 4);

    let id = map.add_child("a", "A2").unwrap();
    assert_eq!(id.len(), 16);
    assert_eq!(map.parent_id(&id).as_deref(), Some("a"));

    assert!(map.add_sibling("r", true, "nope").is_none());
    assert!(!map.move_node("a", "a1"));
    assert!(!map.remove_node("r"));
    assert!(map.paste_node("a").is_none());

    assert!(map.undo());
    assert_eq!(map.node_count(), 4);
    assert!(map.can_redo());
}

#[wasm_bindgen_test]
fn layout_then_drop() {
    let mut map = MindMapWasm::from_json(SAMPLE, JsValue::UNDEFINED).unwrap();
    map.layout(None).unwrap();

    // the root is centered on the origin
    assert_eq!(map.node_at(0.0, 0.0).as_deref(), Some("r"));
    // center of the root falls in the right zone: a stays first-level, pinned right
    assert!(map.drop_at("a", 0.0, 0.0));
    assert_eq!(map.parent_id("a").as_deref(), Some("r"));

    // after an edit the hit-test index is stale until the next layout
    assert!(map.update_topic("b", "Bee"));
    assert_eq!(map.node_at(0.0, 0.0), None);
}

#[wasm_bindgen_test]
fn round_trip_json() {
    let map = MindMapWasm::from_json(SAMPLE, JsValue::UNDEFINED).unwrap();
    let json = map.to_json().unwrap();
    let again = MindMapWasm::from_json(&json, JsValue::UNDEFINED).unwrap();
    assert_eq!(again.to_json().unwrap(), json);
    assert!(MindMapWasm::from_json("{", JsValue::UNDEFINED).is_err());
}
