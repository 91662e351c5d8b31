//! Serialized form of a mind map.
//!
//! The nested `{ nodeData, theme }` structure is what the JS side stores and
//! what the undo history snapshots. Rebuilding a [`MindMap`] from it relinks
//! every `parent_id` and re-derives the root flag.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::tree::{LayoutSide, MindMap, Node, NodeId, NodeStyle, Theme};

/// Top-level serialized map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MindMapData {
    pub node_data: NodeData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

/// Serialized node. Optional fields are omitted when unset.
///
/// Output is normalized: defaults are never written, so an input carrying
/// `"isFolded": false`, `"children": []` or an empty `style` reads back to
/// the same [`Node`] but serializes without those keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub id: NodeId,
    #[serde(default)]
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeData>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_side: Option<LayoutSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_folded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl From<&Node> for NodeData {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            topic: node.topic.clone(),
            children: (!node.children.is_empty())
                .then(|| node.children.iter().map(NodeData::from).collect()),
            root: node.is_root.then_some(true),
            style: (!node.style.is_empty()).then(|| node.style.clone()),
            image: node.image.clone(),
            layout_side: node.layout_side,
            is_folded: node.is_folded.then_some(true),
            icon: node.icon.clone(),
        }
    }
}

impl NodeData {
    /// Rebuild a node and its subtree, linking children back to `parent`.
    fn into_node(
        self,
        parent: Option<&NodeId>,
        seen: &mut HashSet<NodeId>,
    ) -> Result<Node, PersistError> {
        if !seen.insert(self.id.clone()) {
            return Err(PersistError::DuplicateId(self.id));
        }
        if parent.is_some() && self.root == Some(true) {
            return Err(PersistError::NestedRoot(self.id));
        }

        let mut node = Node::new(self.id, self.topic);
        node.parent_id = parent.cloned();
        node.is_root = parent.is_none();
        node.style = self.style.unwrap_or_default();
        node.image = self.image;
        node.layout_side = self.layout_side;
        node.is_folded = self.is_folded.unwrap_or(false);
        node.icon = self.icon;

        let children = self.children.unwrap_or_default();
        node.children.reserve(children.len());
        for child in children {
            let child = child.into_node(Some(&node.id), seen)?;
            node.children.push(child);
        }
        Ok(node)
    }
}

impl MindMap {
    /// Snapshot this map into its plain serialized form.
    pub fn to_data(&self) -> MindMapData {
        MindMapData {
            node_data: NodeData::from(&self.root),
            theme: Some(self.theme),
        }
    }

    /// Rebuild a map from serialized data.
    pub fn from_data(data: MindMapData) -> Result<Self, PersistError> {
        let mut seen = HashSet::new();
        let root = data.node_data.into_node(None, &mut seen)?;
        Ok(Self {
            root,
            theme: data.theme.unwrap_or_default(),
        })
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(&self.to_data())?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let data: MindMapData = serde_json::from_str(json)?;
        Self::from_data(data)
    }
}
