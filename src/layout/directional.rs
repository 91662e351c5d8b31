//! Directional mind-map layout.
//!
//! The root sits centered at the origin and branches grow horizontally away
//! from it, to the right, to the left, or to both sides.
//!
//! # Algorithm Overview
//!
//! 1. **Measure (bottom-up):** Flatten the visible tree (folded subtrees are
//!    cut off) and compute every node's box and subtree height:
//!    `max(own height + gap, sum of children's subtree heights)`.
//! 2. **Place (top-down):** Each node is vertically centered on its anchor.
//!    Children are stacked from `anchor_y - total / 2`, every child centered in
//!    its own slot, one horizontal gap past the parent's far edge.
//! 3. **Decorate:** Connectors from each parent's far edge to each child's near
//!    edge, and branch colors for the colorful theme.

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use super::geometry::{Rect, Size};
use super::measure::Measure;
use crate::config::LayoutConfig;
use crate::tree::{LayoutSide, MindMap, Node, NodeId, Theme};

/// Which way branches grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Every branch grows to the right.
    Right,
    /// Every branch grows to the left.
    Left,
    /// First-level branches are split between both sides of the root.
    #[default]
    Both,
}

/// A positioned node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedNode {
    pub id: NodeId,
    pub rect: Rect,
    /// Distance from the root (root = 0).
    pub depth: u32,
    /// Growth direction; `None` for the root in `Both` mode.
    pub side: Option<LayoutSide>,
    /// Branch color (colorful theme only).
    pub color: Option<String>,
}

/// A parent-to-child line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub from: NodeId,
    pub to: NodeId,
    pub start: [f32; 2],
    pub end: [f32; 2],
    pub color: Option<String>,
}

/// Result of one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    /// Placed nodes in pre-order; folded descendants are absent.
    pub nodes: Vec<PlacedNode>,
    pub connectors: Vec<Connector>,
    /// Box covering every placed node.
    pub bounds: Rect,
}

impl LayoutResult {
    pub fn get(&self, id: &NodeId) -> Option<&PlacedNode> {
        self.nodes.iter().find(|placed| &placed.id == id)
    }
}

/// Internal per-node data for one pass.
struct LayoutNode<'a> {
    node: &'a Node,
    size: Size,
    subtree_height: f32,
    /// Visible children (indices into the flat node list).
    children: Vec<usize>,
}

/// The directional layout engine.
pub struct DirectionalLayout {
    config: LayoutConfig,
}

impl DirectionalLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(LayoutConfig::default())
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Vertical space the subtree at `node` needs, gap included.
    pub fn subtree_height(&self, node: &Node, measure: &dyn Measure) -> f32 {
        let mut nodes = Vec::new();
        self.build_layout_tree(node, measure, &mut nodes);
        nodes[0].subtree_height
    }

    /// Compute positions and connectors for the whole map.
    ///
    /// Reads the map only. In `Both` mode, first-level nodes without an
    /// explicit side fall back to index parity; call [`lock_sides`] first to
    /// make that choice stick across edits.
    #[instrument(level = "trace", skip_all, fields(mode = ?mode))]
    pub fn compute(&self, map: &MindMap, mode: LayoutMode, measure: &dyn Measure) -> LayoutResult {
        let mut nodes = Vec::new();
        self.build_layout_tree(&map.root, measure, &mut nodes);

        let mut pass = Pass {
            config: &self.config,
            nodes: &nodes,
            colorful: map.theme == Theme::Colorful,
            placed: Vec::with_capacity(nodes.len()),
            connectors: Vec::with_capacity(nodes.len().saturating_sub(1)),
        };

        let root = &nodes[0];
        let root_rect = Rect::new(
            -root.size.width / 2.0,
            -root.size.height / 2.0,
            root.size.width,
            root.size.height,
        );
        pass.placed.push(PlacedNode {
            id: root.node.id.clone(),
            rect: root_rect,
            depth: 0,
            side: match mode {
                LayoutMode::Right => Some(LayoutSide::Right),
                LayoutMode::Left => Some(LayoutSide::Left),
                LayoutMode::Both => None,
            },
            color: None,
        });

        // Group first-level branches by side, keeping their order and their
        // index among all of root's children (for coloring).
        let mut right = Vec::new();
        let mut left = Vec::new();
        for (branch, &child) in root.children.iter().enumerate() {
            match first_level_side(mode, nodes[child].node, branch) {
                LayoutSide::Right => right.push((branch, child)),
                LayoutSide::Left => left.push((branch, child)),
            }
        }

        for (side, group) in [(LayoutSide::Right, right), (LayoutSide::Left, left)] {
            let edge = match side {
                LayoutSide::Right => root_rect.right(),
                LayoutSide::Left => root_rect.x,
            };
            let anchor_x = pass.step(edge, side);
            let total: f32 = group.iter().map(|&(_, c)| nodes[c].subtree_height).sum();
            let mut offset = -total / 2.0;
            for (branch, child) in group {
                let center_y = offset + nodes[child].subtree_height / 2.0;
                let color = pass.branch_color(branch);
                pass.connect(0, [edge, 0.0], child, [anchor_x, center_y], color.clone());
                pass.place(child, anchor_x, center_y, side, 1, color);
                offset += nodes[child].subtree_height;
            }
        }

        let bounds = pass
            .placed
            .iter()
            .map(|p| p.rect)
            .reduce(|acc, rect| acc.union(&rect))
            .unwrap_or(root_rect);
        trace!(placed = pass.placed.len(), "layout complete");

        LayoutResult {
            nodes: pass.placed,
            connectors: pass.connectors,
            bounds,
        }
    }

    fn node_size(&self, node: &Node, measure: &dyn Measure) -> Size {
        if node.is_image() {
            self.config.image_size
        } else {
            measure.measure(node)
        }
    }

    /// Flatten the visible subtree at `node` into `nodes` (pre-order) and
    /// fill in sizes bottom-up. Returns the index of `node`.
    fn build_layout_tree<'a>(
        &self,
        node: &'a Node,
        measure: &dyn Measure,
        nodes: &mut Vec<LayoutNode<'a>>,
    ) -> usize {
        let index = nodes.len();
        let size = self.node_size(node, measure);
        let own = size.height + self.config.vertical_gap;
        nodes.push(LayoutNode {
            node,
            size,
            subtree_height: own,
            children: Vec::new(),
        });

        if !node.has_visible_children() {
            return index;
        }

        let mut children = Vec::with_capacity(node.children.len());
        let mut stacked = 0.0;
        for child in &node.children {
            let child_index = self.build_layout_tree(child, measure, nodes);
            stacked += nodes[child_index].subtree_height;
            children.push(child_index);
        }
        nodes[index].children = children;
        nodes[index].subtree_height = own.max(stacked);
        index
    }
}

impl Default for DirectionalLayout {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Accumulates output while walking the flat node list.
struct Pass<'p, 'a> {
    config: &'p LayoutConfig,
    nodes: &'p [LayoutNode<'a>],
    colorful: bool,
    placed: Vec<PlacedNode>,
    connectors: Vec<Connector>,
}

impl Pass<'_, '_> {
    /// Anchor for children one gap past `edge`.
    fn step(&self, edge: f32, side: LayoutSide) -> f32 {
        match side {
            LayoutSide::Right => edge + self.config.horizontal_gap,
            LayoutSide::Left => edge - self.config.horizontal_gap,
        }
    }

    fn branch_color(&self, branch: usize) -> Option<String> {
        if !self.colorful || self.config.palette.is_empty() {
            return None;
        }
        Some(self.config.palette[branch % self.config.palette.len()].clone())
    }

    fn connect(&mut self, from: usize, start: [f32; 2], to: usize, end: [f32; 2], color: Option<String>) {
        self.connectors.push(Connector {
            from: self.nodes[from].node.id.clone(),
            to: self.nodes[to].node.id.clone(),
            start,
            end,
            color,
        });
    }

    /// Place node `v` with its vertical center on `anchor_y`. `anchor_x` is
    /// the leading edge when growing right and the trailing edge when growing
    /// left.
    fn place(
        &mut self,
        v: usize,
        anchor_x: f32,
        anchor_y: f32,
        side: LayoutSide,
        depth: u32,
        color: Option<String>,
    ) {
        let nodes = self.nodes;
        let LayoutNode { node, size, .. } = &nodes[v];
        let (x, far_edge) = match side {
            LayoutSide::Right => (anchor_x, anchor_x + size.width),
            LayoutSide::Left => (anchor_x - size.width, anchor_x - size.width),
        };
        self.placed.push(PlacedNode {
            id: node.id.clone(),
            rect: Rect::new(x, anchor_y - size.height / 2.0, size.width, size.height),
            depth,
            side: Some(side),
            color: color.clone(),
        });

        let children = &nodes[v].children;
        if children.is_empty() {
            return;
        }

        let child_x = self.step(far_edge, side);
        let total: f32 = children.iter().map(|&c| nodes[c].subtree_height).sum();
        let mut offset = anchor_y - total / 2.0;
        for &child in children {
            let center_y = offset + nodes[child].subtree_height / 2.0;
            self.connect(v, [far_edge, anchor_y], child, [child_x, center_y], color.clone());
            self.place(child, child_x, center_y, side, depth + 1, color.clone());
            offset += nodes[child].subtree_height;
        }
    }
}

/// Side of a first-level node: explicit side wins, then index parity.
fn first_level_side(mode: LayoutMode, node: &Node, index: usize) -> LayoutSide {
    match mode {
        LayoutMode::Right => LayoutSide::Right,
        LayoutMode::Left => LayoutSide::Left,
        LayoutMode::Both => node
            .layout_side
            .unwrap_or_else(|| LayoutSide::from_parity(index)),
    }
}

/// Materialize parity-derived sides on first-level nodes that have none, so
/// later insertions cannot flip them. Returns the indices that were locked.
pub fn lock_sides(map: &mut MindMap) -> Vec<usize> {
    let mut locked = Vec::new();
    for (index, child) in map.root.children.iter_mut().enumerate() {
        if child.layout_side.is_none() {
            child.layout_side = Some(LayoutSide::from_parity(index));
            locked.push(index);
        }
    }
    locked
}

/// Direction the subtree at `id` grows in. `None` for the root in `Both`
/// mode and for unknown ids.
pub fn effective_side(map: &MindMap, mode: LayoutMode, id: &NodeId) -> Option<LayoutSide> {
    if !map.contains(id) {
        return None;
    }
    match mode {
        LayoutMode::Right => Some(LayoutSide::Right),
        LayoutMode::Left => Some(LayoutSide::Left),
        LayoutMode::Both => {
            let index = map.branch_index(id)?;
            Some(first_level_side(mode, &map.root.children[index], index))
        }
    }
}
