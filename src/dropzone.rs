//! Drop-zone classification for drag and drop.
//!
//! A pointer over a target node falls into one of four zones. Top and bottom
//! reorder next to the target; left and right either nest the dragged node
//! under the target or wrap the target with it, depending on which way the
//! target's branch grows.

use serde::{Deserialize, Serialize};

use crate::engine::Position;
use crate::layout::{effective_side, LayoutMode, Rect};
use crate::tree::{LayoutSide, MindMap, NodeId};

/// Share of the box height (top and bottom) or width (left and right) that
/// each edge zone covers.
const EDGE_FRACTION: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropZone {
    Top,
    Bottom,
    Left,
    Right,
}

/// What dropping in a zone means for the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropAction {
    /// Become the target's previous or next sibling.
    Reorder(Position),
    /// Become a first-level node on the given side of the root.
    AttachToRoot(LayoutSide),
    /// Become the target's last child.
    MoveInto,
    /// Take the target's slot and adopt the target as a child.
    InsertAsParent,
}

/// Classify a pointer position relative to a target box.
///
/// Points outside the box are clamped onto it.
pub fn classify(rect: &Rect, x: f32, y: f32) -> DropZone {
    let rel_y = relative(y - rect.y, rect.height);
    if rel_y < EDGE_FRACTION {
        return DropZone::Top;
    }
    if rel_y > 1.0 - EDGE_FRACTION {
        return DropZone::Bottom;
    }

    let rel_x = relative(x - rect.x, rect.width);
    if rel_x < EDGE_FRACTION {
        DropZone::Left
    } else {
        // right band and the residual center
        DropZone::Right
    }
}

fn relative(offset: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        return 0.5;
    }
    (offset / extent).clamp(0.0, 1.0)
}

/// Map a zone on `target` to an action. `None` when the target is unknown.
pub fn resolve(map: &MindMap, mode: LayoutMode, target: &NodeId, zone: DropZone) -> Option<DropAction> {
    let node = map.find_node(target)?;
    let chosen = match zone {
        DropZone::Top => return Some(DropAction::Reorder(Position::Before)),
        DropZone::Bottom => return Some(DropAction::Reorder(Position::After)),
        DropZone::Left => LayoutSide::Left,
        DropZone::Right => LayoutSide::Right,
    };

    if node.is_root {
        return Some(DropAction::AttachToRoot(chosen));
    }

    let growth = effective_side(map, mode, target)?;
    if chosen == growth {
        Some(DropAction::MoveInto)
    } else {
        Some(DropAction::InsertAsParent)
    }
}
