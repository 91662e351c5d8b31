//! R-tree over laid-out node boxes using the rstar crate.
//!
//! Provides O(log n) queries for:
//! - The node under a pointer
//! - Nodes intersecting a selection rectangle

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::layout::{LayoutResult, Rect};
use crate::tree::NodeId;

/// A node's box in the spatial index.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBox {
    pub id: NodeId,
    pub rect: Rect,
    /// Pre-order position in the layout, used to break ties between
    /// overlapping boxes (later wins, as it is drawn on top).
    pub order: usize,
}

impl RTreeObject for NodeBox {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.rect.x, self.rect.y],
            [self.rect.right(), self.rect.bottom()],
        )
    }
}

impl PointDistance for NodeBox {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        self.envelope().distance_2(point)
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        self.rect.contains(point[0], point[1])
    }
}

/// Spatial index for laid-out nodes.
///
/// Rebuilt from scratch after every layout pass; bulk loading is cheaper
/// than tracking individual moves.
pub struct SpatialIndex {
    tree: RTree<NodeBox>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load the boxes of a layout result.
    pub fn from_layout(layout: &LayoutResult) -> Self {
        let boxes = layout
            .nodes
            .iter()
            .enumerate()
            .map(|(order, placed)| NodeBox {
                id: placed.id.clone(),
                rect: placed.rect,
                order,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(boxes),
        }
    }

    /// The node whose box contains the point.
    pub fn node_at(&self, x: f32, y: f32) -> Option<&NodeBox> {
        self.tree
            .locate_all_at_point(&[x, y])
            .max_by_key(|node| node.order)
    }

    /// All nodes whose boxes intersect the rectangle, in layout order.
    pub fn in_rect(&self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<NodeId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        let mut hits: Vec<_> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .collect();
        hits.sort_by_key(|node| node.order);
        hits.into_iter().map(|node| node.id.clone()).collect()
    }

    /// Get the number of indexed nodes.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PlacedNode;

    fn layout(boxes: &[(&str, Rect)]) -> LayoutResult {
        LayoutResult {
            nodes: boxes
                .iter()
                .map(|(id, rect)| PlacedNode {
                    id: NodeId::from(*id),
                    rect: *rect,
                    depth: 0,
                    side: None,
                    color: None,
                })
                .collect(),
            connectors: Vec::new(),
            bounds: Rect::default(),
        }
    }

    #[test]
    fn test_node_at() {
        let index = SpatialIndex::from_layout(&layout(&[
            ("a", Rect::new(0.0, 0.0, 10.0, 10.0)),
            ("b", Rect::new(20.0, 0.0, 10.0, 10.0)),
        ]));
        assert_eq!(index.len(), 2);
        assert_eq!(index.node_at(5.0, 5.0).map(|n| n.id.as_str()), Some("a"));
        assert_eq!(index.node_at(25.0, 9.0).map(|n| n.id.as_str()), Some("b"));
        assert!(index.node_at(15.0, 5.0).is_none());
    }

    #[test]
    fn test_overlap_prefers_later_node() {
        let index = SpatialIndex::from_layout(&layout(&[
            ("under", Rect::new(0.0, 0.0, 10.0, 10.0)),
            ("over", Rect::new(5.0, 5.0, 10.0, 10.0)),
        ]));
        assert_eq!(index.node_at(7.0, 7.0).map(|n| n.id.as_str()), Some("over"));
    }

    #[test]
    fn test_in_rect() {
        let index = SpatialIndex::from_layout(&layout(&[
            ("a", Rect::new(0.0, 0.0, 10.0, 10.0)),
            ("b", Rect::new(20.0, 0.0, 10.0, 10.0)),
            ("c", Rect::new(0.0, 50.0, 10.0, 10.0)),
        ]));
        assert_eq!(
            index.in_rect(5.0, -5.0, 25.0, 5.0),
            vec![NodeId::from("a"), NodeId::from("b")]
        );
        assert!(index.in_rect(100.0, 100.0, 120.0, 120.0).is_empty());
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::new();
        assert!(index.is_empty());
        assert!(index.node_at(0.0, 0.0).is_none());
    }
}
