//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree over laid-out node boxes so pointer
//! positions can be resolved to nodes (drop targets, selection rectangles).

mod rtree;

pub use rtree::{NodeBox, SpatialIndex};
