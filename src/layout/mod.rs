//! Layout algorithms for mind-map rendering.
//!
//! This module turns the tree into positioned boxes and connector lines. It
//! reads the map only; the renderer on the JS side draws whatever comes out.

pub mod directional;
pub mod geometry;
pub mod measure;

pub use directional::{
    effective_side, lock_sides, Connector, DirectionalLayout, LayoutMode, LayoutResult, PlacedNode,
};
pub use geometry::{Rect, Size};
pub use measure::{CharWidthMeasure, Measure};
