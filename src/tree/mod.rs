//! Tree data structures.
//!
//! The mind map is an owned tree: every node holds its children by value and
//! keeps only the id of its parent. Containment operations here never check
//! cycles or root protection; that is the mutation engine's job.

mod map;
mod node;

pub use map::{MindMap, Theme};
pub use node::{Descendants, LayoutSide, Node, NodeId, NodeStyle};
