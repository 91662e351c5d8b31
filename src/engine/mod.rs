//! Editing machinery: structural mutations, id generation and undo history.
//!
//! The mutation engine borrows the tree per call and never keeps references
//! into it; the history stores whole-document snapshots.

mod history;
mod ids;
mod mutation;

pub use history::History;
pub use ids::{IdGenerator, SequentialIds};
pub use mutation::{Clipboard, MutationEngine, Position};
