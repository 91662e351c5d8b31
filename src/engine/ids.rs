//! Node id generation.

use crate::tree::NodeId;

/// Source of fresh node ids, unique within one document.
pub trait IdGenerator {
    fn next_id(&mut self) -> NodeId;
}

impl<F> IdGenerator for F
where
    F: FnMut() -> NodeId,
{
    fn next_id(&mut self) -> NodeId {
        self()
    }
}

/// Deterministic `prefix-N` ids.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Continue numbering after `start`, e.g. when reopening a saved document.
    pub fn starting_at(prefix: impl Into<String>, start: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next: start,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("node")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> NodeId {
        let id = NodeId::new(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}
