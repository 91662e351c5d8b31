//! Error types.
//!
//! Every failure here is an expected, recoverable outcome of a user action.
//! Nothing is mutated when an operation returns an error.

use thiserror::Error;

use crate::tree::NodeId;

/// Coarse classification of edit failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced node does not exist.
    NotFound,
    /// The edit would break root uniqueness, create a cycle or touch the root.
    Invariant,
    /// A precondition such as a filled clipboard was not met.
    EmptyPrecondition,
}

/// Reasons a tree edit was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("node not found: {0}")]
    NotFound(NodeId),

    #[error("operation not allowed on the root node")]
    RootProtected,

    #[error("moving {node} under {target} would create a cycle")]
    WouldCycle { node: NodeId, target: NodeId },

    #[error("{node} is already a child of {parent}")]
    AlreadyChild { node: NodeId, parent: NodeId },

    #[error("node {0} cannot be combined with itself")]
    SameNode(NodeId),

    #[error("clipboard is empty")]
    EmptyClipboard,

    #[error("node {0} has no sibling in that direction")]
    NoSibling(NodeId),

    #[error("node id {0} is already in use")]
    DuplicateId(NodeId),

    #[error("node {0} is not a direct child of the root")]
    NotFirstLevel(NodeId),
}

impl EditError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditError::NotFound(_) => ErrorKind::NotFound,
            EditError::EmptyClipboard | EditError::NoSibling(_) => ErrorKind::EmptyPrecondition,
            EditError::RootProtected
            | EditError::WouldCycle { .. }
            | EditError::AlreadyChild { .. }
            | EditError::SameNode(_)
            | EditError::DuplicateId(_)
            | EditError::NotFirstLevel(_) => ErrorKind::Invariant,
        }
    }
}

/// A structural invariant that does not hold.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("root flag misplaced on {0}")]
    RootFlag(NodeId),

    #[error("node {node} does not point back to its parent {expected}")]
    ParentLink { node: NodeId, expected: NodeId },

    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),
}

/// Failures while rebuilding a map from serialized data.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("duplicate node id in data: {0}")]
    DuplicateId(NodeId),

    #[error("node {0} is marked as root but is not the top-level node")]
    NestedRoot(NodeId),

    #[error("invalid mind map JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(EditError::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(EditError::RootProtected.kind(), ErrorKind::Invariant);
        assert_eq!(
            EditError::WouldCycle {
                node: "a".into(),
                target: "b".into()
            }
            .kind(),
            ErrorKind::Invariant
        );
        assert_eq!(EditError::EmptyClipboard.kind(), ErrorKind::EmptyPrecondition);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(EditError::NotFound("n1".into()).to_string(), "node not found: n1");
        assert_eq!(
            EditError::AlreadyChild {
                node: "a".into(),
                parent: "r".into()
            }
            .to_string(),
            "a is already a child of r"
        );
    }
}
