use crate::model::{NodeId, NodeKind};

/// Errors returned by document and editor operations.
///
/// Content problems (malformed imports, empty spoilers) are repaired rather
/// than reported; these variants only cover misuse of the API.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SpoilerError {
    #[error("node {0:?} does not exist in the document")]
    UnknownNode(NodeId),
    #[error("node {0:?} has no parent")]
    Detached(NodeId),
    #[error("offset {offset} is out of bounds in node {parent:?}")]
    InvalidPosition { parent: NodeId, offset: usize },
    #[error("{child:?} is not allowed in {parent:?}")]
    NotAllowed { parent: NodeKind, child: NodeKind },
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("command is disabled: {0}")]
    CommandDisabled(String),
}
