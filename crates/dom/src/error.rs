use crate::types::NodeKey;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} is not live")]
    MissingKey(NodeKey),
    #[error("node {0:?} has the wrong kind for this operation")]
    WrongNodeKind(NodeKey),
    #[error("node {0:?} cannot have children")]
    InvalidParent(NodeKey),
    #[error("node {before:?} is not a child of {parent:?}")]
    InvalidSibling { parent: NodeKey, before: NodeKey },
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    CycleDetected { parent: NodeKey, child: NodeKey },
    #[error("the document root cannot be moved or removed")]
    RootImmutable,
}
