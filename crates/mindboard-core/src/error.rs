//! Error types for board mutations and clipboard handling.

use crate::element::ElementId;
use crate::tree::NodePath;
use thiserror::Error;

/// Errors raised while mutating the scene tree.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("path {0:?} does not resolve to a node")]
    InvalidPath(NodePath),
    #[error("element not found: {0}")]
    ElementNotFound(ElementId),
    #[error("element {0} is a root-level element and has no parent")]
    NoParent(ElementId),
    #[error("cannot move {from:?} into its own subtree at {to:?}")]
    MoveIntoDescendant { from: NodePath, to: NodePath },
    #[error("invalid value for property `{key}`: {source}")]
    InvalidProperty {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors raised while reading a clipboard payload.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard payload is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("clipboard payload was written by `{0}`")]
    ForeignSource(String),
    #[error("clipboard holds no board payload")]
    MissingPayload,
}
