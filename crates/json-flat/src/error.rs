//! Error taxonomy shared by the encoder, the decoder and the graph arena.

use thiserror::Error;

use crate::graph::NodeId;

#[derive(Debug, Error)]
pub enum FlatError {
    /// A leaf the per-slot serializer cannot represent.
    #[error("value is not serializable: {0}")]
    Unserializable(String),
    /// The envelope text is not JSON at all.
    #[error("malformed envelope: {0}")]
    Parse(#[source] serde_json::Error),
    /// The envelope is JSON but not a record table.
    #[error("malformed envelope: {0}")]
    Envelope(String),
    #[error("invalid reference token {0:?}")]
    InvalidToken(String),
    #[error("dangling reference: slot {index} does not exist in a table of {len} slots")]
    DanglingReference { index: usize, len: usize },
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("node {0} is not an object")]
    NotAnObject(NodeId),
    #[error("node {0} is not an array")]
    NotAnArray(NodeId),
    /// Raised when a cyclic graph is materialized as a tree.
    #[error("cycle through node {0} cannot be written as a tree")]
    Cycle(NodeId),
    /// Raised when a graph nests deeper than a tree can be written.
    #[error("value nests deeper than {0} levels and cannot be written as a tree")]
    TooDeep(usize),
}
