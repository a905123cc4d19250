use thiserror::Error;

use crate::mutation::MutationKind;

#[derive(Debug, Error)]
pub enum MindmapError {
    #[error("malformed mindmap input: {0}")]
    MalformedInput(String),
    #[error("no acyclic path to a root from node {0}")]
    TraversalCycle(String),
    #[error("node {0} is not in the current graph")]
    UnknownNode(String),
    #[error("node {0} is a synthetic chat room root and cannot be changed")]
    SyntheticNode(String),
    #[error("{kind} of node {node_id} failed: {message}")]
    RemoteMutation {
        kind: MutationKind,
        node_id: String,
        message: String,
    },
    #[error("a {kind} of node {node_id} is already in progress")]
    ConcurrentMutation { kind: MutationKind, node_id: String },
    #[error("mutation #{0} is not pending")]
    UnknownMutation(u64),
}

impl MindmapError {
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Self::RemoteMutation { .. }
                | Self::ConcurrentMutation { .. }
                | Self::SyntheticNode(_)
                | Self::UnknownNode(_)
        )
    }
}
