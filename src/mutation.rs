use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info, warn};

use crate::error::MindmapError;
use crate::mindmap::{MindmapData, MindmapRemote};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Split,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Split => "split",
            Self::Delete => "delete",
        })
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MutationTicket(u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationOutcome {
    Split { new_chat_room_id: String },
    Deleted,
}

#[derive(Debug)]
struct PendingMutation {
    kind: MutationKind,
    node_id: String,
    snapshot: MindmapData,
}

#[derive(Debug, Default)]
pub struct MutationCoordinator {
    next_ticket: u64,
    pending: HashMap<u64, PendingMutation>,
}

impl MutationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, node_id: &str) -> bool {
        self.pending
            .values()
            .any(|pending| pending.node_id == node_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Applies `kind` to `data` and records the pre-mutation snapshot.
    ///
    /// Rejected without touching `data` when the node already has a mutation in flight,
    /// is unknown, or is a synthetic chat room root.
    pub fn begin(
        &mut self,
        data: &mut MindmapData,
        kind: MutationKind,
        node_id: &str,
    ) -> Result<MutationTicket, MindmapError> {
        if let Some(pending) = self
            .pending
            .values()
            .find(|pending| pending.node_id == node_id)
        {
            return Err(MindmapError::ConcurrentMutation {
                kind: pending.kind,
                node_id: node_id.to_owned(),
            });
        }

        let node = data
            .node(node_id)
            .ok_or_else(|| MindmapError::UnknownNode(node_id.to_owned()))?;
        if node.is_synthetic {
            return Err(MindmapError::SyntheticNode(node_id.to_owned()));
        }

        let snapshot = data.clone();
        apply_mutation(data, kind, node_id);

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending.insert(
            ticket,
            PendingMutation {
                kind,
                node_id: node_id.to_owned(),
                snapshot,
            },
        );
        info!(ticket, %kind, node_id, "applied optimistic mutation");
        Ok(MutationTicket(ticket))
    }

    /// Settles a mutation. On remote failure `data` is replaced by the snapshot taken
    /// when the mutation began, later pending mutations are replayed on top of it, and
    /// the failure is returned.
    pub fn complete(
        &mut self,
        data: &mut MindmapData,
        ticket: MutationTicket,
        remote_result: anyhow::Result<MutationOutcome>,
    ) -> Result<MutationOutcome, MindmapError> {
        self.settle(Some(data), ticket, remote_result)
    }

    /// Settles a mutation whose local data is gone, leaving every other snapshot as is.
    pub fn abandon(
        &mut self,
        ticket: MutationTicket,
        remote_result: anyhow::Result<MutationOutcome>,
    ) -> Result<MutationOutcome, MindmapError> {
        self.settle(None, ticket, remote_result)
    }

    fn settle(
        &mut self,
        data: Option<&mut MindmapData>,
        ticket: MutationTicket,
        remote_result: anyhow::Result<MutationOutcome>,
    ) -> Result<MutationOutcome, MindmapError> {
        let pending = self
            .pending
            .remove(&ticket.0)
            .ok_or(MindmapError::UnknownMutation(ticket.0))?;

        match remote_result {
            Ok(outcome) => {
                info!(ticket = ticket.0, kind = %pending.kind, node_id = %pending.node_id, "mutation confirmed");
                Ok(outcome)
            }
            Err(error) => {
                warn!(
                    ticket = ticket.0,
                    kind = %pending.kind,
                    node_id = %pending.node_id,
                    error = %error,
                    "mutation failed; restoring snapshot"
                );
                if let Some(data) = data {
                    *data = pending.snapshot;
                    self.replay_after(ticket.0, data);
                }
                Err(MindmapError::RemoteMutation {
                    kind: pending.kind,
                    node_id: pending.node_id,
                    message: format!("{error:#}"),
                })
            }
        }
    }

    // Later snapshots still contain the failed change, so each is retaken before its
    // mutation is applied again.
    fn replay_after(&mut self, ticket: u64, data: &mut MindmapData) {
        let mut later = self
            .pending
            .iter_mut()
            .filter(|(id, _)| **id > ticket)
            .collect::<Vec<_>>();
        later.sort_by_key(|(id, _)| **id);

        for (id, pending) in later {
            pending.snapshot = data.clone();
            apply_mutation(data, pending.kind, &pending.node_id);
            debug!(ticket = *id, kind = %pending.kind, node_id = %pending.node_id, "replayed pending mutation");
        }
    }

    pub fn run(
        &mut self,
        data: &mut MindmapData,
        kind: MutationKind,
        node_id: &str,
        remote: &dyn MindmapRemote,
    ) -> Result<MutationOutcome, MindmapError> {
        let ticket = self.begin(data, kind, node_id)?;
        let result = call_remote(remote, kind, node_id);
        self.complete(data, ticket, result)
    }

    pub fn split(
        &mut self,
        data: &mut MindmapData,
        node_id: &str,
        remote: &dyn MindmapRemote,
    ) -> Result<MutationOutcome, MindmapError> {
        self.run(data, MutationKind::Split, node_id, remote)
    }

    pub fn delete(
        &mut self,
        data: &mut MindmapData,
        node_id: &str,
        remote: &dyn MindmapRemote,
    ) -> Result<MutationOutcome, MindmapError> {
        self.run(data, MutationKind::Delete, node_id, remote)
    }
}

/// The local effect of a mutation. Split drops every relationship pointing at the node;
/// delete drops the node and every relationship touching it.
pub fn apply_mutation(data: &mut MindmapData, kind: MutationKind, node_id: &str) {
    match kind {
        MutationKind::Split => data
            .relationships
            .retain(|relationship| relationship.target != node_id),
        MutationKind::Delete => {
            data.nodes.retain(|node| node.id != node_id);
            data.relationships
                .retain(|relationship| !relationship.touches(node_id));
        }
    }
}

pub fn call_remote(
    remote: &dyn MindmapRemote,
    kind: MutationKind,
    node_id: &str,
) -> anyhow::Result<MutationOutcome> {
    match kind {
        MutationKind::Split => remote
            .split_node(node_id)
            .map(|new_chat_room_id| MutationOutcome::Split { new_chat_room_id }),
        MutationKind::Delete => remote.delete_node(node_id).map(|()| MutationOutcome::Deleted),
    }
}
