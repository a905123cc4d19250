use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::graph::{Direction, GraphIndex, trace_root_path};

use super::graph::{MindmapData, NodeRecord};

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    #[default]
    All,
    ChatRoom(String),
    /// The whole tree containing this node: its root and every descendant of that root.
    Subtree(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::ChatRoom(id) => write!(f, "room {id}"),
            Self::Subtree(id) => write!(f, "subtree of {id}"),
        }
    }
}

impl Scope {
    pub fn apply(&self, data: &MindmapData) -> MindmapData {
        match self {
            Self::All => data.clone(),
            Self::ChatRoom(room) => filter_chat_room(data, room),
            Self::Subtree(node_id) => filter_subtree(data, node_id),
        }
    }
}

fn filter_chat_room(data: &MindmapData, room: &str) -> MindmapData {
    let nodes = data
        .nodes
        .iter()
        .filter(|node| node.chat_room_id.as_deref() == Some(room))
        .cloned()
        .collect::<Vec<_>>();
    retain_among(data, nodes)
}

fn filter_subtree(data: &MindmapData, node_id: &str) -> MindmapData {
    let (index, _) = GraphIndex::from_data(data);
    let root = match trace_root_path(&index, node_id) {
        Ok(path) => path[0],
        Err(error) => {
            debug!(%error, "subtree scope is empty");
            return MindmapData::default();
        }
    };

    let mut members = HashSet::from([index.id(root)]);
    members.extend(
        index
            .reachable(root, Direction::Children)
            .into_iter()
            .map(|member| index.id(member)),
    );

    let nodes = data
        .nodes
        .iter()
        .filter(|node| members.contains(node.id.as_str()))
        .cloned()
        .collect();
    retain_among(data, nodes)
}

fn retain_among(data: &MindmapData, nodes: Vec<NodeRecord>) -> MindmapData {
    let ids = nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();
    let relationships = data
        .relationships
        .iter()
        .filter(|relationship| {
            ids.contains(relationship.source.as_str()) && ids.contains(relationship.target.as_str())
        })
        .cloned()
        .collect();

    MindmapData {
        nodes,
        relationships,
    }
}
