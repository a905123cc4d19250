use std::collections::HashMap;

use tracing::{debug, warn};

use super::graph::{MindmapData, NodeRecord, RelationType, Relationship};

pub const META_ROOT_PREFIX: &str = "root_";
const DEFAULT_ROOM: &str = "default";

pub fn meta_root_id(chat_room_id: &str) -> String {
    format!("{META_ROOT_PREFIX}{chat_room_id}")
}

/// Puts every chat room with more than one root under a synthetic meta-root, so the
/// room renders as a single tree. Rooms with a single root are left alone.
pub fn group_by_chat_room(data: &MindmapData) -> MindmapData {
    let mut order = Vec::new();
    let mut groups: HashMap<&str, Vec<&str>> = HashMap::new();

    for root_id in data.root_ids() {
        let Some(node) = data.node(root_id) else {
            continue;
        };
        let room = node.chat_room_id.as_deref().unwrap_or(DEFAULT_ROOM);
        let group = groups.entry(room).or_insert_with(|| {
            order.push(room);
            Vec::new()
        });
        group.push(root_id);
    }

    let mut grouped = data.clone();
    for room in order {
        let roots = &groups[room];
        if roots.len() < 2 {
            continue;
        }

        let id = meta_root_id(room);
        if data.contains(&id) {
            warn!(%id, "meta root id already taken by a real node; not grouping room");
            continue;
        }

        debug!(room, roots = roots.len(), "synthesizing chat room root");
        grouped.nodes.push(NodeRecord {
            id: id.clone(),
            title: format!("Chat Room {room}"),
            content: format!("Group of {} root nodes", roots.len()),
            chat_room_id: Some(room.to_owned()),
            is_synthetic: true,
        });
        grouped.relationships.extend(roots.iter().map(|root| Relationship {
            source: id.clone(),
            target: (*root).to_owned(),
            kind: RelationType::HasSubtopic,
        }));
    }

    grouped
}
