use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow, bail};
use tracing::info;

use crate::graph::{Direction, GraphIndex};

use super::graph::MindmapData;
use super::parse::parse_mindmap_payload;
use super::scope::Scope;

/// The remote store a mindmap view reads from and mutates. Calls block; the session
/// runs them off the event thread.
pub trait MindmapRemote: Send + Sync {
    fn fetch(&self, scope: &Scope) -> Result<MindmapData>;

    /// Detaches the node from its parent and returns the id of the chat room the
    /// detached subtree now belongs to.
    fn split_node(&self, node_id: &str) -> Result<String>;

    fn delete_node(&self, node_id: &str) -> Result<()>;
}

pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<MindmapData> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read mindmap file {}", self.path.display()))?;
        Ok(parse_mindmap_payload(&raw))
    }

    fn save(&self, data: &MindmapData) -> Result<()> {
        let raw = serde_json::to_string_pretty(data).context("failed to encode mindmap")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write mindmap file {}", self.path.display()))
    }

    fn update<T>(&self, apply: impl FnOnce(&mut MindmapData) -> Result<T>) -> Result<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| anyhow!("mindmap file lock poisoned"))?;
        let mut data = self.load()?;
        let value = apply(&mut data)?;
        self.save(&data)?;
        Ok(value)
    }
}

impl MindmapRemote for JsonFileStore {
    fn fetch(&self, scope: &Scope) -> Result<MindmapData> {
        Ok(scope.apply(&self.load()?))
    }

    fn split_node(&self, node_id: &str) -> Result<String> {
        self.update(|data| {
            let (index, _) = GraphIndex::from_data(data);
            let Some(position) = index.index_of(node_id) else {
                bail!("node {node_id} not found");
            };

            let mut moved = HashSet::from([node_id.to_owned()]);
            moved.extend(
                index
                    .reachable(position, Direction::Children)
                    .into_iter()
                    .map(|member| index.id(member).to_owned()),
            );

            let room = format!("split-{node_id}");
            data.relationships
                .retain(|relationship| relationship.target != node_id);
            for node in &mut data.nodes {
                if moved.contains(&node.id) {
                    node.chat_room_id = Some(room.clone());
                }
            }

            info!(node_id, room = %room, moved = moved.len(), "split node into new chat room");
            Ok(room)
        })
    }

    fn delete_node(&self, node_id: &str) -> Result<()> {
        self.update(|data| {
            if !data.contains(node_id) {
                bail!("node {node_id} not found");
            }
            data.nodes.retain(|node| node.id != node_id);
            data.relationships
                .retain(|relationship| !relationship.touches(node_id));
            info!(node_id, "deleted node");
            Ok(())
        })
    }
}
