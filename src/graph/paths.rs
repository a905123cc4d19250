use tracing::debug;

use crate::error::MindmapError;

use super::index::GraphIndex;
use super::traverse::{Direction, Flow};

/// Ordered `[root, ..., node]` chain, or `None` when the node is unknown or every
/// ancestor chain is cyclic.
pub fn find_path_to_root(index: &GraphIndex, node_id: &str) -> Option<Vec<String>> {
    match trace_root_path(index, node_id) {
        Ok(path) => Some(path.into_iter().map(|node| index.id(node).to_owned()).collect()),
        Err(error) => {
            debug!(%error, "no path to root");
            None
        }
    }
}

pub fn trace_root_path(index: &GraphIndex, node_id: &str) -> Result<Vec<usize>, MindmapError> {
    let start = index
        .index_of(node_id)
        .ok_or_else(|| MindmapError::UnknownNode(node_id.to_owned()))?;

    let mut reached_from = vec![None; index.len()];
    let mut root = None;
    index.depth_first(start, Direction::Parents, |step| {
        reached_from[step.node] = step.from;
        if index.is_root(step.node) {
            root = Some(step.node);
            Flow::Stop
        } else {
            Flow::Continue
        }
    });

    let root = root.ok_or_else(|| MindmapError::TraversalCycle(node_id.to_owned()))?;

    let mut path = vec![root];
    let mut cursor = root;
    while let Some(next) = reached_from[cursor] {
        path.push(next);
        cursor = next;
    }
    Ok(path)
}
