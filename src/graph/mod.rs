mod build;
mod index;
mod paths;
mod search;
mod traverse;

use crate::mindmap::RelationType;

pub use build::build_graph;
pub use index::GraphIndex;
pub use paths::{find_path_to_root, trace_root_path};
pub use search::{SearchHit, search_nodes};
pub use traverse::{Direction, Flow, Step};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub title: String,
    pub content: String,
    pub chat_room_id: Option<String>,
    pub level: usize,
    pub color: String,
    pub is_root: bool,
    pub is_center_node: bool,
    pub is_synthetic: bool,
    pub neighbors: Vec<usize>,
    pub links: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphLink {
    pub source: usize,
    pub target: usize,
    pub kind: RelationType,
}

impl GraphLink {
    pub fn touches(&self, node: usize) -> bool {
        self.source == node || self.target == node
    }
}

/// Every link endpoint resolves to an entry of `nodes`, and node ids are unique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
    index: GraphIndex,
}

impl Graph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index(&self) -> &GraphIndex {
        &self.index
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.index_of(id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn path_to_root(&self, id: &str) -> Option<Vec<String>> {
        find_path_to_root(&self.index, id)
    }

    pub fn has_children(&self, index: usize) -> bool {
        !self.index.outgoing_edges(index).is_empty()
    }

    pub fn children_of(&self, id: &str) -> Vec<&str> {
        self.index_of(id)
            .map(|index| self.ids(self.index.children(index)))
            .unwrap_or_default()
    }

    pub fn descendants_of(&self, id: &str) -> Vec<&str> {
        self.index_of(id)
            .map(|index| self.ids(self.index.reachable(index, Direction::Children)))
            .unwrap_or_default()
    }

    pub fn ancestors_of(&self, id: &str) -> Vec<&str> {
        self.index_of(id)
            .map(|index| self.ids(self.index.reachable(index, Direction::Parents)))
            .unwrap_or_default()
    }

    /// Height of the subtree below `id`; 0 for leaves and unknown ids.
    pub fn depth_of(&self, id: &str) -> usize {
        self.index_of(id)
            .map(|index| self.index.depth(index))
            .unwrap_or_default()
    }

    pub fn root_ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| node.is_root)
            .map(|node| node.id.as_str())
            .collect()
    }

    fn ids(&self, indices: Vec<usize>) -> Vec<&str> {
        indices
            .into_iter()
            .map(|index| self.nodes[index].id.as_str())
            .collect()
    }
}
