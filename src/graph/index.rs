use std::collections::HashMap;

use tracing::warn;

use crate::mindmap::MindmapData;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GraphIndex {
    ids: Vec<String>,
    index_by_id: HashMap<String, usize>,
    edges: Vec<(usize, usize)>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl GraphIndex {
    /// Indexes `data`, dropping dangling relationships and duplicate node ids.
    ///
    /// Returns the index along with, for every kept edge, the position of the
    /// relationship it came from in `data.relationships`.
    pub fn from_data(data: &MindmapData) -> (Self, Vec<usize>) {
        let mut ids = Vec::with_capacity(data.nodes.len());
        let mut index_by_id = HashMap::with_capacity(data.nodes.len());
        for node in &data.nodes {
            if index_by_id.contains_key(&node.id) {
                warn!(id = %node.id, "duplicate node id; keeping the first occurrence");
                continue;
            }
            index_by_id.insert(node.id.clone(), ids.len());
            ids.push(node.id.clone());
        }

        let mut edges = Vec::with_capacity(data.relationships.len());
        let mut origins = Vec::with_capacity(data.relationships.len());
        for (position, relationship) in data.relationships.iter().enumerate() {
            match (
                index_by_id.get(&relationship.source),
                index_by_id.get(&relationship.target),
            ) {
                (Some(&source), Some(&target)) => {
                    edges.push((source, target));
                    origins.push(position);
                }
                _ => warn!(
                    source = %relationship.source,
                    target = %relationship.target,
                    "dropping dangling relationship"
                ),
            }
        }

        let mut outgoing = vec![Vec::new(); ids.len()];
        let mut incoming = vec![Vec::new(); ids.len()];
        for (edge, &(source, target)) in edges.iter().enumerate() {
            outgoing[source].push(edge);
            incoming[target].push(edge);
        }

        (
            Self {
                ids,
                index_by_id,
                edges,
                outgoing,
                incoming,
            },
            origins,
        )
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn id(&self, index: usize) -> &str {
        &self.ids[index]
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn edge(&self, edge: usize) -> (usize, usize) {
        self.edges[edge]
    }

    pub fn outgoing_edges(&self, index: usize) -> &[usize] {
        &self.outgoing[index]
    }

    pub fn incoming_edges(&self, index: usize) -> &[usize] {
        &self.incoming[index]
    }

    pub fn is_root(&self, index: usize) -> bool {
        self.incoming[index].is_empty()
    }

    pub fn roots(&self) -> Vec<usize> {
        (0..self.len()).filter(|&index| self.is_root(index)).collect()
    }
}
