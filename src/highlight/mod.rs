//! Hover highlighting. Every call produces a fresh [`HighlightState`]; nothing is
//! written back onto graph nodes or links, so flags from a previous hover cannot leak.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::graph::{Graph, trace_root_path};
use crate::mindmap::RelationType;

mod collect;

use self::collect::{collect_connected, collect_root_path};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relation {
    pub kind: RelationType,
    /// True when the hovered node is the link's source.
    pub is_source: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeFlags {
    pub is_path_node: bool,
    pub relation: Option<Relation>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightState {
    pub hover: Option<usize>,
    pub highlight_nodes: HashSet<usize>,
    pub highlight_links: HashSet<usize>,
    pub node_flags: Vec<NodeFlags>,
    /// `is_path_link`, one entry per graph link.
    pub path_links: Vec<bool>,
}

impl HighlightState {
    pub fn cleared(graph: &Graph) -> Self {
        Self {
            hover: None,
            highlight_nodes: HashSet::new(),
            highlight_links: HashSet::new(),
            node_flags: vec![NodeFlags::default(); graph.nodes.len()],
            path_links: vec![false; graph.links.len()],
        }
    }

    pub fn is_node_highlighted(&self, node: usize) -> bool {
        self.highlight_nodes.contains(&node)
    }

    pub fn is_link_highlighted(&self, link: usize) -> bool {
        self.highlight_links.contains(&link)
    }

    pub fn is_path_link(&self, link: usize) -> bool {
        self.path_links.get(link).copied().unwrap_or(false)
    }

    pub fn flags(&self, node: usize) -> NodeFlags {
        self.node_flags.get(node).cloned().unwrap_or_default()
    }
}

/// Recomputes highlighting for `hover_id` over the whole graph. `None` or an id that is
/// not in the graph yields the cleared state.
pub fn compute_highlight(graph: &Graph, hover_id: Option<&str>) -> HighlightState {
    let mut state = HighlightState::cleared(graph);

    let Some(hover_id) = hover_id else {
        return state;
    };
    let Some(hover) = graph.index_of(hover_id) else {
        warn!(hover_id, "hovered node is not in the graph");
        return state;
    };

    state.hover = Some(hover);
    state.highlight_nodes.insert(hover);

    collect_connected(
        graph,
        hover,
        &mut state.highlight_nodes,
        &mut state.highlight_links,
        &mut state.node_flags,
    );

    match trace_root_path(graph.index(), hover_id) {
        Ok(path) => collect_root_path(
            graph,
            &path,
            &mut state.highlight_nodes,
            &mut state.highlight_links,
            &mut state.node_flags,
            &mut state.path_links,
        ),
        Err(error) => debug!(%error, "hover has no root path"),
    }

    state
}
