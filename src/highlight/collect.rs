use std::collections::HashSet;

use crate::graph::Graph;

use super::{NodeFlags, Relation};

/// Marks every node one hop from `hover` (either direction) with the type of the link
/// that reaches it. When several links reach the same node the last one wins.
pub(super) fn collect_connected(
    graph: &Graph,
    hover: usize,
    related_nodes: &mut HashSet<usize>,
    related_links: &mut HashSet<usize>,
    node_flags: &mut [NodeFlags],
) {
    for &link_index in &graph.nodes[hover].links {
        let link = &graph.links[link_index];
        let is_source = link.source == hover;
        let connected = if is_source { link.target } else { link.source };

        related_nodes.insert(connected);
        related_links.insert(link_index);
        node_flags[connected].relation = Some(Relation {
            kind: link.kind.clone(),
            is_source,
        });
    }
}

pub(super) fn collect_root_path(
    graph: &Graph,
    path: &[usize],
    related_nodes: &mut HashSet<usize>,
    related_links: &mut HashSet<usize>,
    node_flags: &mut [NodeFlags],
    path_links: &mut [bool],
) {
    let on_path = path.iter().copied().collect::<HashSet<_>>();

    for &node in path {
        node_flags[node].is_path_node = true;
        related_nodes.insert(node);
    }

    for (link_index, link) in graph.links.iter().enumerate() {
        if on_path.contains(&link.source) && on_path.contains(&link.target) {
            path_links[link_index] = true;
            related_links.insert(link_index);
        }
    }
}
