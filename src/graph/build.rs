use std::borrow::Cow;

use tracing::debug;

use crate::config::GraphOptions;
use crate::mindmap::{MindmapData, group_by_chat_room};

use super::index::GraphIndex;
use super::traverse::{Direction, Flow};
use super::{Graph, GraphLink, GraphNode};

pub fn build_graph(data: &MindmapData, options: &GraphOptions) -> Graph {
    let data = if options.chat_room_grouping {
        Cow::Owned(group_by_chat_room(data))
    } else {
        Cow::Borrowed(data)
    };

    if data.nodes.is_empty() {
        return Graph::default();
    }

    let (index, origins) = GraphIndex::from_data(&data);
    let levels = assign_levels(&index);

    let mut nodes = Vec::with_capacity(index.len());
    for record in &data.nodes {
        let Some(position) = index.index_of(&record.id) else {
            continue;
        };
        if position != nodes.len() {
            continue;
        }

        let level = levels[position];
        let is_root = index.is_root(position);
        let is_center_node = options.center_node_id.as_deref() == Some(record.id.as_str());
        let color = if is_center_node {
            options.center_color.clone()
        } else if is_root {
            options.root_color.clone()
        } else {
            options.level_color(level).to_owned()
        };

        nodes.push(GraphNode {
            id: record.id.clone(),
            title: record.title.clone(),
            content: record.content.clone(),
            chat_room_id: record.chat_room_id.clone(),
            level,
            color,
            is_root,
            is_center_node,
            is_synthetic: record.is_synthetic,
            neighbors: Vec::new(),
            links: Vec::new(),
        });
    }

    let links = index
        .edges()
        .iter()
        .zip(&origins)
        .map(|(&(source, target), &origin)| GraphLink {
            source,
            target,
            kind: data.relationships[origin].kind.clone(),
        })
        .collect::<Vec<_>>();

    for (link_index, link) in links.iter().enumerate() {
        nodes[link.source].neighbors.push(link.target);
        nodes[link.target].neighbors.push(link.source);
        nodes[link.source].links.push(link_index);
        if link.target != link.source {
            nodes[link.target].links.push(link_index);
        }
    }

    debug!(nodes = nodes.len(), links = links.len(), "built mindmap graph");

    Graph {
        nodes,
        links,
        index,
    }
}

/// Depth-first from each root in node order; the first traversal to reach a node fixes
/// its level. Nodes reachable from no root keep level 0.
fn assign_levels(index: &GraphIndex) -> Vec<usize> {
    let mut levels = vec![None; index.len()];

    for root in index.roots() {
        index.depth_first(root, Direction::Children, |step| {
            if levels[step.node].is_none() {
                levels[step.node] = Some(step.depth);
            }
            Flow::Continue
        });
    }

    levels.into_iter().map(Option::unwrap_or_default).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mindmap::{NodeRecord, Relationship};

    fn data(nodes: &[&str], edges: &[(&str, &str)]) -> MindmapData {
        MindmapData::new(
            nodes.iter().map(|id| NodeRecord::new(*id, *id)).collect(),
            edges
                .iter()
                .map(|(source, target)| Relationship::new(*source, *target, "HAS_SUBTOPIC"))
                .collect(),
        )
    }

    #[test]
    fn assigns_levels_and_roots_along_a_chain() {
        let graph = build_graph(
            &data(&["r", "a", "b"], &[("r", "a"), ("a", "b")]),
            &GraphOptions::default(),
        );

        let levels = graph
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), node.level, node.is_root))
            .collect::<Vec<_>>();
        assert_eq!(levels, vec![("r", 0, true), ("a", 1, false), ("b", 2, false)]);
    }

    #[test]
    fn colors_follow_level_palette() {
        let options = GraphOptions::default();
        let graph = build_graph(
            &data(&["r", "a", "b"], &[("r", "a"), ("a", "b")]),
            &options,
        );

        assert_eq!(graph.nodes[0].color, options.root_color);
        assert_eq!(graph.nodes[1].color, options.level_colors[1]);
        assert_eq!(graph.nodes[2].color, options.level_colors[2]);
    }

    #[test]
    fn center_color_overrides_root_color() {
        let options = GraphOptions {
            center_node_id: Some("a".to_owned()),
            ..GraphOptions::default()
        };
        let graph = build_graph(&data(&["r", "a"], &[("r", "a")]), &options);

        assert!(graph.nodes[1].is_center_node);
        assert_eq!(graph.nodes[1].color, options.center_color);
        assert!(!graph.nodes[0].is_center_node);
    }

    #[test]
    fn first_root_traversal_keeps_its_level() {
        // x reaches c at depth 1; y reaches it at depth 2 later
        let graph = build_graph(
            &data(&["x", "y", "m", "c"], &[("x", "c"), ("y", "m"), ("m", "c")]),
            &GraphOptions::default(),
        );

        assert_eq!(graph.node("c").map(|node| node.level), Some(1));
        assert_eq!(graph.node("m").map(|node| node.level), Some(1));
    }

    #[test]
    fn build_is_idempotent() {
        let input = data(
            &["r", "a", "b", "c"],
            &[("r", "a"), ("r", "b"), ("b", "c"), ("c", "a")],
        );
        let options = GraphOptions::default();

        assert_eq!(build_graph(&input, &options), build_graph(&input, &options));
    }

    #[test]
    fn cyclic_input_terminates_without_roots() {
        let graph = build_graph(
            &data(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]),
            &GraphOptions::default(),
        );

        assert_eq!(graph.nodes.len(), 3);
        assert!(graph.nodes.iter().all(|node| !node.is_root && node.level == 0));
    }

    #[test]
    fn root_flag_matches_incoming_links() {
        let graph = build_graph(
            &data(
                &["r", "a", "b", "s"],
                &[("r", "a"), ("a", "b"), ("r", "b"), ("x", "s")],
            ),
            &GraphOptions::default(),
        );

        for (position, node) in graph.nodes.iter().enumerate() {
            let has_incoming = graph.links.iter().any(|link| link.target == position);
            assert_eq!(node.is_root, !has_incoming, "node {}", node.id);
        }
        assert_eq!(graph.links.len(), 3);
    }

    #[test]
    fn cross_links_record_neighbors_and_links() {
        let graph = build_graph(
            &data(&["r", "a", "b"], &[("r", "a"), ("r", "b")]),
            &GraphOptions::default(),
        );

        assert_eq!(graph.nodes[0].neighbors, vec![1, 2]);
        assert_eq!(graph.nodes[0].links, vec![0, 1]);
        assert_eq!(graph.nodes[2].neighbors, vec![0]);
        assert_eq!(graph.nodes[2].links, vec![1]);
    }

    #[test]
    fn empty_input_builds_empty_graph() {
        let graph = build_graph(&MindmapData::default(), &GraphOptions::default());
        assert!(graph.nodes.is_empty());
        assert!(graph.links.is_empty());
    }

    #[test]
    fn grouping_runs_before_levels() {
        let input = MindmapData::new(
            vec![
                NodeRecord::new("x", "x").in_room("room1"),
                NodeRecord::new("y", "y").in_room("room1"),
                NodeRecord::new("z", "z").in_room("room1"),
            ],
            vec![Relationship::new("y", "z", "HAS_SUBTOPIC")],
        );
        let options = GraphOptions {
            chat_room_grouping: true,
            ..GraphOptions::default()
        };

        let graph = build_graph(&input, &options);
        let meta = graph.node("root_room1").expect("meta root");

        assert!(meta.is_root && meta.is_synthetic);
        assert_eq!(meta.level, 0);
        assert_eq!(meta.color, options.root_color);
        assert_eq!(graph.node("x").map(|node| (node.level, node.is_root)), Some((1, false)));
        assert_eq!(graph.node("z").map(|node| node.level), Some(2));
    }

    #[test]
    fn grouping_ignores_duplicated_records_of_one_root() {
        let input = MindmapData::new(
            vec![
                NodeRecord::new("x", "x").in_room("room1"),
                NodeRecord::new("x", "x").in_room("room1"),
            ],
            Vec::new(),
        );
        let options = GraphOptions {
            chat_room_grouping: true,
            ..GraphOptions::default()
        };

        let graph = build_graph(&input, &options);

        assert_eq!(graph.nodes.len(), 1);
        assert!(graph.links.is_empty());
        assert!(graph.nodes[0].is_root);
    }
}
