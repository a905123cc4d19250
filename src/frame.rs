use std::collections::HashSet;

use serde::Serialize;

use crate::config::ViewMode;
use crate::graph::Graph;
use crate::highlight::HighlightState;
use crate::mindmap::RelationType;
use crate::style::{self, Border, NodeStyleInput, Rgba};
use crate::util::{LABEL_WIDTH, wrap_label};
use crate::visibility::VisibilityController;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    pub view_mode: ViewMode,
    pub nodes: Vec<RenderNode>,
    pub links: Vec<RenderLink>,
    pub hover_node: Option<String>,
    pub highlight_nodes: Vec<String>,
    /// Positions in `links`.
    pub highlight_links: Vec<usize>,
    pub hidden_nodes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub id: String,
    pub title: String,
    pub label: String,
    pub content: String,
    pub chat_room_id: Option<String>,
    pub level: usize,
    pub color: String,
    pub is_root: bool,
    pub is_center_node: bool,
    pub is_synthetic: bool,
    pub is_path_node: bool,
    pub relation_type: Option<RelationType>,
    pub highlighted: bool,
    pub visible: bool,
    pub has_hidden_children: bool,
    pub fill: Rgba,
    pub border: Option<Border>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderLink {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationType,
    pub is_path_link: bool,
    pub highlighted: bool,
    pub visible: bool,
    pub color: Rgba,
    pub width: f32,
}

/// Indices in `highlight` that fall outside `graph` are skipped.
pub fn render_frame(
    graph: &Graph,
    highlight: &HighlightState,
    visibility: Option<&VisibilityController>,
    view_mode: ViewMode,
) -> RenderFrame {
    let visible_nodes: HashSet<usize> = match visibility {
        Some(controller) => controller.visible_subgraph(graph).0.into_iter().collect(),
        None => (0..graph.nodes.len()).collect(),
    };

    let nodes = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let flags = highlight.flags(index);
            let has_hidden_children = visibility
                .is_some_and(|controller| controller.has_hidden_children(graph, &node.id));
            let style_input = NodeStyleInput {
                highlighted: highlight.is_node_highlighted(index),
                hovered: highlight.hover == Some(index),
                is_path_node: flags.is_path_node,
                is_center_node: node.is_center_node,
                is_root: node.is_root,
                has_children: graph.has_children(index),
                has_hidden_children,
            };

            RenderNode {
                id: node.id.clone(),
                title: node.title.clone(),
                label: wrap_label(&node.title, LABEL_WIDTH),
                content: node.content.clone(),
                chat_room_id: node.chat_room_id.clone(),
                level: node.level,
                color: node.color.clone(),
                is_root: node.is_root,
                is_center_node: node.is_center_node,
                is_synthetic: node.is_synthetic,
                is_path_node: flags.is_path_node,
                relation_type: flags.relation.map(|relation| relation.kind),
                highlighted: style_input.highlighted,
                visible: visible_nodes.contains(&index),
                has_hidden_children,
                fill: style::node_fill(style_input),
                border: style::node_border(style_input),
            }
        })
        .collect();

    let links = graph
        .links
        .iter()
        .enumerate()
        .map(|(index, link)| {
            let highlighted = highlight.is_link_highlighted(index);
            let is_path_link = highlight.is_path_link(index);
            RenderLink {
                source: graph.nodes[link.source].id.clone(),
                target: graph.nodes[link.target].id.clone(),
                kind: link.kind.clone(),
                is_path_link,
                highlighted,
                visible: visible_nodes.contains(&link.source) && visible_nodes.contains(&link.target),
                color: style::link_color(&link.kind, highlighted, is_path_link),
                width: style::link_width(highlighted),
            }
        })
        .collect();

    let mut highlight_nodes = highlight
        .highlight_nodes
        .iter()
        .filter_map(|&index| graph.nodes.get(index))
        .map(|node| node.id.clone())
        .collect::<Vec<_>>();
    highlight_nodes.sort();
    let mut highlight_links = highlight
        .highlight_links
        .iter()
        .copied()
        .filter(|&index| index < graph.links.len())
        .collect::<Vec<_>>();
    highlight_links.sort_unstable();

    RenderFrame {
        view_mode,
        nodes,
        links,
        hover_node: highlight
            .hover
            .and_then(|index| graph.nodes.get(index))
            .map(|node| node.id.clone()),
        highlight_nodes,
        highlight_links,
        hidden_nodes: visibility
            .map(|controller| controller.hidden_nodes().iter().cloned().collect())
            .unwrap_or_default(),
    }
}
