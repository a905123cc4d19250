use std::collections::{BTreeSet, HashSet};

use tracing::{debug, warn};

use crate::graph::{Graph, trace_root_path};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    Expanded,
    Collapsed,
    Unchanged,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibilityController {
    center_id: String,
    hidden: BTreeSet<String>,
}

impl VisibilityController {
    /// Shows the center, its direct children and its path to the root; hides the rest.
    pub fn initialize(center_id: &str, graph: &Graph) -> Self {
        let mut controller = Self {
            center_id: center_id.to_owned(),
            hidden: BTreeSet::new(),
        };

        let Some(center) = graph.index_of(center_id) else {
            warn!(center_id, "center node is not in the graph; nothing hidden");
            return controller;
        };

        let mut shown = controller.protected(graph);
        shown.insert(center);
        shown.extend(graph.index().children(center));

        controller.hidden = graph
            .nodes
            .iter()
            .enumerate()
            .filter(|(index, _)| !shown.contains(index))
            .map(|(_, node)| node.id.clone())
            .collect();
        debug!(center_id, hidden = controller.hidden.len(), "initialized visibility");
        controller
    }

    pub fn center_id(&self) -> &str {
        &self.center_id
    }

    pub fn hidden_nodes(&self) -> &BTreeSet<String> {
        &self.hidden
    }

    pub fn is_hidden(&self, id: &str) -> bool {
        self.hidden.contains(id)
    }

    /// Visible when neither the node nor any node on its path to the root is hidden.
    /// A node with no resolvable root path is not visible.
    pub fn is_visible(&self, graph: &Graph, id: &str) -> bool {
        if self.hidden.contains(id) {
            return false;
        }
        match trace_root_path(graph.index(), id) {
            Ok(path) => path
                .iter()
                .all(|&node| !self.hidden.contains(&graph.nodes[node].id)),
            Err(_) => false,
        }
    }

    /// Expands the clicked node's direct children when all of them are hidden, otherwise
    /// collapses them all. Children on the center's root path are never toggled.
    pub fn toggle(&mut self, graph: &Graph, clicked_id: &str) -> ToggleOutcome {
        let protected = self.protected(graph);
        for &node in &protected {
            self.hidden.remove(&graph.nodes[node].id);
        }

        let Some(clicked) = graph.index_of(clicked_id) else {
            warn!(clicked_id, "clicked node is not in the graph");
            return ToggleOutcome::Unchanged;
        };

        let children = graph
            .index()
            .children(clicked)
            .into_iter()
            .filter(|child| !protected.contains(child))
            .map(|child| graph.nodes[child].id.as_str())
            .collect::<Vec<_>>();
        if children.is_empty() {
            return ToggleOutcome::Unchanged;
        }

        if children.iter().all(|child| self.hidden.contains(*child)) {
            for child in children {
                self.hidden.remove(child);
            }
            ToggleOutcome::Expanded
        } else {
            self.hidden.extend(children.into_iter().map(str::to_owned));
            ToggleOutcome::Collapsed
        }
    }

    pub fn has_hidden_children(&self, graph: &Graph, id: &str) -> bool {
        graph
            .children_of(id)
            .into_iter()
            .any(|child| self.hidden.contains(child))
    }

    pub fn retain_known(&mut self, graph: &Graph) {
        self.hidden.retain(|id| graph.contains(id));
    }

    pub fn visible_subgraph(&self, graph: &Graph) -> (Vec<usize>, Vec<usize>) {
        let visible = (0..graph.nodes.len())
            .filter(|&node| self.is_visible(graph, &graph.nodes[node].id))
            .collect::<Vec<_>>();
        let lookup = visible.iter().copied().collect::<HashSet<_>>();
        let links = graph
            .links
            .iter()
            .enumerate()
            .filter(|(_, link)| lookup.contains(&link.source) && lookup.contains(&link.target))
            .map(|(index, _)| index)
            .collect();
        (visible, links)
    }

    fn protected(&self, graph: &Graph) -> HashSet<usize> {
        trace_root_path(graph.index(), &self.center_id)
            .map(|path| path.into_iter().collect())
            .unwrap_or_default()
    }
}
