//! One open mindmap view. All graph work happens on the caller's thread inside the
//! session's methods; only remote fetches and mutations run on worker threads, and
//! their results are picked up by [`MindmapSession::poll`].

use std::mem;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::MindmapError;
use crate::frame::{RenderFrame, render_frame};
use crate::graph::{Graph, GraphNode, build_graph, search_nodes};
use crate::highlight::{HighlightState, compute_highlight};
use crate::mindmap::{MindmapData, MindmapRemote, Scope};
use crate::mutation::{
    MutationCoordinator, MutationKind, MutationOutcome, MutationTicket, call_remote,
};
use crate::visibility::{ToggleOutcome, VisibilityController};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    MutationFailed,
    MutationRejected,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

pub struct MindmapSession {
    remote: Arc<dyn MindmapRemote>,
    config: SessionConfig,
    scope: Scope,
    center_id: Option<String>,
    /// Bumped on every fetch; only the newest fetch may commit.
    generation: u64,
    /// Bumped on navigation; mutations from an earlier view are never rolled back into this one.
    view: u64,
    state: SessionState,
    fetches: Vec<PendingFetch>,
    mutations: MutationCoordinator,
    in_flight: Vec<InFlightMutation>,
    refetch_after_mutations: bool,
    notices: Vec<Notice>,
}

enum SessionState {
    Loading,
    Ready(Box<ViewModel>),
}

struct ViewModel {
    data: MindmapData,
    graph: Graph,
    hover: Option<String>,
    highlight: HighlightState,
    visibility: Option<VisibilityController>,
}

struct PendingFetch {
    generation: u64,
    rx: Receiver<Result<MindmapData, String>>,
}

struct InFlightMutation {
    view: u64,
    ticket: MutationTicket,
    rx: Receiver<anyhow::Result<MutationOutcome>>,
}

impl MindmapSession {
    pub fn new(remote: Arc<dyn MindmapRemote>, config: SessionConfig) -> Self {
        Self {
            remote,
            config,
            scope: Scope::All,
            center_id: None,
            generation: 0,
            view: 0,
            state: SessionState::Loading,
            fetches: Vec::new(),
            mutations: MutationCoordinator::new(),
            in_flight: Vec::new(),
            refetch_after_mutations: false,
            notices: Vec::new(),
        }
    }

    /// Navigates to `scope`, optionally centered on a node, and starts loading it.
    /// Results of earlier fetches are ignored from here on.
    pub fn open(&mut self, scope: Scope, center_id: Option<String>) {
        info!(%scope, center = ?center_id, "opening mindmap view");
        self.scope = scope;
        self.center_id = center_id;
        self.state = SessionState::Loading;
        self.view += 1;
        self.generation += 1;
        self.start_fetch();
    }

    pub fn refresh(&mut self) {
        self.generation += 1;
        self.start_fetch();
    }

    fn start_fetch(&mut self) {
        let remote = Arc::clone(&self.remote);
        let scope = self.scope.clone();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = remote.fetch(&scope).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        self.fetches.push(PendingFetch {
            generation: self.generation,
            rx,
        });
    }

    /// Collects finished background work. Returns true when the view changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = self.poll_mutations();
        changed |= self.poll_fetches();

        if self.in_flight.is_empty() && mem::take(&mut self.refetch_after_mutations) {
            self.refresh();
        }
        changed
    }

    fn poll_fetches(&mut self) -> bool {
        let mut changed = false;
        let mut still_pending = Vec::new();

        for fetch in mem::take(&mut self.fetches) {
            let result = match fetch.rx.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => {
                    still_pending.push(fetch);
                    continue;
                }
                Err(TryRecvError::Disconnected) => Err("fetch worker disconnected".to_owned()),
            };

            if fetch.generation != self.generation {
                debug!(fetch = fetch.generation, current = self.generation, "dropping stale fetch");
                continue;
            }
            if !self.in_flight.is_empty() {
                debug!("fetch landed during a mutation; refetching once mutations settle");
                self.refetch_after_mutations = true;
                continue;
            }

            let data = result.unwrap_or_else(|error| {
                warn!(%error, scope = %self.scope, "mindmap fetch failed; showing empty graph");
                MindmapData::default()
            });
            self.commit(data);
            changed = true;
        }

        self.fetches = still_pending;
        changed
    }

    fn poll_mutations(&mut self) -> bool {
        let mut changed = false;
        let mut still_pending = Vec::new();

        for mutation in mem::take(&mut self.in_flight) {
            let result = match mutation.rx.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => {
                    still_pending.push(mutation);
                    continue;
                }
                Err(TryRecvError::Disconnected) => Err(anyhow!("mutation worker disconnected")),
            };
            changed |= self.settle(mutation.view, mutation.ticket, result);
        }

        self.in_flight.extend(still_pending);
        changed
    }

    fn settle(
        &mut self,
        view: u64,
        ticket: MutationTicket,
        result: anyhow::Result<MutationOutcome>,
    ) -> bool {
        let current_view = view == self.view;
        let settled = match &mut self.state {
            SessionState::Ready(model) if current_view => {
                self.mutations.complete(&mut model.data, ticket, result)
            }
            // the view the mutation was applied to is gone
            _ => self.mutations.abandon(ticket, result),
        };
        self.refetch_after_mutations = true;

        match settled {
            Ok(outcome) => {
                debug!(?outcome, "mutation settled");
                false
            }
            Err(error) => {
                self.notices.push(Notice {
                    kind: NoticeKind::MutationFailed,
                    message: error.to_string(),
                });
                if current_view && let SessionState::Ready(model) = &self.state {
                    let data = model.data.clone();
                    self.commit(data);
                    return true;
                }
                false
            }
        }
    }

    fn commit(&mut self, data: MindmapData) {
        let options = self.config.graph.clone().with_center(self.center_id.clone());
        let graph = build_graph(&data, &options);

        let (previous_hover, previous_visibility) = match mem::replace(&mut self.state, SessionState::Loading) {
            SessionState::Ready(model) => (model.hover, model.visibility),
            SessionState::Loading => (None, None),
        };

        let hover = previous_hover.filter(|id| graph.contains(id));
        let highlight = compute_highlight(&graph, hover.as_deref());
        let visibility = self.center_id.as_deref().map(|center_id| match previous_visibility {
            Some(mut controller) if controller.center_id() == center_id => {
                controller.retain_known(&graph);
                controller
            }
            _ => VisibilityController::initialize(center_id, &graph),
        });

        self.state = SessionState::Ready(Box::new(ViewModel {
            data,
            graph,
            hover,
            highlight,
            visibility,
        }));
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Loading)
    }

    pub fn is_idle(&self) -> bool {
        self.fetches.is_empty() && self.in_flight.is_empty() && !self.refetch_after_mutations
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn data(&self) -> Option<&MindmapData> {
        self.model().map(|model| &model.data)
    }

    pub fn graph(&self) -> Option<&Graph> {
        self.model().map(|model| &model.graph)
    }

    pub fn highlight(&self) -> Option<&HighlightState> {
        self.model().map(|model| &model.highlight)
    }

    pub fn visibility(&self) -> Option<&VisibilityController> {
        self.model().and_then(|model| model.visibility.as_ref())
    }

    fn model(&self) -> Option<&ViewModel> {
        match &self.state {
            SessionState::Ready(model) => Some(model),
            SessionState::Loading => None,
        }
    }

    pub fn hover(&mut self, node_id: Option<&str>) {
        let SessionState::Ready(model) = &mut self.state else {
            return;
        };
        model.hover = node_id
            .filter(|id| model.graph.contains(id))
            .map(str::to_owned);
        model.highlight = compute_highlight(&model.graph, model.hover.as_deref());
    }

    pub fn click(&mut self, node_id: &str) -> ToggleOutcome {
        let SessionState::Ready(model) = &mut self.state else {
            return ToggleOutcome::Unchanged;
        };
        match model.visibility.as_mut() {
            Some(visibility) => visibility.toggle(&model.graph, node_id),
            None => ToggleOutcome::Unchanged,
        }
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<&GraphNode> {
        let Some(graph) = self.graph() else {
            return Vec::new();
        };
        search_nodes(graph, query, limit)
            .into_iter()
            .map(|hit| &graph.nodes[hit.index])
            .collect()
    }

    pub fn request_split(&mut self, node_id: &str) -> Result<(), MindmapError> {
        self.request_mutation(MutationKind::Split, node_id)
    }

    pub fn request_delete(&mut self, node_id: &str) -> Result<(), MindmapError> {
        self.request_mutation(MutationKind::Delete, node_id)
    }

    fn request_mutation(&mut self, kind: MutationKind, node_id: &str) -> Result<(), MindmapError> {
        let SessionState::Ready(model) = &mut self.state else {
            return Err(MindmapError::UnknownNode(node_id.to_owned()));
        };

        // chat room roots only exist in the derived graph
        let attempt = match model.graph.node(node_id) {
            Some(node) if node.is_synthetic => Err(MindmapError::SyntheticNode(node_id.to_owned())),
            _ => self.mutations.begin(&mut model.data, kind, node_id),
        };
        let ticket = match attempt {
            Ok(ticket) => ticket,
            Err(error) => {
                if error.is_user_visible() {
                    self.notices.push(Notice {
                        kind: NoticeKind::MutationRejected,
                        message: error.to_string(),
                    });
                }
                return Err(error);
            }
        };
        let data = model.data.clone();
        self.commit(data);

        let remote = Arc::clone(&self.remote);
        let target = node_id.to_owned();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(call_remote(remote.as_ref(), kind, &target));
        });

        self.in_flight.push(InFlightMutation {
            view: self.view,
            ticket,
            rx,
        });
        Ok(())
    }

    pub fn is_mutation_pending(&self, node_id: &str) -> bool {
        self.mutations.is_pending(node_id)
    }

    pub fn frame(&self) -> Option<RenderFrame> {
        self.model().map(|model| {
            render_frame(
                &model.graph,
                &model.highlight,
                model.visibility.as_ref(),
                self.config.view_mode,
            )
        })
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        mem::take(&mut self.notices)
    }
}
