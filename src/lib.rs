//! Graph derivation and highlighting for a chat-driven mindmap view.

pub mod config;
pub mod error;
pub mod frame;
pub mod graph;
pub mod highlight;
pub mod mindmap;
pub mod mutation;
pub mod session;
pub mod style;
pub mod util;
pub mod visibility;

pub use config::{GraphOptions, SessionConfig, ViewMode};
pub use error::MindmapError;
pub use frame::{RenderFrame, render_frame};
pub use graph::{Graph, GraphLink, GraphNode, build_graph, find_path_to_root};
pub use highlight::{HighlightState, compute_highlight};
pub use mindmap::{MindmapData, MindmapRemote, NodeRecord, RelationType, Relationship, Scope};
pub use mutation::{MutationCoordinator, MutationKind, MutationOutcome};
pub use session::{MindmapSession, Notice, NoticeKind};
pub use visibility::{ToggleOutcome, VisibilityController};
