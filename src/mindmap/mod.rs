mod graph;
mod group;
mod parse;
mod scope;
mod store;

pub use graph::{MindmapData, NodeRecord, RelationType, Relationship};
pub use group::{META_ROOT_PREFIX, group_by_chat_room, meta_root_id};
pub use parse::{mindmap_from_value, parse_mindmap_payload, try_mindmap_from_value};
pub use scope::Scope;
pub use store::{JsonFileStore, MindmapRemote};
