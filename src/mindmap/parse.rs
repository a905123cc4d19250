use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::warn;

use crate::error::MindmapError;

use super::graph::{MindmapData, NodeRecord, RelationType, Relationship};

/// Parses a fetch payload, degrading to an empty graph instead of failing.
///
/// Accepts either `{ nodes, relationships }` or the same object wrapped in a `data`
/// envelope. Node ids may be strings or integers. Entries without a usable id are skipped.
pub fn parse_mindmap_payload(raw: &str) -> MindmapData {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => mindmap_from_value(&value),
        Err(error) => {
            warn!(%error, "mindmap payload is not valid JSON; using empty graph");
            MindmapData::default()
        }
    }
}

pub fn mindmap_from_value(value: &Value) -> MindmapData {
    try_mindmap_from_value(value).unwrap_or_else(|error| {
        warn!(%error, "using empty graph");
        MindmapData::default()
    })
}

pub fn try_mindmap_from_value(value: &Value) -> Result<MindmapData, MindmapError> {
    let object = unwrap_envelope(value)
        .ok_or_else(|| MindmapError::MalformedInput("payload is not an object".to_owned()))?;

    let (Some(raw_nodes), Some(raw_relationships)) = (
        object.get("nodes").and_then(Value::as_array),
        object.get("relationships").and_then(Value::as_array),
    ) else {
        return Err(MindmapError::MalformedInput(
            "payload lacks nodes or relationships".to_owned(),
        ));
    };

    let mut seen = HashSet::with_capacity(raw_nodes.len());
    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for raw in raw_nodes {
        let Some(node) = parse_node(raw) else {
            warn!("skipping mindmap node without an id");
            continue;
        };
        if !seen.insert(node.id.clone()) {
            warn!(id = %node.id, "skipping duplicate mindmap node id");
            continue;
        }
        nodes.push(node);
    }

    let relationships = raw_relationships
        .iter()
        .filter_map(|raw| {
            let relationship = parse_relationship(raw);
            if relationship.is_none() {
                warn!("skipping relationship without source or target");
            }
            relationship
        })
        .collect();

    Ok(MindmapData {
        nodes,
        relationships,
    })
}

fn unwrap_envelope(value: &Value) -> Option<&Map<String, Value>> {
    let object = value.as_object()?;
    match object.get("data") {
        Some(inner @ Value::Object(_)) => inner.as_object(),
        _ => Some(object),
    }
}

fn parse_node(value: &Value) -> Option<NodeRecord> {
    let object = value.as_object()?;
    let id = id_value(object.get("id")?)?;

    Some(NodeRecord {
        id,
        title: string_field(object, "title").unwrap_or_default(),
        content: string_field(object, "content").unwrap_or_default(),
        chat_room_id: object.get("chatRoomId").and_then(id_value),
        is_synthetic: false,
    })
}

fn parse_relationship(value: &Value) -> Option<Relationship> {
    let object = value.as_object()?;
    let source = id_value(object.get("source")?)?;
    let target = id_value(object.get("target")?)?;
    let kind = string_field(object, "type")
        .map(RelationType::from)
        .unwrap_or(RelationType::RelatedTo);

    Some(Relationship {
        source,
        target,
        kind,
    })
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
