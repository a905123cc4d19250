use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationType {
    RelatedTo,
    HasSubtopic,
    CompareTo,
    Other(String),
}

impl RelationType {
    pub fn label(&self) -> &str {
        match self {
            Self::RelatedTo => "RELATED_TO",
            Self::HasSubtopic => "HAS_SUBTOPIC",
            Self::CompareTo => "COMPARE_TO",
            Self::Other(label) => label.as_str(),
        }
    }
}

impl From<String> for RelationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "RELATED_TO" => Self::RelatedTo,
            "HAS_SUBTOPIC" => Self::HasSubtopic,
            // the store persists comparisons as COMPARED_TO
            "COMPARE_TO" | "COMPARED_TO" => Self::CompareTo,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for RelationType {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<RelationType> for String {
    fn from(value: RelationType) -> Self {
        match value {
            RelationType::Other(label) => label,
            other => other.label().to_owned(),
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub chat_room_id: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_synthetic: bool,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            chat_room_id: None,
            is_synthetic: false,
        }
    }

    pub fn in_room(mut self, chat_room_id: impl Into<String>) -> Self {
        self.chat_room_id = Some(chat_room_id.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationType,
}

impl Relationship {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        kind: impl Into<RelationType>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: kind.into(),
        }
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindmapData {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl MindmapData {
    pub fn new(nodes: Vec<NodeRecord>, relationships: Vec<Relationship>) -> Self {
        Self {
            nodes,
            relationships,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }

    /// Relationships whose endpoints both resolve to a node, in input order.
    pub fn valid_relationships(&self) -> impl Iterator<Item = &Relationship> {
        let known = self
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        self.relationships.iter().filter(move |relationship| {
            known.contains(relationship.source.as_str())
                && known.contains(relationship.target.as_str())
        })
    }

    /// Ids of nodes with no incoming valid relationship, in node order, each id once.
    pub fn root_ids(&self) -> Vec<&str> {
        let targets = self
            .valid_relationships()
            .map(|relationship| relationship.target.as_str())
            .collect::<HashSet<_>>();
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .map(|node| node.id.as_str())
            .filter(|id| !targets.contains(id) && seen.insert(*id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_type_accepts_store_alias() {
        assert_eq!(RelationType::from("COMPARED_TO"), RelationType::CompareTo);
        assert_eq!(
            RelationType::from("MENTIONS"),
            RelationType::Other("MENTIONS".to_owned())
        );
        assert_eq!(String::from(RelationType::HasSubtopic), "HAS_SUBTOPIC");
    }

    #[test]
    fn root_ids_list_duplicated_ids_once() {
        let data = MindmapData::new(
            vec![
                NodeRecord::new("x", "first"),
                NodeRecord::new("y", "other"),
                NodeRecord::new("x", "second"),
            ],
            Vec::new(),
        );

        assert_eq!(data.root_ids(), vec!["x", "y"]);
    }

    #[test]
    fn root_ids_ignore_dangling_relationships() {
        let data = MindmapData::new(
            vec![NodeRecord::new("r", "root"), NodeRecord::new("a", "child")],
            vec![
                Relationship::new("r", "a", "HAS_SUBTOPIC"),
                Relationship::new("ghost", "r", "RELATED_TO"),
            ],
        );

        assert_eq!(data.root_ids(), vec!["r"]);
        assert_eq!(data.valid_relationships().count(), 1);
    }
}
