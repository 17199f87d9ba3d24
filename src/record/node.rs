//! Node representation in an extracted knowledge graph

use serde::{Deserialize, Serialize};

/// An entity node as emitted by the extraction system.
///
/// Records are consumed as-is from converted graph data; any field the
/// extractor did not populate defaults rather than failing the load. An
/// empty `id` keeps the node in scope counts but it can never match the
/// protagonist or an edge endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Entity identifier, as written by the extraction system
    #[serde(default)]
    pub id: String,
    /// Free-text entity description
    #[serde(default)]
    pub description: String,
}

impl Node {
    /// Create a node with an id and no description
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Description length in Unicode scalar values
    pub fn description_len(&self) -> usize {
        self.description.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        let node: Node = serde_json::from_str(r#"{"id": "SCROOGE"}"#).unwrap();
        assert_eq!(node.id, "SCROOGE");
        assert_eq!(node.description, "");
        assert_eq!(node.description_len(), 0);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let raw = r#"{"id": "MARLEY", "entity_type": "person", "source_id": "chunk-1"}"#;
        let node: Node = serde_json::from_str(raw).unwrap();
        assert_eq!(node.id, "MARLEY");
    }

    #[test]
    fn description_len_counts_chars_not_bytes() {
        let node = Node::new("N").with_description("émigré");
        assert_eq!(node.description_len(), 6);
    }
}
