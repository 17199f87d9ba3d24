//! Structured graph records for one extraction experiment

mod edge;
mod node;

pub use edge::Edge;
pub use node::Node;

use serde::{Deserialize, Serialize};

/// The structured form of one experiment's extracted knowledge graph.
///
/// A record that has been loaded always has both sequences present; a
/// source that omits one deserializes to an empty sequence instead of
/// failing. Failed loads never surface as a `GraphRecord` at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_edges(mut self, edges: Vec<Edge>) -> Self {
        self.edges = edges;
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the record contains an entity with the given id
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sequences_default_to_empty() {
        let record: GraphRecord = serde_json::from_str(r#"{"nodes": [{"id": "A"}]}"#).unwrap();
        assert_eq!(record.node_count(), 1);
        assert_eq!(record.edge_count(), 0);
    }

    #[test]
    fn converted_output_round_trips() {
        let record = GraphRecord::new()
            .with_nodes(vec![Node::new("A"), Node::new("B").with_description("second")])
            .with_edges(vec![Edge::new("A", "B").with_label("knows").with_strength(2.0)]);

        let json = serde_json::to_string(&record).unwrap();
        let back: GraphRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn contains_node_matches_exact_id() {
        let record = GraphRecord::new().with_nodes(vec![Node::new("SCROOGE")]);
        assert!(record.contains_node("SCROOGE"));
        assert!(!record.contains_node("scrooge"));
    }
}
