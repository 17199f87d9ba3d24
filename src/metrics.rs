//! Per-graph metric extraction
//!
//! Pure functions over a [`GraphRecord`]; no I/O and no knowledge of the
//! rest of the corpus. Metrics that need cross-experiment normalization
//! (scope, description length, relation strength) are returned raw and
//! normalized later against corpus-wide maxima.
//!
//! Every degenerate case (empty graph, absent protagonist, zero
//! denominator) is defined as 0.0 rather than an error; a sparse or broken
//! graph scores badly, it does not fail.

use crate::record::GraphRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Raw corpus-relative metrics for one experiment, pre-normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    /// Node count
    pub scope: usize,
    /// Mean description length over nodes and edges combined
    pub avg_description_length: f64,
    /// Mean strength over edges carrying a usable numeric value
    pub avg_relation_strength: f64,
}

/// Extract the corpus-relative raw metrics in one pass.
pub fn raw_metrics(record: &GraphRecord) -> RawMetrics {
    RawMetrics {
        scope: scope(record),
        avg_description_length: avg_description_length(record),
        avg_relation_strength: avg_relation_strength(record),
    }
}

/// Fraction of non-protagonist entities directly connected to the protagonist.
///
/// Collects every node id that sits opposite the protagonist on an edge
/// (either direction) and divides by N − 1. Only ids that exist as nodes
/// count, and the protagonist itself never does (self-loops and dangling
/// endpoints would otherwise push the ratio past 1). Returns 0.0 when the
/// protagonist is not in the graph or the graph has at most one node.
pub fn protagonist_centrality(record: &GraphRecord, protagonist_id: &str) -> f64 {
    let n = record.node_count();
    if n <= 1 || !record.contains_node(protagonist_id) {
        return 0.0;
    }

    let node_ids: HashSet<&str> = record.nodes.iter().map(|node| node.id.as_str()).collect();

    let mut neighbors: HashSet<&str> = HashSet::new();
    for edge in &record.edges {
        if edge.source == protagonist_id {
            neighbors.insert(edge.target.as_str());
        }
        if edge.target == protagonist_id {
            neighbors.insert(edge.source.as_str());
        }
    }
    neighbors.retain(|id| *id != protagonist_id && node_ids.contains(id));

    neighbors.len() as f64 / (n - 1) as f64
}

/// Fraction of nodes that participate in at least one edge.
pub fn connectivity_score(record: &GraphRecord) -> f64 {
    let n = record.node_count();
    if n == 0 {
        return 0.0;
    }

    let endpoints: HashSet<&str> = record
        .edges
        .iter()
        .flat_map(|edge| [edge.source.as_str(), edge.target.as_str()])
        .collect();

    let connected = record
        .nodes
        .iter()
        .filter(|node| endpoints.contains(node.id.as_str()))
        .count();

    connected as f64 / n as f64
}

/// Graph scope: total node count.
pub fn scope(record: &GraphRecord) -> usize {
    record.node_count()
}

/// Mean descriptive-text length over every node and edge.
///
/// Edges fall back to their label when no description is present. Nodes and
/// edges with empty text still count toward the denominator.
pub fn avg_description_length(record: &GraphRecord) -> f64 {
    let population = record.node_count() + record.edge_count();
    if population == 0 {
        return 0.0;
    }

    let node_chars: usize = record.nodes.iter().map(|node| node.description_len()).sum();
    let edge_chars: usize = record
        .edges
        .iter()
        .map(|edge| edge.display_text().chars().count())
        .sum();

    (node_chars + edge_chars) as f64 / population as f64
}

/// Distinct non-empty relation labels over total edge count.
pub fn relation_diversity(record: &GraphRecord) -> f64 {
    if record.edges.is_empty() {
        return 0.0;
    }

    let labels: HashSet<&str> = record
        .edges
        .iter()
        .filter_map(|edge| edge.relation_label())
        .collect();

    labels.len() as f64 / record.edge_count() as f64
}

/// Mean numeric strength over edges that carry one.
///
/// Edges without a usable numeric strength are excluded from numerator and
/// denominator alike; 0.0 when no edge qualifies.
pub fn avg_relation_strength(record: &GraphRecord) -> f64 {
    let strengths: Vec<f64> = record
        .edges
        .iter()
        .filter_map(|edge| edge.numeric_strength())
        .collect();

    if strengths.is_empty() {
        return 0.0;
    }

    strengths.iter().sum::<f64>() / strengths.len() as f64
}
