//! Edge representation with ordered field resolution
//!
//! Extraction backends disagree on field names: relation strength may be
//! stored under `strength` or `weight`, and descriptive text under
//! `description` or `label`. Each attribute resolves through an explicit
//! candidate order instead of ad hoc fallbacks at call sites.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A directed relation between two entity nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node id
    #[serde(default)]
    pub source: String,
    /// Target node id
    #[serde(default)]
    pub target: String,
    /// Relation type label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Free-text relation description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Relation strength; GraphML data arrives as text, so this is kept
    /// as a raw value and interpreted on read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<Value>,
    /// Legacy strength field used by older extraction runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Value>,
}

impl Edge {
    /// Create an edge between two node ids
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Default::default()
        }
    }

    /// Set the relation label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the relation description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set a numeric strength
    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Value::from(strength).into();
        self
    }

    /// Descriptive text for this edge: `description`, then `label`, then empty.
    pub fn display_text(&self) -> &str {
        [&self.description, &self.label]
            .into_iter()
            .find_map(|field| field.as_deref())
            .unwrap_or("")
    }

    /// Numeric relation strength: first present field of `strength`, `weight`.
    ///
    /// A present-but-unparseable value yields `None` (the edge is excluded
    /// from strength aggregation, not scored as zero).
    pub fn numeric_strength(&self) -> Option<f64> {
        [&self.strength, &self.weight]
            .into_iter()
            .find_map(|field| field.as_ref())
            .and_then(as_number)
    }

    /// Non-empty relation label, if any
    pub fn relation_label(&self) -> Option<&str> {
        self.label.as_deref().filter(|label| !label.is_empty())
    }
}

/// Interpret a JSON value as a float, accepting numeric strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_text_prefers_description() {
        let edge = Edge::new("A", "B")
            .with_label("knows")
            .with_description("A knows B well");
        assert_eq!(edge.display_text(), "A knows B well");
    }

    #[test]
    fn display_text_falls_back_to_label() {
        let edge = Edge::new("A", "B").with_label("knows");
        assert_eq!(edge.display_text(), "knows");
        assert_eq!(Edge::new("A", "B").display_text(), "");
    }

    #[test]
    fn strength_resolves_before_weight() {
        let edge: Edge =
            serde_json::from_value(json!({"source": "A", "target": "B", "strength": 9.0, "weight": 1.0}))
                .unwrap();
        assert_eq!(edge.numeric_strength(), Some(9.0));
    }

    #[test]
    fn weight_used_when_strength_absent() {
        let edge: Edge =
            serde_json::from_value(json!({"source": "A", "target": "B", "weight": "4.5"})).unwrap();
        assert_eq!(edge.numeric_strength(), Some(4.5));
    }

    #[test]
    fn unparseable_strength_is_excluded_not_zero() {
        let edge: Edge =
            serde_json::from_value(json!({"source": "A", "target": "B", "strength": "high"}))
                .unwrap();
        assert_eq!(edge.numeric_strength(), None);
    }

    #[test]
    fn numeric_string_strength_is_accepted() {
        let edge: Edge =
            serde_json::from_value(json!({"source": "A", "target": "B", "strength": "7.0"}))
                .unwrap();
        assert_eq!(edge.numeric_strength(), Some(7.0));
    }

    #[test]
    fn empty_label_is_not_a_relation_label() {
        let edge = Edge::new("A", "B").with_label("");
        assert_eq!(edge.relation_label(), None);
    }
}
