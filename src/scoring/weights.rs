//! Score weight configuration and aggregation
//!
//! Weights live in an explicit immutable structure passed into the
//! aggregation step, so alternative weight sets are testable without
//! process-wide state. Each stage is convex: its weights sum to 1, which
//! keeps every sub-score and the final score inside [0, 1] for inputs in
//! [0, 1].

use serde::{Deserialize, Serialize};

/// Weights for combining normalized metrics into sub-scores and the final
/// novel graph score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Structure: connectivity share
    pub structure_connectivity: f64,
    /// Structure: normalized scope share
    pub structure_scope: f64,
    /// Richness: normalized description length share
    pub richness_description: f64,
    /// Richness: relation diversity share
    pub richness_diversity: f64,
    /// Richness: normalized relation strength share
    pub richness_strength: f64,
    /// Final: focus share
    pub final_focus: f64,
    /// Final: structure share
    pub final_structure: f64,
    /// Final: richness share
    pub final_richness: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            structure_connectivity: 0.5,
            structure_scope: 0.5,
            richness_description: 1.0 / 3.0,
            richness_diversity: 1.0 / 3.0,
            richness_strength: 1.0 / 3.0,
            final_focus: 1.0 / 3.0,
            final_structure: 1.0 / 3.0,
            final_richness: 1.0 / 3.0,
        }
    }
}

impl ScoreWeights {
    /// Whether every stage's weights sum to 1.
    pub fn is_convex(&self) -> bool {
        let stages = [
            self.structure_connectivity + self.structure_scope,
            self.richness_description + self.richness_diversity + self.richness_strength,
            self.final_focus + self.final_structure + self.final_richness,
        ];
        stages.iter().all(|sum| (sum - 1.0).abs() < 1e-9)
    }

    /// Combine one experiment's metrics into sub-scores and the final score.
    pub fn aggregate(&self, profile: &MetricProfile) -> SubScores {
        // Focus is the centrality alone; kept as a named stage so the
        // breakdown stays legible and extensible.
        let focus = profile.protagonist_centrality;
        let structure = self.structure_connectivity * profile.connectivity
            + self.structure_scope * profile.normalized_scope;
        let richness = self.richness_description * profile.normalized_description_length
            + self.richness_diversity * profile.relation_diversity
            + self.richness_strength * profile.normalized_relation_strength;
        let novel_graph = self.final_focus * focus
            + self.final_structure * structure
            + self.final_richness * richness;

        SubScores {
            focus,
            structure,
            richness,
            novel_graph,
        }
    }
}

/// One experiment's metrics after corpus normalization, ready to aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricProfile {
    pub protagonist_centrality: f64,
    pub connectivity: f64,
    pub normalized_scope: f64,
    pub normalized_description_length: f64,
    pub relation_diversity: f64,
    pub normalized_relation_strength: f64,
}

/// The three sub-scores and the final ranking score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubScores {
    pub focus: f64,
    pub structure: f64,
    pub richness: f64,
    pub novel_graph: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_are_convex() {
        assert!(ScoreWeights::default().is_convex());
    }

    #[test]
    fn skewed_weights_are_detected() {
        let weights = ScoreWeights {
            structure_connectivity: 0.9,
            ..Default::default()
        };
        assert!(!weights.is_convex());
    }

    #[test]
    fn perfect_profile_scores_one() {
        let profile = MetricProfile {
            protagonist_centrality: 1.0,
            connectivity: 1.0,
            normalized_scope: 1.0,
            normalized_description_length: 1.0,
            relation_diversity: 1.0,
            normalized_relation_strength: 1.0,
        };
        let scores = ScoreWeights::default().aggregate(&profile);
        assert!((scores.focus - 1.0).abs() < 1e-12);
        assert!((scores.structure - 1.0).abs() < 1e-12);
        assert!((scores.richness - 1.0).abs() < 1e-12);
        assert!((scores.novel_graph - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_profile_scores_zero() {
        let scores = ScoreWeights::default().aggregate(&MetricProfile::default());
        assert_eq!(scores.novel_graph, 0.0);
    }

    #[test]
    fn final_score_stays_in_unit_interval() {
        let profile = MetricProfile {
            protagonist_centrality: 0.4,
            connectivity: 0.8,
            normalized_scope: 0.1,
            normalized_description_length: 0.9,
            relation_diversity: 0.3,
            normalized_relation_strength: 0.6,
        };
        let scores = ScoreWeights::default().aggregate(&profile);
        for score in [scores.focus, scores.structure, scores.richness, scores.novel_graph] {
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn known_profile_aggregates_exactly() {
        let profile = MetricProfile {
            protagonist_centrality: 0.6,
            connectivity: 1.0,
            normalized_scope: 0.5,
            normalized_description_length: 0.9,
            relation_diversity: 0.3,
            normalized_relation_strength: 0.0,
        };
        let scores = ScoreWeights::default().aggregate(&profile);
        assert!((scores.focus - 0.6).abs() < 1e-12);
        assert!((scores.structure - 0.75).abs() < 1e-12);
        assert!((scores.richness - 0.4).abs() < 1e-12);
        assert!((scores.novel_graph - (0.6 + 0.75 + 0.4) / 3.0).abs() < 1e-12);
    }
}
