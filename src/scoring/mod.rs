//! Two-pass corpus scoring
//!
//! Pass one loads every experiment and captures its raw metrics; a hard
//! barrier then computes corpus-wide maxima; pass two normalizes each
//! experiment against those maxima and aggregates the final scores.
//! [`CorpusMaxima`] is only constructible from a completed collection,
//! which is what keeps the barrier enforceable: nothing can normalize
//! before everything has been collected.
//!
//! Per-experiment failures are isolated. A failed experiment is excluded
//! from the maxima (so one broken graph cannot deflate everyone else's
//! normalized scores) and surfaces as a zero-filled result carrying the
//! error.

mod weights;

pub use weights::{MetricProfile, ScoreWeights, SubScores};

use crate::loader::{ExperimentLoader, LoadError};
use crate::metrics::{self, RawMetrics};
use crate::record::GraphRecord;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Errors that abort a whole corpus run.
///
/// Only boundary conditions live here; anything specific to one experiment
/// is carried on that experiment's result instead.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("failed to read corpus root {path}: {source}")]
    CorpusRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("collection worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Raw per-graph quantities captured during collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphSnapshot {
    pub node_count: usize,
    pub edge_count: usize,
    pub protagonist_centrality: f64,
    pub connectivity: f64,
    pub relation_diversity: f64,
    pub raw: RawMetrics,
}

impl GraphSnapshot {
    /// Capture every raw metric for one loaded record.
    pub fn capture(record: &GraphRecord, protagonist_id: &str) -> Self {
        Self {
            node_count: record.node_count(),
            edge_count: record.edge_count(),
            protagonist_centrality: metrics::protagonist_centrality(record, protagonist_id),
            connectivity: metrics::connectivity_score(record),
            relation_diversity: metrics::relation_diversity(record),
            raw: metrics::raw_metrics(record),
        }
    }
}

/// One experiment's collection outcome, success or failure.
#[derive(Debug)]
pub struct CollectedExperiment {
    pub directory: String,
    pub protagonist_id: String,
    pub outcome: Result<GraphSnapshot, LoadError>,
}

/// Corpus-wide maxima of the normalization-bound raw metrics.
///
/// Computed once over all successfully collected experiments; failed
/// experiments are excluded. Any maximum may be 0 for an empty or
/// degenerate corpus, in which case the corresponding normalized metric is
/// 0.0 everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusMaxima {
    max_scope: f64,
    max_avg_description_length: f64,
    max_avg_relation_strength: f64,
}

impl CorpusMaxima {
    /// Reduce a completed collection to its maxima.
    pub fn from_collection(collected: &[CollectedExperiment]) -> Self {
        let snapshots = collected
            .iter()
            .filter_map(|experiment| experiment.outcome.as_ref().ok());

        let mut maxima = Self {
            max_scope: 0.0,
            max_avg_description_length: 0.0,
            max_avg_relation_strength: 0.0,
        };
        for snapshot in snapshots {
            maxima.max_scope = maxima.max_scope.max(snapshot.raw.scope as f64);
            maxima.max_avg_description_length = maxima
                .max_avg_description_length
                .max(snapshot.raw.avg_description_length);
            maxima.max_avg_relation_strength = maxima
                .max_avg_relation_strength
                .max(snapshot.raw.avg_relation_strength);
        }
        maxima
    }

    pub fn normalized_scope(&self, raw: usize) -> f64 {
        ratio(raw as f64, self.max_scope)
    }

    pub fn normalized_description_length(&self, raw: f64) -> f64 {
        ratio(raw, self.max_avg_description_length)
    }

    pub fn normalized_relation_strength(&self, raw: f64) -> f64 {
        ratio(raw, self.max_avg_relation_strength)
    }
}

/// `raw / max`, defined as 0.0 when the maximum is 0 so a degenerate corpus
/// yields zeros instead of NaN.
fn ratio(raw: f64, max: f64) -> f64 {
    if max > 0.0 {
        raw / max
    } else {
        0.0
    }
}

/// Final per-experiment output: raw and normalized values, sub-scores, and
/// the final ranking score.
///
/// When `error` is set every numeric field is zero rather than absent, so
/// ranking and rendering never branch on missing values.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    pub directory: String,
    pub protagonist_id: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub protagonist_centrality: f64,
    pub connectivity_score: f64,
    pub relationship_diversity: f64,
    pub raw_scope: usize,
    pub normalized_scope: f64,
    pub raw_avg_description_length: f64,
    pub normalized_avg_description_length: f64,
    pub raw_avg_relation_strength: f64,
    pub normalized_avg_relation_strength: f64,
    pub focus_score: f64,
    pub structure_score: f64,
    pub richness_score: f64,
    pub novel_graph_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EvaluationResult {
    /// Zero-filled result for an experiment that failed to load.
    pub fn failed(directory: String, protagonist_id: String, error: String) -> Self {
        Self {
            directory,
            protagonist_id,
            node_count: 0,
            edge_count: 0,
            protagonist_centrality: 0.0,
            connectivity_score: 0.0,
            relationship_diversity: 0.0,
            raw_scope: 0,
            normalized_scope: 0.0,
            raw_avg_description_length: 0.0,
            normalized_avg_description_length: 0.0,
            raw_avg_relation_strength: 0.0,
            normalized_avg_relation_strength: 0.0,
            focus_score: 0.0,
            structure_score: 0.0,
            richness_score: 0.0,
            novel_graph_score: 0.0,
            error: Some(error),
        }
    }
}

/// Drives the two-pass evaluation over a corpus root.
pub struct CorpusEvaluator {
    loader: Arc<ExperimentLoader>,
    weights: ScoreWeights,
}

impl CorpusEvaluator {
    pub fn new(loader: ExperimentLoader) -> Self {
        Self {
            loader: Arc::new(loader),
            weights: ScoreWeights::default(),
        }
    }

    /// Swap in a non-default weight set
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Evaluate every experiment directory under the corpus root.
    ///
    /// Results come back in directory order; ranking is the reporter's job.
    pub async fn evaluate(&self, corpus_root: &Path) -> Result<Vec<EvaluationResult>, EvalError> {
        let collected = self.collect(corpus_root).await?;
        info!(experiments = collected.len(), "collection complete");

        let maxima = CorpusMaxima::from_collection(&collected);
        debug!(?maxima, "corpus maxima");

        Ok(self.normalize(collected, &maxima))
    }

    /// Pass one: load and extract every experiment, failures included.
    ///
    /// Experiments load concurrently; results are gathered into a single
    /// collection and sorted by directory name, so downstream output is
    /// deterministic regardless of completion order.
    async fn collect(&self, corpus_root: &Path) -> Result<Vec<CollectedExperiment>, EvalError> {
        let corpus_error = |source| EvalError::CorpusRoot {
            path: corpus_root.to_path_buf(),
            source,
        };

        let mut directories = Vec::new();
        let mut entries = fs::read_dir(corpus_root).await.map_err(corpus_error)?;
        while let Some(entry) = entries.next_entry().await.map_err(corpus_error)? {
            let is_dir = entry
                .file_type()
                .await
                .map(|kind| kind.is_dir())
                .unwrap_or(false);
            if is_dir {
                directories.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
            }
        }
        directories.sort();

        let mut workers = JoinSet::new();
        for (directory, path) in directories {
            let loader = Arc::clone(&self.loader);
            workers.spawn(async move {
                let loaded = loader.load(&path).await;
                let outcome = loaded
                    .record
                    .map(|record| GraphSnapshot::capture(&record, &loaded.protagonist_id));
                CollectedExperiment {
                    directory,
                    protagonist_id: loaded.protagonist_id,
                    outcome,
                }
            });
        }

        let mut collected = Vec::new();
        while let Some(joined) = workers.join_next().await {
            let experiment = joined?;
            if let Err(err) = &experiment.outcome {
                info!(directory = %experiment.directory, %err, "experiment failed to load");
            }
            collected.push(experiment);
        }
        collected.sort_by(|a, b| a.directory.cmp(&b.directory));
        Ok(collected)
    }

    /// Pass two: normalize each experiment against the maxima and aggregate.
    fn normalize(
        &self,
        collected: Vec<CollectedExperiment>,
        maxima: &CorpusMaxima,
    ) -> Vec<EvaluationResult> {
        collected
            .into_iter()
            .map(|experiment| match experiment.outcome {
                Err(error) => EvaluationResult::failed(
                    experiment.directory,
                    experiment.protagonist_id,
                    error.to_string(),
                ),
                Ok(snapshot) => {
                    let profile = MetricProfile {
                        protagonist_centrality: snapshot.protagonist_centrality,
                        connectivity: snapshot.connectivity,
                        normalized_scope: maxima.normalized_scope(snapshot.raw.scope),
                        normalized_description_length: maxima
                            .normalized_description_length(snapshot.raw.avg_description_length),
                        relation_diversity: snapshot.relation_diversity,
                        normalized_relation_strength: maxima
                            .normalized_relation_strength(snapshot.raw.avg_relation_strength),
                    };
                    let scores = self.weights.aggregate(&profile);

                    EvaluationResult {
                        directory: experiment.directory,
                        protagonist_id: experiment.protagonist_id,
                        node_count: snapshot.node_count,
                        edge_count: snapshot.edge_count,
                        protagonist_centrality: snapshot.protagonist_centrality,
                        connectivity_score: snapshot.connectivity,
                        relationship_diversity: snapshot.relation_diversity,
                        raw_scope: snapshot.raw.scope,
                        normalized_scope: profile.normalized_scope,
                        raw_avg_description_length: snapshot.raw.avg_description_length,
                        normalized_avg_description_length: profile.normalized_description_length,
                        raw_avg_relation_strength: snapshot.raw.avg_relation_strength,
                        normalized_avg_relation_strength: profile.normalized_relation_strength,
                        focus_score: scores.focus,
                        structure_score: scores.structure,
                        richness_score: scores.richness,
                        novel_graph_score: scores.novel_graph,
                        error: None,
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Edge, Node};

    fn collected(directory: &str, scope: usize, desc: f64, strength: f64) -> CollectedExperiment {
        CollectedExperiment {
            directory: directory.to_string(),
            protagonist_id: "P".to_string(),
            outcome: Ok(GraphSnapshot {
                node_count: scope,
                edge_count: 0,
                protagonist_centrality: 0.0,
                connectivity: 0.0,
                relation_diversity: 0.0,
                raw: RawMetrics {
                    scope,
                    avg_description_length: desc,
                    avg_relation_strength: strength,
                },
            }),
        }
    }

    fn failed(directory: &str) -> CollectedExperiment {
        CollectedExperiment {
            directory: directory.to_string(),
            protagonist_id: "P".to_string(),
            outcome: Err(LoadError::SourceNotFound),
        }
    }

    #[test]
    fn maxima_take_per_metric_maximum() {
        let corpus = vec![
            collected("a", 10, 3.0, 9.0),
            collected("b", 5, 8.0, 1.0),
        ];
        let maxima = CorpusMaxima::from_collection(&corpus);
        assert_eq!(maxima.normalized_scope(10), 1.0);
        assert_eq!(maxima.normalized_scope(5), 0.5);
        assert_eq!(maxima.normalized_description_length(8.0), 1.0);
        assert_eq!(maxima.normalized_relation_strength(9.0), 1.0);
    }

    #[test]
    fn maxima_exclude_failed_experiments() {
        // The failed experiment must not contribute; with only one success,
        // that success normalizes to 1.0.
        let corpus = vec![collected("a", 4, 2.0, 1.0), failed("b")];
        let maxima = CorpusMaxima::from_collection(&corpus);
        assert_eq!(maxima.normalized_scope(4), 1.0);
    }

    #[test]
    fn degenerate_corpus_normalizes_to_zero() {
        let corpus = vec![collected("a", 0, 0.0, 0.0), collected("b", 0, 0.0, 0.0)];
        let maxima = CorpusMaxima::from_collection(&corpus);
        assert_eq!(maxima.normalized_scope(0), 0.0);
        assert_eq!(maxima.normalized_description_length(0.0), 0.0);
        assert_eq!(maxima.normalized_relation_strength(0.0), 0.0);
    }

    #[test]
    fn empty_collection_yields_zero_maxima() {
        let maxima = CorpusMaxima::from_collection(&[]);
        assert_eq!(maxima.normalized_scope(3), 0.0);
    }

    #[test]
    fn snapshot_captures_all_raw_metrics() {
        let record = GraphRecord::new()
            .with_nodes(vec![Node::new("P"), Node::new("X")])
            .with_edges(vec![Edge::new("P", "X").with_label("knows").with_strength(4.0)]);
        let snapshot = GraphSnapshot::capture(&record, "P");
        assert_eq!(snapshot.node_count, 2);
        assert_eq!(snapshot.edge_count, 1);
        assert_eq!(snapshot.protagonist_centrality, 1.0);
        assert_eq!(snapshot.connectivity, 1.0);
        assert_eq!(snapshot.relation_diversity, 1.0);
        assert_eq!(snapshot.raw.scope, 2);
        assert_eq!(snapshot.raw.avg_relation_strength, 4.0);
    }

    #[test]
    fn failed_result_is_zero_filled() {
        let result = EvaluationResult::failed(
            "broken".to_string(),
            "P".to_string(),
            "source file not found".to_string(),
        );
        assert_eq!(result.novel_graph_score, 0.0);
        assert_eq!(result.raw_scope, 0);
        assert_eq!(result.error.as_deref(), Some("source file not found"));
    }
}
