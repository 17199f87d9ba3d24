//! Experiment loading with cache staleness planning
//!
//! Each experiment directory carries a raw serialized graph source and,
//! opportunistically, a cached structured record. Which one to read is a
//! pure decision ([`plan_load`]) taken once per experiment from the
//! presence and freshness of the two files; the I/O that acts on the plan
//! lives in [`ExperimentLoader`].

mod convert;

pub use convert::{ConvertError, GraphmlConverter, SourceConverter};

use crate::record::GraphRecord;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

/// Raw serialized graph source written by the extraction system
pub const RAW_SOURCE_FILE: &str = "graph_chunk_entity_relation.graphml";

/// Cached structured record derived from the raw source
pub const CACHE_FILE: &str = "graph_data.json";

/// Optional per-experiment configuration file
pub const EXPERIMENT_CONFIG_FILE: &str = "experiment.yaml";

/// Protagonist entity id assumed when no experiment config overrides it
pub const DEFAULT_PROTAGONIST_ID: &str = "SCROOGE";

/// Errors that fail a single experiment's load.
///
/// These never abort a corpus run; they surface on the experiment's result.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source file not found")]
    SourceNotFound,

    #[error("malformed source: {0}")]
    MalformedSource(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// How to obtain the structured record for one experiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPlan {
    /// Cached record exists and is at least as fresh as the raw source
    UseCache,
    /// Raw source must be converted (cache missing or stale)
    Reconvert,
    /// Neither file exists
    Unrecoverable,
}

/// Decide how to load from the modification times of the cache and raw
/// source files (`None` when the file is absent).
pub fn plan_load(
    cache_modified: Option<SystemTime>,
    raw_modified: Option<SystemTime>,
) -> LoadPlan {
    match (cache_modified, raw_modified) {
        (Some(cache), Some(raw)) if cache >= raw => LoadPlan::UseCache,
        (Some(_), Some(_)) => LoadPlan::Reconvert,
        (Some(_), None) => LoadPlan::UseCache,
        (None, Some(_)) => LoadPlan::Reconvert,
        (None, None) => LoadPlan::Unrecoverable,
    }
}

/// Per-experiment configuration, all fields optional.
#[derive(Debug, Default, Deserialize)]
struct ExperimentConfig {
    #[serde(default)]
    protagonist_id: Option<String>,
}

/// Outcome of loading one experiment directory.
///
/// The protagonist id always resolves, even when the record itself failed
/// to load.
#[derive(Debug)]
pub struct LoadedExperiment {
    pub protagonist_id: String,
    pub record: Result<GraphRecord, LoadError>,
}

/// Loads experiment graph records, preferring the structured cache and
/// falling back to conversion from the raw source.
pub struct ExperimentLoader {
    converter: Arc<dyn SourceConverter>,
    default_protagonist: String,
}

impl ExperimentLoader {
    pub fn new(converter: Arc<dyn SourceConverter>) -> Self {
        Self {
            converter,
            default_protagonist: DEFAULT_PROTAGONIST_ID.to_string(),
        }
    }

    /// Override the corpus-wide default protagonist id
    pub fn with_default_protagonist(mut self, id: impl Into<String>) -> Self {
        self.default_protagonist = id.into();
        self
    }

    /// Load one experiment directory.
    pub async fn load(&self, dir: &Path) -> LoadedExperiment {
        let protagonist_id = self.resolve_protagonist(dir).await;
        let record = self.load_record(dir).await;
        LoadedExperiment {
            protagonist_id,
            record,
        }
    }

    async fn load_record(&self, dir: &Path) -> Result<GraphRecord, LoadError> {
        let raw_path = dir.join(RAW_SOURCE_FILE);
        let cache_path = dir.join(CACHE_FILE);

        let plan = plan_load(modified_at(&cache_path).await, modified_at(&raw_path).await);
        debug!(directory = %dir.display(), ?plan, "load plan");

        match plan {
            LoadPlan::UseCache => match read_cached_record(&cache_path).await {
                Ok(record) => Ok(record),
                Err(reason) => {
                    // One reconversion attempt before giving up on the
                    // experiment.
                    if path_exists(&raw_path).await {
                        warn!(
                            cache = %cache_path.display(),
                            reason,
                            "cached record unusable, reconverting from raw source"
                        );
                        self.reconvert(&raw_path, &cache_path).await
                    } else {
                        Err(LoadError::MalformedSource(reason))
                    }
                }
            },
            LoadPlan::Reconvert => self.reconvert(&raw_path, &cache_path).await,
            LoadPlan::Unrecoverable => Err(LoadError::SourceNotFound),
        }
    }

    async fn reconvert(
        &self,
        raw_path: &Path,
        cache_path: &Path,
    ) -> Result<GraphRecord, LoadError> {
        let raw = match fs::read_to_string(raw_path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::SourceNotFound)
            }
            Err(err) => return Err(err.into()),
        };

        let record = self
            .converter
            .convert(&raw)
            .map_err(|err| LoadError::MalformedSource(err.to_string()))?;

        // Cache write-back is an optimization, never a load failure.
        if let Ok(bytes) = serde_json::to_vec_pretty(&record) {
            if let Err(err) = fs::write(cache_path, bytes).await {
                warn!(cache = %cache_path.display(), %err, "failed to write record cache");
            }
        }

        Ok(record)
    }

    /// Resolve the protagonist id for an experiment.
    ///
    /// An absent or malformed config file never fails the experiment; it
    /// logs and falls back to the corpus default.
    async fn resolve_protagonist(&self, dir: &Path) -> String {
        let path = dir.join(EXPERIMENT_CONFIG_FILE);
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(_) => return self.default_protagonist.clone(),
        };

        match serde_yaml::from_str::<ExperimentConfig>(&text) {
            Ok(config) => config
                .protagonist_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| self.default_protagonist.clone()),
            Err(err) => {
                warn!(
                    config = %path.display(),
                    %err,
                    "unreadable experiment config, using default protagonist"
                );
                self.default_protagonist.clone()
            }
        }
    }
}

async fn modified_at(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).await.ok()?.modified().ok()
}

async fn path_exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// Read and validate the cached structured record.
///
/// A cache that parses but carries neither `nodes` nor `edges` is treated
/// as structurally invalid; one that carries only one of them defaults the
/// other to an empty sequence.
async fn read_cached_record(path: &Path) -> Result<GraphRecord, String> {
    let text = fs::read_to_string(path)
        .await
        .map_err(|err| err.to_string())?;
    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|err| err.to_string())?;

    let object = value
        .as_object()
        .ok_or_else(|| "cached record is not an object".to_string())?;
    if !object.contains_key("nodes") && !object.contains_key("edges") {
        return Err("cached record has neither nodes nor edges".to_string());
    }

    serde_json::from_value(value).map_err(|err| err.to_string())
}
