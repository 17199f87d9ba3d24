//! Graphgauge: unsupervised scoring of knowledge-graph extraction experiments
//!
//! Evaluates a corpus of extracted knowledge graphs (one per experiment
//! directory) against a rubric that rewards being centered on a protagonist
//! entity, well connected, broad in scope, and rich in descriptive detail.
//! No ground-truth labels are involved.
//!
//! # Pipeline
//!
//! - **loader**: structured record per experiment, cache-aware
//! - **metrics**: pure per-graph raw metrics
//! - **scoring**: two-pass corpus normalization and weighted aggregation
//! - **report**: ranked textual summary
//!
//! # Example
//!
//! ```no_run
//! use graphgauge::loader::{ExperimentLoader, GraphmlConverter};
//! use graphgauge::report;
//! use graphgauge::scoring::CorpusEvaluator;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), graphgauge::scoring::EvalError> {
//! let loader = ExperimentLoader::new(Arc::new(GraphmlConverter::new()));
//! let evaluator = CorpusEvaluator::new(loader);
//! let mut results = evaluator.evaluate(Path::new("./tobe")).await?;
//! report::rank(&mut results);
//! print!("{}", report::render(&results));
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod metrics;
pub mod record;
pub mod report;
pub mod scoring;

pub use loader::{ExperimentLoader, GraphmlConverter, LoadError, SourceConverter};
pub use record::{Edge, GraphRecord, Node};
pub use scoring::{CorpusEvaluator, EvalError, EvaluationResult, ScoreWeights};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
