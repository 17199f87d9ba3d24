//! Graphgauge CLI: score and rank knowledge-graph extraction experiments.
//!
//! Usage:
//!   graphgauge [CORPUS_ROOT] [--protagonist ID] [--json] [--verbose]

use clap::Parser;
use graphgauge::loader::{ExperimentLoader, GraphmlConverter, DEFAULT_PROTAGONIST_ID};
use graphgauge::report;
use graphgauge::scoring::CorpusEvaluator;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "graphgauge",
    version,
    about = "Score and rank knowledge-graph extraction experiments"
)]
struct Cli {
    /// Corpus root containing one directory per experiment
    #[arg(default_value = "./tobe")]
    corpus_root: PathBuf,

    /// Protagonist entity id used when an experiment does not configure one
    #[arg(long, default_value = DEFAULT_PROTAGONIST_ID)]
    protagonist: String,

    /// Emit results as JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let loader = ExperimentLoader::new(Arc::new(GraphmlConverter::new()))
        .with_default_protagonist(&cli.protagonist);
    let evaluator = CorpusEvaluator::new(loader);

    let mut results = match evaluator.evaluate(&cli.corpus_root).await {
        Ok(results) => results,
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    };

    report::rank(&mut results);

    if cli.json {
        match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("Error: {}", err);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", report::render(&results));
    }
}
