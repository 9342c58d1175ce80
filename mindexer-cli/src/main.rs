//! mindexer — command-line front end for the index recommendation engine
//!
//! Reads a JSON array of sample documents and a newline-delimited JSON
//! workload file, runs them through a [`MemoryDriver`], and prints the
//! recommended compound indexes in the database's own index-creation
//! syntax.

use anyhow::{Context, Result};
use clap::Parser;
use mindexer_core::{Engine, EngineConfig, MemoryDriver, Workload};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mindexer")]
#[command(about = "Sample-based index recommendation for a document collection")]
struct Args {
    /// Path to a JSON array of documents standing in for the source collection.
    #[arg(short, long)]
    documents: PathBuf,

    /// Path to a newline-delimited JSON workload file.
    #[arg(short, long)]
    workload: PathBuf,

    /// Path to a TOML file overriding engine defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source database name, checked against `sample_db` at startup.
    #[arg(long, default_value = "app")]
    source_db: String,

    /// Source collection/namespace name.
    #[arg(long, default_value = "collection")]
    namespace: String,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    let env_filter = EnvFilter::new(format!("mindexer_cli={},mindexer_core={}", log_level, log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = match &args.config {
        Some(path) => EngineConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    config.validate().context("invalid engine configuration")?;

    let documents_text = std::fs::read_to_string(&args.documents)
        .with_context(|| format!("failed to read documents from {}", args.documents.display()))?;
    let documents: Vec<serde_json::Value> = serde_json::from_str(&documents_text)
        .context("documents file must be a JSON array of documents")?;
    info!(count = documents.len(), "loaded source documents");

    let workload_text = std::fs::read_to_string(&args.workload)
        .with_context(|| format!("failed to read workload from {}", args.workload.display()))?;
    let workload = Workload::from_jsonlines(&workload_text);
    info!(count = workload.queries.len(), "loaded workload queries");

    let driver: Arc<dyn mindexer_core::Driver> = Arc::new(MemoryDriver::new(documents));
    let engine = Engine::new(driver, config);

    let recommendations = engine
        .recommend(&args.source_db, &args.namespace, &workload)
        .await
        .context("recommendation run failed")?;

    if recommendations.is_empty() {
        println!("No index recommendations — workload already well served or empty.");
        return Ok(());
    }

    for recommendation in &recommendations {
        println!(
            "{} // benefit: {:.1}",
            render_index_spec(&recommendation.candidate),
            recommendation.round_benefit
        );
    }

    Ok(())
}

/// Renders a candidate as `{field1: 1, field2: 1, ...}`, the database's own
/// index-creation syntax (spec §4.7 "Human-facing rendering").
fn render_index_spec(candidate: &[String]) -> String {
    let fields: Vec<String> = candidate.iter().map(|field| format!("{field}: 1")).collect();
    format!("{{{}}}", fields.join(", "))
}
