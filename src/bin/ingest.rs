use anyhow::{Context, Result};
use clap::Parser;
use frivillig_ingest::config::init_logging;
use frivillig_ingest::embedder::gemini::TaskType;
use frivillig_ingest::{load_shards, run_ingest, IngestCli};
use tracing::info;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    let cli = IngestCli::parse();

    // Everything that can fail on configuration or input runs before the collection is touched.
    let settings = cli.build_settings()?;
    let pattern = cli.shard_pattern()?;
    let embedder = cli.gemini.build_embedder(TaskType::RetrievalDocument)?;
    let store = cli.qdrant.connect(cli.gemini.timeout())?;

    info!(dir = %cli.input_dir.display(), "loading organizations");
    let organizations = load_shards(&cli.input_dir, &pattern)
        .with_context(|| format!("failed to load shards from {:?}", cli.input_dir))?;
    info!(count = organizations.len(), "loaded organizations");

    let summary = run_ingest(organizations, &embedder, &store, &settings)?;
    info!(
        collection = %settings.collection(),
        loaded = summary.loaded,
        valid = summary.valid,
        batches = summary.batches,
        points = summary.points,
        "ingestion complete"
    );
    Ok(())
}
