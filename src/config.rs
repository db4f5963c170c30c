//! Run settings and the command-line/environment surface shared by the binaries.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::embedder::gemini::{
    GeminiEmbedder, TaskType, DEFAULT_GEMINI_BASE, DEFAULT_GEMINI_DIMENSION, DEFAULT_GEMINI_MODEL,
};
use crate::embedder::{TextEmbedder, DEFAULT_MAX_INPUT_CHARS};
use crate::loader::{ShardPattern, DEFAULT_SHARD_PATTERN};
use crate::vector_store::qdrant::{QdrantStore, DEFAULT_QDRANT_URL};
use crate::vector_store::{CollectionName, Distance, DEFAULT_COLLECTION};

/// Default number of points per upsert request.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Tunables that shape one ingestion run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestSettings {
    collection: CollectionName,
    dimension: usize,
    distance: Distance,
    batch_size: usize,
    max_input_chars: usize,
}

impl IngestSettings {
    /// Constructs a new set of ingestion settings.
    pub fn new(
        collection: CollectionName,
        dimension: usize,
        distance: Distance,
        batch_size: usize,
        max_input_chars: usize,
    ) -> Result<Self> {
        anyhow::ensure!(dimension > 0, "embedding dimension must be positive");
        anyhow::ensure!(batch_size > 0, "batch size must be positive");
        anyhow::ensure!(max_input_chars > 0, "max input length must be positive");
        Ok(Self {
            collection,
            dimension,
            distance,
            batch_size,
            max_input_chars,
        })
    }

    /// Target collection.
    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    /// Vector length declared for the collection.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Similarity metric declared for the collection.
    pub fn distance(&self) -> Distance {
        self.distance
    }

    /// Maximum points per upsert request.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Longest text, in characters, sent to the embedding provider.
    pub fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            collection: CollectionName(DEFAULT_COLLECTION.to_string()),
            dimension: DEFAULT_GEMINI_DIMENSION,
            distance: Distance::Cosine,
            batch_size: DEFAULT_BATCH_SIZE,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

/// Vector store connection options.
#[derive(Args, Debug, Clone)]
pub struct QdrantArgs {
    /// Qdrant REST URL; a local instance is used when unset
    #[arg(long, env = "QDRANT_URL")]
    pub qdrant_url: Option<String>,

    /// Qdrant API key (cloud clusters only)
    #[arg(long, env = "QDRANT_API_KEY", hide_env_values = true)]
    pub qdrant_api_key: Option<String>,

    /// Collection holding the organization vectors
    #[arg(long, env = "FRIVILLIG_COLLECTION", default_value = DEFAULT_COLLECTION)]
    pub collection: String,
}

impl QdrantArgs {
    /// Validated collection name.
    pub fn collection_name(&self) -> Result<CollectionName> {
        CollectionName::new(self.collection.clone())
    }

    /// Connects to the configured Qdrant URL, falling back to the local default.
    pub fn connect(&self, timeout: Duration) -> Result<QdrantStore> {
        let configured = self
            .qdrant_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty());
        let store = match configured {
            Some(url) => {
                info!(url, "connecting to remote Qdrant");
                QdrantStore::new(url, self.qdrant_api_key.clone(), timeout)?
            }
            None => {
                info!(url = DEFAULT_QDRANT_URL, "connecting to local Qdrant");
                QdrantStore::new(DEFAULT_QDRANT_URL, None, timeout)?
            }
        };
        Ok(store)
    }
}

/// Embedding provider options.
#[derive(Args, Debug, Clone)]
pub struct GeminiArgs {
    /// Google AI API key used for embedding calls
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: String,

    /// Embedding model identifier
    #[arg(long, env = "FRIVILLIG_EMBEDDING_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub embedding_model: String,

    /// Base URL for the Generative Language API
    #[arg(long, env = "FRIVILLIG_GEMINI_BASE", default_value = DEFAULT_GEMINI_BASE)]
    pub gemini_base_url: String,

    /// Vector length produced by the model
    #[arg(long, env = "FRIVILLIG_EMBEDDING_DIM", default_value_t = DEFAULT_GEMINI_DIMENSION)]
    pub embedding_dim: usize,

    /// Longest text, in characters, sent for embedding
    #[arg(long, env = "FRIVILLIG_MAX_INPUT_CHARS", default_value_t = DEFAULT_MAX_INPUT_CHARS)]
    pub max_input_chars: usize,

    /// Max seconds to wait for each HTTP request
    #[arg(long, env = "FRIVILLIG_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,
}

impl GeminiArgs {
    /// Timeout applied to every HTTP request.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    /// Builds the guarded embedder for the given task type.
    pub fn build_embedder(&self, task_type: TaskType) -> Result<TextEmbedder<GeminiEmbedder>> {
        let provider = GeminiEmbedder::new(
            self.google_api_key.clone(),
            self.gemini_base_url.clone(),
            self.embedding_model.clone(),
            task_type,
            self.timeout(),
        )?;
        TextEmbedder::new(provider, self.embedding_dim, self.max_input_chars)
    }
}

/// Command-line interface of the ingestion binary.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "frivillig-ingest",
    about = "Embed organization shards and load them into a Qdrant collection"
)]
pub struct IngestCli {
    /// Directory holding the JSON shards
    #[arg(long, env = "FRIVILLIG_INPUT_DIR", default_value = "public/json-store")]
    pub input_dir: PathBuf,

    /// Shard file-name glob
    #[arg(long, env = "FRIVILLIG_SHARD_PATTERN", default_value = DEFAULT_SHARD_PATTERN)]
    pub shard_pattern: String,

    /// Points per upsert request
    #[arg(long, env = "FRIVILLIG_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Similarity metric for the collection (cosine, dot, euclid, manhattan)
    #[arg(long, env = "FRIVILLIG_DISTANCE", default_value = "cosine")]
    pub distance: Distance,

    #[command(flatten)]
    pub qdrant: QdrantArgs,

    #[command(flatten)]
    pub gemini: GeminiArgs,
}

impl IngestCli {
    /// Converts the parsed CLI into `IngestSettings`.
    pub fn build_settings(&self) -> Result<IngestSettings> {
        IngestSettings::new(
            self.qdrant.collection_name()?,
            self.gemini.embedding_dim,
            self.distance,
            self.batch_size,
            self.gemini.max_input_chars,
        )
    }

    /// Parsed shard pattern.
    pub fn shard_pattern(&self) -> Result<ShardPattern> {
        Ok(ShardPattern::new(&self.shard_pattern)?)
    }
}

/// Installs the stderr log subscriber, honouring `RUST_LOG` (default `info`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
