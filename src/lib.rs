#![warn(missing_docs)]
//! Core library entry points for the volunteer organization ingestion pipeline.

pub mod compose;
pub mod config;
pub mod embedder;
pub mod ingest;
pub mod loader;
pub mod organization;
pub mod payload;
pub mod region;
pub mod search;
pub mod vector_store;

pub use compose::{compose_embedding_text, is_valid_for_embedding};
pub use config::{IngestCli, IngestSettings};
pub use embedder::{EmbeddingProvider, TextEmbedder};
pub use ingest::{prepare_valid_records, run_ingest, BatchUpserter, IngestSummary, PreparedRecord};
pub use loader::{load_shards, LoadError, ShardPattern};
pub use organization::OrganizationRecord;
pub use payload::OrganizationPayload;
pub use region::region_for_municipality;
pub use search::{search_organizations, SearchHit};
pub use vector_store::{
    CollectionName, Distance, PayloadMatch, ScoredPoint, SearchStore, VectorPoint, VectorStore,
};
