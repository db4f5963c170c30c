//! Vector store abstractions shared by the ingestion and search binaries.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::payload::OrganizationPayload;

pub mod qdrant;

/// Collection the organization vectors live in unless configured otherwise.
pub const DEFAULT_COLLECTION: &str = "frivillig_orgs";

/// Validated collection identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionName(pub(crate) String);

impl CollectionName {
    /// Builds a new collection identifier.
    pub fn new<S: Into<String>>(name: S) -> Result<Self> {
        let name = name.into();
        anyhow::ensure!(!name.trim().is_empty(), "collection name is required");
        anyhow::ensure!(
            name.chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-')),
            "collection name {name:?} may only contain ASCII letters, digits, '_' and '-'"
        );
        Ok(Self(name))
    }

    /// Returns the raw name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Similarity metric declared when a collection is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    /// Cosine similarity.
    #[default]
    Cosine,
    /// Dot product.
    Dot,
    /// Euclidean distance.
    Euclid,
    /// Manhattan distance.
    Manhattan,
}

impl std::str::FromStr for Distance {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(Self::Cosine),
            "dot" => Ok(Self::Dot),
            "euclid" | "euclidean" => Ok(Self::Euclid),
            "manhattan" => Ok(Self::Manhattan),
            other => anyhow::bail!("unknown distance metric {other:?}"),
        }
    }
}

/// One stored point: sequential id, vector, and display payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorPoint {
    /// Position of the record in the filtered ingestion sequence.
    pub id: u64,
    /// Embedding vector.
    pub vector: Vec<f32>,
    /// Display/filter payload.
    pub payload: OrganizationPayload,
}

/// Exact-match restriction on a payload key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadMatch {
    /// Payload key to compare.
    pub key: String,
    /// Required value.
    pub value: String,
}

/// A search result with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPoint {
    /// Point id.
    pub id: u64,
    /// Similarity score reported by the store.
    pub score: f32,
    /// Stored payload.
    pub payload: OrganizationPayload,
}

/// Operations the pipeline needs from a vector database.
pub trait VectorStore {
    /// Whether `collection` exists.
    fn collection_exists(&self, collection: &CollectionName) -> Result<bool>;

    /// Drops `collection` and all its points.
    fn delete_collection(&self, collection: &CollectionName) -> Result<()>;

    /// Creates `collection` for vectors of `dimension` floats compared with `distance`.
    fn create_collection(
        &self,
        collection: &CollectionName,
        dimension: usize,
        distance: Distance,
    ) -> Result<()>;

    /// Writes `points` in a single request, waiting until they are stored.
    fn upsert_points(&self, collection: &CollectionName, points: &[VectorPoint]) -> Result<()>;
}

impl<S: VectorStore + ?Sized> VectorStore for &S {
    fn collection_exists(&self, collection: &CollectionName) -> Result<bool> {
        (**self).collection_exists(collection)
    }

    fn delete_collection(&self, collection: &CollectionName) -> Result<()> {
        (**self).delete_collection(collection)
    }

    fn create_collection(
        &self,
        collection: &CollectionName,
        dimension: usize,
        distance: Distance,
    ) -> Result<()> {
        (**self).create_collection(collection, dimension, distance)
    }

    fn upsert_points(&self, collection: &CollectionName, points: &[VectorPoint]) -> Result<()> {
        (**self).upsert_points(collection, points)
    }
}

/// Nearest-neighbour queries against a collection.
pub trait SearchStore {
    /// Returns up to `limit` points closest to `vector`, best first.
    fn search(
        &self,
        collection: &CollectionName,
        vector: &[f32],
        limit: usize,
        filter: Option<&PayloadMatch>,
    ) -> Result<Vec<ScoredPoint>>;
}

/// Drops `collection` if present, then creates it empty.
pub fn recreate_collection<S: VectorStore + ?Sized>(
    store: &S,
    collection: &CollectionName,
    dimension: usize,
    distance: Distance,
) -> Result<()> {
    anyhow::ensure!(dimension > 0, "embedding dimension must be positive");
    if store.collection_exists(collection)? {
        info!(%collection, "collection exists, recreating");
        store.delete_collection(collection)?;
    }
    store.create_collection(collection, dimension, distance)?;
    info!(%collection, dimension, ?distance, "created collection");
    Ok(())
}
