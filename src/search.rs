//! Query side: semantic search over the ingested organizations.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::embedder::{EmbeddingProvider, TextEmbedder};
use crate::payload::OrganizationPayload;
use crate::vector_store::{CollectionName, PayloadMatch, SearchStore};

/// Number of results returned when the caller does not ask for a specific count.
pub const DEFAULT_SEARCH_LIMIT: usize = 15;

/// Interests appended to a query at most.
pub const MAX_QUERY_INTERESTS: usize = 3;

/// One organization returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Similarity score.
    pub score: f32,
    /// Stored organization fields.
    #[serde(flatten)]
    pub payload: OrganizationPayload,
}

/// Joins the query with up to three interests, dropping blank parts.
pub fn build_query_text<S: AsRef<str>>(query: &str, interests: &[S]) -> String {
    std::iter::once(query)
        .chain(
            interests
                .iter()
                .take(MAX_QUERY_INTERESTS)
                .map(|interest| interest.as_ref()),
        )
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Exact-match filter on the stored municipality, or `None` for a blank input.
pub fn municipality_filter(kommune: Option<&str>) -> Option<PayloadMatch> {
    let kommune = kommune?.trim();
    (!kommune.is_empty()).then(|| PayloadMatch {
        key: "kommune".to_string(),
        value: kommune.to_uppercase(),
    })
}

/// Embeds the query and returns the closest organizations.
pub fn search_organizations<P, S>(
    embedder: &TextEmbedder<P>,
    store: &S,
    collection: &CollectionName,
    query: &str,
    limit: usize,
    filter: Option<&PayloadMatch>,
) -> Result<Vec<SearchHit>>
where
    P: EmbeddingProvider,
    S: SearchStore + ?Sized,
{
    anyhow::ensure!(!query.trim().is_empty(), "search query is empty");
    let vector = embedder.embed(query).context("failed to embed search query")?;
    let points = store.search(collection, &vector, limit, filter)?;
    info!(
        %collection,
        results = points.len(),
        filtered = filter.is_some(),
        "search complete"
    );
    Ok(points
        .into_iter()
        .map(|point| SearchHit {
            score: point.score,
            payload: point.payload,
        })
        .collect())
}
