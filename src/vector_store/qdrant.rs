//! Blocking Qdrant REST client.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use super::{
    CollectionName, Distance, PayloadMatch, ScoredPoint, SearchStore, VectorPoint, VectorStore,
};
use crate::payload::OrganizationPayload;

/// REST endpoint of a Qdrant instance running on the local machine.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6333";

/// Qdrant collection and point operations over HTTP.
#[derive(Clone)]
pub struct QdrantStore {
    client: Client,
    base_url: String,
}

impl QdrantStore {
    /// Builds a new Qdrant client.
    ///
    /// # Arguments
    /// * `url` - REST root, e.g. `http://localhost:6333` or a Qdrant Cloud cluster URL
    /// * `api_key` - Value for the `api-key` header; local instances usually need none
    pub fn new(url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(url.trim()).with_context(|| format!("invalid Qdrant URL {url:?}"))?;
        anyhow::ensure!(
            matches!(parsed.scheme(), "http" | "https"),
            "Qdrant URL must be an http(s) URL"
        );

        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(key) = api_key.as_deref().map(str::trim).filter(|key| !key.is_empty()) {
            headers.insert(
                "api-key",
                HeaderValue::from_str(key).context("invalid Qdrant API key")?,
            );
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build Qdrant HTTP client")?;
        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// REST root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: &CollectionName) -> String {
        format!("{}/collections/{}", self.base_url, collection.as_str())
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder, action: &str) -> Result<T> {
        let resp = request
            .send()
            .with_context(|| format!("Qdrant {action} request failed"))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            anyhow::bail!("Qdrant {} failed ({}): {}", action, status, body);
        }
        let envelope: Envelope<T> = resp
            .json()
            .with_context(|| format!("failed to parse Qdrant {action} response"))?;
        debug!(action, time = envelope.time, "qdrant request complete");
        Ok(envelope.result)
    }
}

impl VectorStore for QdrantStore {
    fn collection_exists(&self, collection: &CollectionName) -> Result<bool> {
        let url = format!("{}/collections", self.base_url);
        let listing: CollectionsListing = self.send(self.client.get(url), "list collections")?;
        Ok(listing.contains(collection))
    }

    fn delete_collection(&self, collection: &CollectionName) -> Result<()> {
        let _: Value = self.send(
            self.client.delete(self.collection_url(collection)),
            "delete collection",
        )?;
        Ok(())
    }

    fn create_collection(
        &self,
        collection: &CollectionName,
        dimension: usize,
        distance: Distance,
    ) -> Result<()> {
        let request = CreateCollection {
            vectors: VectorParams {
                size: dimension,
                distance,
            },
        };
        let _: Value = self.send(
            self.client.put(self.collection_url(collection)).json(&request),
            "create collection",
        )?;
        Ok(())
    }

    fn upsert_points(&self, collection: &CollectionName, points: &[VectorPoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }
        let url = format!("{}/points?wait=true", self.collection_url(collection));
        let _: Value = self.send(
            self.client.put(url).json(&UpsertPoints { points }),
            "upsert points",
        )?;
        Ok(())
    }
}

impl SearchStore for QdrantStore {
    fn search(
        &self,
        collection: &CollectionName,
        vector: &[f32],
        limit: usize,
        filter: Option<&PayloadMatch>,
    ) -> Result<Vec<ScoredPoint>> {
        let request = SearchRequest {
            vector,
            limit: limit.max(1),
            with_payload: true,
            filter: filter.map(Filter::must_match),
        };
        let url = format!("{}/points/search", self.collection_url(collection));
        let hits: Vec<SearchHit> = self.send(
            self.client.post(url).json(&request),
            "search points",
        )?;
        Ok(hits.into_iter().map(SearchHit::into_scored).collect())
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: T,
    #[serde(default)]
    time: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CollectionsListing {
    #[serde(default)]
    collections: Vec<CollectionDescription>,
}

impl CollectionsListing {
    fn contains(&self, collection: &CollectionName) -> bool {
        self.collections
            .iter()
            .any(|entry| entry.name == collection.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct CollectionDescription {
    name: String,
}

#[derive(Serialize)]
struct CreateCollection {
    vectors: VectorParams,
}

#[derive(Serialize)]
struct VectorParams {
    size: usize,
    distance: Distance,
}

#[derive(Serialize)]
struct UpsertPoints<'a> {
    points: &'a [VectorPoint],
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Filter>,
}

#[derive(Serialize)]
struct Filter {
    must: Vec<FieldCondition>,
}

impl Filter {
    fn must_match(condition: &PayloadMatch) -> Self {
        Self {
            must: vec![FieldCondition {
                key: condition.key.clone(),
                r#match: MatchValue {
                    value: condition.value.clone(),
                },
            }],
        }
    }
}

#[derive(Serialize)]
struct FieldCondition {
    key: String,
    r#match: MatchValue,
}

#[derive(Serialize)]
struct MatchValue {
    value: String,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: u64,
    score: f32,
    #[serde(default)]
    payload: Option<Map<String, Value>>,
}

impl SearchHit {
    fn into_scored(self) -> ScoredPoint {
        let payload = self
            .payload
            .as_ref()
            .map(OrganizationPayload::from_json_map)
            .unwrap_or_default();
        ScoredPoint {
            id: self.id,
            score: self.score,
            payload,
        }
    }
}
