//! Google Generative Language (Gemini) embedding client.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use url::Url;

use super::EmbeddingProvider;

/// Public Generative Language API root.
pub const DEFAULT_GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Embedding model used for both ingestion and queries.
pub const DEFAULT_GEMINI_MODEL: &str = "text-embedding-004";

/// Vector length produced by `text-embedding-004`.
pub const DEFAULT_GEMINI_DIMENSION: usize = 768;

/// How the embedded text will be used; documents and queries are embedded asymmetrically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Text stored in the collection.
    RetrievalDocument,
    /// Text used to search the collection.
    RetrievalQuery,
}

/// Blocking embeddings client for the `embedContent` endpoint.
#[derive(Clone)]
pub struct GeminiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    task_type: TaskType,
}

impl GeminiEmbedder {
    /// Builds a new Gemini embeddings client.
    ///
    /// # Arguments
    /// * `api_key` - Value for the `x-goog-api-key` header (usually from `GOOGLE_API_KEY`)
    /// * `base_url` - API root, e.g. `https://generativelanguage.googleapis.com/v1beta`
    /// * `model` - Model identifier with or without the `models/` prefix
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        task_type: TaskType,
        timeout: Duration,
    ) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing Google API key");
        anyhow::ensure!(!model.trim().is_empty(), "missing embedding model name");
        let base = Url::parse(base_url.trim())
            .with_context(|| format!("invalid Gemini base URL {base_url:?}"))?;
        anyhow::ensure!(
            matches!(base.scheme(), "http" | "https"),
            "Gemini base URL must be an http(s) URL"
        );

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key.trim()).context("invalid Google API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build Gemini HTTP client")?;

        let model = qualified_model(&model);
        let endpoint = format!(
            "{}/{}:embedContent",
            base.as_str().trim_end_matches('/'),
            model
        );
        Ok(Self {
            client,
            endpoint,
            model,
            task_type,
        })
    }

    /// Fully-qualified model name (`models/...`).
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Endpoint the client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Task type sent with every request.
    pub fn task_type(&self) -> TaskType {
        self.task_type
    }
}

impl EmbeddingProvider for GeminiEmbedder {
    fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedContentRequest::new(&self.model, text, self.task_type);
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .context("Gemini embedding request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            anyhow::bail!("Gemini embedding request failed ({}): {}", status, body);
        }
        let parsed: EmbedContentResponse = resp
            .json()
            .context("failed to parse Gemini embedding response")?;
        parsed.into_values()
    }
}

fn qualified_model(model: &str) -> String {
    let model = model.trim();
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: TaskType,
}

impl<'a> EmbedContentRequest<'a> {
    fn new(model: &'a str, text: &'a str, task_type: TaskType) -> Self {
        Self {
            model,
            content: Content {
                parts: [Part { text }],
            },
            task_type,
        }
    }
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Option<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

impl EmbedContentResponse {
    fn into_values(self) -> Result<Vec<f32>> {
        let values = self
            .embedding
            .map(|embedding| embedding.values)
            .unwrap_or_default();
        anyhow::ensure!(!values.is_empty(), "Gemini response missing embedding values");
        Ok(values)
    }
}
