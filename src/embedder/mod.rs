//! Embedding providers and the guard rails applied before calling them.

use anyhow::Result;
use tracing::debug;

pub mod gemini;

/// Longest input, in characters, submitted to a provider.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 8000;

/// Something that turns text into a fixed-length vector.
pub trait EmbeddingProvider {
    /// Embeds a single, non-empty text.
    fn embed_text(&self, text: &str) -> Result<Vec<f32>>;
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for &P {
    fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed_text(text)
    }
}

/// Wraps a provider with zero-vector short-circuiting, truncation and a dimension check.
pub struct TextEmbedder<P> {
    provider: P,
    dimension: usize,
    max_input_chars: usize,
}

impl<P: EmbeddingProvider> TextEmbedder<P> {
    /// Creates a wrapper producing vectors of `dimension` floats.
    pub fn new(provider: P, dimension: usize, max_input_chars: usize) -> Result<Self> {
        anyhow::ensure!(dimension > 0, "embedding dimension must be positive");
        anyhow::ensure!(max_input_chars > 0, "max input length must be positive");
        Ok(Self {
            provider,
            dimension,
            max_input_chars,
        })
    }

    /// Vector length produced by this embedder.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Embeds `text`; blank text yields a zero vector without calling the provider.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }
        let input = truncate_chars(text, self.max_input_chars);
        debug!(chars = input.chars().count(), "requesting embedding");
        let vector = self.provider.embed_text(input)?;
        anyhow::ensure!(
            vector.len() == self.dimension,
            "provider returned {} dimensions, expected {}",
            vector.len(),
            self.dimension
        );
        Ok(vector)
    }

    /// Embeds each text in order, one provider call per non-blank text.
    pub fn embed_all<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text.as_ref())).collect()
    }
}

/// Cuts `text` to at most `max_chars` characters without splitting one.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
