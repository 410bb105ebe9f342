//! In-memory prior-art retrieval over embedding vectors

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Failed to load corpus from {path}: {reason}")]
    Corpus { path: String, reason: String },
}

/// Trait for embedding backends
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, IndexError>;
}

/// One scored prior-art excerpt returned from a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorArtHit {
    pub excerpt: String,
    pub score: f32,
}

/// Trait for prior-art lookup used to ground claim drafting
#[async_trait]
pub trait PriorArtIndex: Send + Sync {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<PriorArtHit>, IndexError>;
}

/// A corpus document with its precomputed embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub text: String,
    pub embedding: Vec<f32>,
}

/// Holds the whole corpus in memory. Entries are unit-normalized once at
/// construction so a search is one embedding call plus dot products.
pub struct InMemoryPriorArtIndex {
    embedder: Arc<dyn TextEmbedder>,
    entries: Vec<CorpusEntry>,
}

impl InMemoryPriorArtIndex {
    pub fn new(embedder: Arc<dyn TextEmbedder>, mut entries: Vec<CorpusEntry>) -> Self {
        for entry in &mut entries {
            normalize(&mut entry.embedding);
        }
        Self { embedder, entries }
    }

    /// Load a JSON array of `{text, embedding}` documents.
    pub fn load(embedder: Arc<dyn TextEmbedder>, path: &Path) -> Result<Self, IndexError> {
        let contents = fs::read_to_string(path).map_err(|e| IndexError::Corpus {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let entries: Vec<CorpusEntry> =
            serde_json::from_str(&contents).map_err(|e| IndexError::Corpus {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(path = %path.display(), documents = entries.len(), "Loaded prior-art corpus");
        Ok(Self::new(embedder, entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PriorArtIndex for InMemoryPriorArtIndex {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<PriorArtHit>, IndexError> {
        if self.entries.is_empty() || top_k == 0 {
            return Ok(vec![]);
        }

        let mut query_embedding = self.embedder.embed(query).await?;
        normalize(&mut query_embedding);

        let mut hits: Vec<PriorArtHit> = self
            .entries
            .iter()
            .filter(|entry| entry.embedding.len() == query_embedding.len())
            .map(|entry| PriorArtHit {
                excerpt: entry.text.clone(),
                score: dot(&entry.embedding, &query_embedding),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(top_k);
        Ok(hits)
    }
}

/// Dot product of two unit vectors, i.e. their cosine similarity.
pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub(crate) fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
