//! CPC code assignment for invention descriptions
//!
//! Every Cooperative Patent Classification label is embedded once when the
//! classifier is built; classifying a description is then one embedding
//! call and a cosine scan over the label vectors.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::index::{self, IndexError, TextEmbedder};

/// One classification code with the descriptive text it is embedded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpcLabel {
    pub code: String,
    pub description: String,
}

/// The label a description was assigned, with its cosine similarity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpcPrediction {
    pub code: String,
    pub description: String,
    pub score: f32,
}

pub struct CpcClassifier {
    embedder: Arc<dyn TextEmbedder>,
    entries: Vec<(CpcLabel, Vec<f32>)>,
}

impl CpcClassifier {
    /// Embed the label set up front. Labels whose embedding comes back
    /// empty are dropped with a warning rather than failing the build.
    pub async fn build(
        embedder: Arc<dyn TextEmbedder>,
        labels: Vec<CpcLabel>,
    ) -> Result<Self, IndexError> {
        let mut entries = Vec::with_capacity(labels.len());
        for label in labels {
            let mut embedding = embedder.embed(&label.description).await?;
            if embedding.is_empty() {
                tracing::warn!(code = %label.code, "Label embedded to an empty vector, dropping");
                continue;
            }
            index::normalize(&mut embedding);
            entries.push((label, embedding));
        }

        tracing::info!(labels = entries.len(), "CPC classifier ready");
        Ok(Self { embedder, entries })
    }

    /// Build from a JSON array of `{code, description}` labels.
    pub async fn load(embedder: Arc<dyn TextEmbedder>, path: &Path) -> Result<Self, IndexError> {
        let contents = fs::read_to_string(path).map_err(|e| IndexError::Corpus {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let labels: Vec<CpcLabel> =
            serde_json::from_str(&contents).map_err(|e| IndexError::Corpus {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        Self::build(embedder, labels).await
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The nearest label to the description, or None for an empty label set.
    pub async fn classify(&self, description: &str) -> Result<Option<CpcPrediction>, IndexError> {
        if self.entries.is_empty() {
            return Ok(None);
        }

        let mut query = self.embedder.embed(description).await?;
        index::normalize(&mut query);

        let best = self
            .entries
            .iter()
            .filter(|(_, embedding)| embedding.len() == query.len())
            .map(|(label, embedding)| (label, index::dot(embedding, &query)))
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Ok(best.map(|(label, score)| {
            tracing::debug!(code = %label.code, score, "Classified description");
            CpcPrediction {
                code: label.code.clone(),
                description: label.description.clone(),
                score,
            }
        }))
    }
}
