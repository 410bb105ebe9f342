//! Client for a llama.cpp server speaking its native completion API

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::{GenerationClient, GenerationError, SamplingConfig};
use crate::index::{IndexError, TextEmbedder};

const COMPLETION_PATH: &str = "/completion";
const EMBEDDING_PATH: &str = "/embedding";

/// Client for the local generation engine. One instance serves both
/// completions and embeddings; the server answers both from the same port.
pub struct LlamaServerClient {
    client: Client,
    base_url: Url,
}

impl LlamaServerClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Completion calls against a CPU-bound engine can run for minutes, so
    /// the timeout comes from configuration rather than reqwest's default.
    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, GenerationError> {
        self.base_url
            .join(path)
            .map_err(|e| GenerationError::InvalidUrl(format!("{}: {}", self.base_url, e)))
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    stop: &'a [String],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[async_trait]
impl GenerationClient for LlamaServerClient {
    async fn generate(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, GenerationError> {
        let endpoint = self.endpoint(COMPLETION_PATH)?;

        tracing::debug!(
            prompt_chars = prompt.len(),
            max_tokens = sampling.max_tokens,
            temperature = sampling.temperature,
            "Requesting completion"
        );

        let request = CompletionRequest {
            prompt,
            n_predict: sampling.max_tokens,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            repeat_penalty: sampling.repeat_penalty,
            stop: &sampling.stop,
            stream: false,
        };

        let response = self.client.post(endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::StatusError {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::ParseError(e.to_string()))?;

        Ok(completion.content)
    }
}

#[async_trait]
impl TextEmbedder for LlamaServerClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, IndexError> {
        let endpoint = self
            .endpoint(EMBEDDING_PATH)
            .map_err(|e| IndexError::Embedding(e.to_string()))?;

        let response = self
            .client
            .post(endpoint)
            .json(&EmbeddingRequest { content: text })
            .send()
            .await
            .map_err(|e| IndexError::Embedding(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::Embedding(format!("engine returned HTTP {status}")));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Embedding(e.to_string()))?;

        if parsed.embedding.is_empty() {
            return Err(IndexError::Embedding("engine returned an empty vector".to_string()));
        }

        Ok(parsed.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_wire_format() {
        let stop = vec!["SUMMARY".to_string()];
        let request = CompletionRequest {
            prompt: "Draft a title.",
            n_predict: 40,
            temperature: 0.5,
            top_p: 0.9,
            repeat_penalty: 1.1,
            stop: &stop,
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["prompt"], "Draft a title.");
        assert_eq!(json["n_predict"], 40);
        assert_eq!(json["stop"][0], "SUMMARY");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_empty_stop_list_is_omitted() {
        let request = CompletionRequest {
            prompt: "p",
            n_predict: 10,
            temperature: 0.5,
            top_p: 0.9,
            repeat_penalty: 1.1,
            stop: &[],
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("stop").is_none());
    }

    #[test]
    fn test_endpoint_joins_against_base() {
        let client = LlamaServerClient::new(Url::parse("http://127.0.0.1:8080").unwrap());
        let endpoint = client.endpoint(COMPLETION_PATH).unwrap();
        assert_eq!(endpoint.as_str(), "http://127.0.0.1:8080/completion");
    }
}
