//! Clients for the local text-generation engine

mod llama_server;

use async_trait::async_trait;

use crate::model::SectionKind;

pub use llama_server::LlamaServerClient;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Engine returned HTTP {status}: {body}")]
    StatusError { status: u16, body: String },

    #[error("Failed to parse engine response: {0}")]
    ParseError(String),

    #[error("Invalid engine URL: {0}")]
    InvalidUrl(String),
}

/// Decoding parameters for one generation call
/// - stop: decoding halts before any of these strings
/// - echo_prefix: literal tail of the prompt, re-prepended to the completion
///   so the normalized text starts in the expected grammatical form
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
    pub stop: Vec<String>,
    pub echo_prefix: Option<String>,
}

impl SamplingConfig {
    /// Tuned decoding profile for a section. Factual boilerplate sections run
    /// cold, narrative sections run warmer.
    pub fn for_section(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Title => SamplingConfig {
                max_tokens: 40,
                temperature: 0.5,
                top_p: 0.9,
                repeat_penalty: 1.1,
                stop: vec!["\n".to_string()],
                echo_prefix: None,
            },
            SectionKind::FieldOfInvention => SamplingConfig {
                max_tokens: 250,
                temperature: 0.5,
                top_p: 0.9,
                repeat_penalty: 1.1,
                stop: vec![],
                echo_prefix: Some("The present invention relates".to_string()),
            },
            SectionKind::Background => SamplingConfig {
                max_tokens: 300,
                temperature: 0.6,
                top_p: 0.9,
                repeat_penalty: 1.1,
                stop: vec![],
                echo_prefix: Some("Conventional approaches".to_string()),
            },
            // Runs cold with aggressive stops: this section is the most prone
            // to drifting into neighboring headings and repeated bullets.
            SectionKind::Objects => SamplingConfig {
                max_tokens: 600,
                temperature: 0.3,
                top_p: 0.9,
                repeat_penalty: 1.15,
                stop: vec![
                    "BRIEF DESCRIPTION".to_string(),
                    "SUMMARY".to_string(),
                    "BACKGROUND".to_string(),
                    "DETAILED".to_string(),
                    "\n\n\n\n".to_string(),
                ],
                echo_prefix: Some(
                    "The primary object of the present invention is to provide".to_string(),
                ),
            },
            SectionKind::Summary => SamplingConfig {
                max_tokens: 200,
                temperature: 0.7,
                top_p: 0.9,
                repeat_penalty: 1.1,
                stop: vec![],
                echo_prefix: Some("The present invention provides".to_string()),
            },
            SectionKind::BriefDescriptionOfDrawings => SamplingConfig {
                max_tokens: 300,
                temperature: 0.6,
                top_p: 0.9,
                repeat_penalty: 1.1,
                stop: vec!["DETAILED DESCRIPTION".to_string()],
                echo_prefix: Some("Figure 1: illustrates".to_string()),
            },
            SectionKind::DetailedDescription => SamplingConfig {
                max_tokens: 600,
                temperature: 0.7,
                top_p: 0.9,
                repeat_penalty: 1.1,
                stop: vec!["CLAIMS".to_string()],
                echo_prefix: Some(
                    "Referring to the drawings, the present invention".to_string(),
                ),
            },
            SectionKind::Claims => SamplingConfig {
                max_tokens: 512,
                temperature: 0.7,
                top_p: 0.9,
                repeat_penalty: 1.1,
                stop: vec![],
                echo_prefix: Some("1. ".to_string()),
            },
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Trait for text-generation backends
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Produce a completion for the prompt. Returns only the newly generated
    /// text; the caller restores the echo prefix.
    async fn generate(
        &self,
        prompt: &str,
        sampling: &SamplingConfig,
    ) -> Result<String, GenerationError>;
}
