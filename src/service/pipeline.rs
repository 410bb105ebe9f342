//! Section drafting service
//!
//! Owns the generation engine and the optional prior-art index, checks
//! request context before any engine call, and runs the retry loop. Also
//! drafts whole applications by walking the sections in dependency order.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};

use super::retry::run_attempts;
use crate::engine::GenerationClient;
use crate::index::{PriorArtHit, PriorArtIndex};
use crate::model::{
    InventionDescription, RetryConfig, SectionKind, SectionRequest, SectionResult,
};

/// Sections in the order they can be drafted: claims precede the detailed
/// description, which narrates them, even though the finished document
/// prints claims last.
pub const GENERATION_ORDER: [SectionKind; 8] = [
    SectionKind::Title,
    SectionKind::FieldOfInvention,
    SectionKind::Background,
    SectionKind::Objects,
    SectionKind::Summary,
    SectionKind::Claims,
    SectionKind::BriefDescriptionOfDrawings,
    SectionKind::DetailedDescription,
];

/// Component keywords that usually earn their own figure.
const FIGURE_COMPONENT_KEYWORDS: &[&str] = &[
    "sensor", "controller", "module", "assembly", "housing", "circuit", "valve", "pump",
    "display", "antenna", "battery", "motor", "probe",
];

/// Language suggesting a method flowchart figure.
const FIGURE_METHOD_KEYWORDS: &[&str] = &["method", "process", "steps", "algorithm", "schedule"];

static FIGURE_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bfig(?:ure)?\.?\s*(\d+)").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("cannot draft {kind}: missing required context: {}", missing.join(", "))]
    MissingContext {
        kind: SectionKind,
        missing: Vec<String>,
    },
}

/// Drafting service with its collaborators injected.
pub struct DraftingService {
    engine: Arc<dyn GenerationClient>,
    prior_art: Option<Arc<dyn PriorArtIndex>>,
    retry: RetryConfig,
    top_k: usize,
}

impl DraftingService {
    pub fn new(engine: Arc<dyn GenerationClient>) -> Self {
        Self {
            engine,
            prior_art: None,
            retry: RetryConfig::default(),
            top_k: 3,
        }
    }

    /// Ground claim drafting in the nearest prior-art excerpts.
    pub fn with_prior_art(mut self, index: Arc<dyn PriorArtIndex>, top_k: usize) -> Self {
        self.prior_art = Some(index);
        self.top_k = top_k;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Draft one section. Fails fast, before any engine call, when the
    /// request lacks context the section depends on.
    pub async fn draft(&self, request: &SectionRequest) -> Result<SectionResult, DraftError> {
        check_context(request)?;

        let prior_art = self.retrieve_prior_art(request).await;
        let figure_count = request
            .figure_count
            .unwrap_or_else(|| estimate_figure_count(request.description.as_str()));

        tracing::info!(section = %request.kind, "Drafting section");
        Ok(run_attempts(
            self.engine.as_ref(),
            request,
            &prior_art,
            figure_count,
            &self.retry,
        )
        .await)
    }

    /// Draft a complete application in dependency order, threading each
    /// accepted section into the requests that follow it. Without a drawing
    /// summary the two drawing-bound sections are skipped; when the summary
    /// names its figures, that count overrides the description-based estimate.
    pub async fn draft_document(
        &self,
        description: impl Into<InventionDescription>,
        drawing_summary: Option<&str>,
    ) -> Result<DocumentDraft, DraftError> {
        let description = description.into();
        let summary_figures = drawing_summary.and_then(count_summary_figures);
        let mut sections: Vec<SectionResult> = Vec::new();

        for kind in GENERATION_ORDER {
            if kind.needs_drawing_context() && drawing_summary.is_none() {
                tracing::warn!(section = %kind, "Skipping section, no drawing summary provided");
                continue;
            }

            let mut request = SectionRequest::new(kind, description.clone());
            if let Some(summary) = drawing_summary {
                request = request.with_drawing_summary(summary);
            }
            if let Some(count) = summary_figures {
                request = request.with_figure_count(count);
            }
            for drafted in &sections {
                request = request.with_context(drafted.clone());
            }

            let result = self.draft(&request).await?;
            if !result.is_valid() {
                tracing::warn!(
                    section = %kind,
                    issues = result.verdict.issues.len(),
                    "Keeping best-effort draft with outstanding issues"
                );
            }
            sections.push(result);
        }

        Ok(DocumentDraft { sections })
    }

    async fn retrieve_prior_art(&self, request: &SectionRequest) -> Vec<PriorArtHit> {
        if request.kind != SectionKind::Claims {
            return vec![];
        }
        let Some(index) = &self.prior_art else {
            return vec![];
        };

        match index.search(request.description.as_str(), self.top_k).await {
            Ok(hits) => {
                tracing::debug!(hits = hits.len(), "Retrieved prior art for claims");
                hits
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prior-art search failed, drafting claims without it");
                vec![]
            }
        }
    }
}

fn check_context(request: &SectionRequest) -> Result<(), DraftError> {
    let mut missing = Vec::new();

    for kind in request.kind.required_context() {
        if !request.context.contains_key(kind) {
            missing.push(format!("{kind} section"));
        }
    }
    if request.kind.needs_drawing_context() && request.drawing_context().is_none() {
        missing.push("drawing summary".to_string());
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DraftError::MissingContext {
            kind: request.kind,
            missing,
        })
    }
}

/// Guess how many figures the application needs from the description: one
/// overview, one per named component, one flowchart when a method is implied.
pub fn estimate_figure_count(description: &str) -> usize {
    let lower = description.to_lowercase();
    let components = FIGURE_COMPONENT_KEYWORDS
        .iter()
        .filter(|keyword| lower.contains(**keyword))
        .count()
        .min(4);
    let method = FIGURE_METHOD_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(*keyword)) as usize;

    (1 + components + method).clamp(1, 6)
}

/// Highest figure number the drawing summary mentions, if it mentions any.
fn count_summary_figures(summary: &str) -> Option<usize> {
    FIGURE_MENTION
        .captures_iter(summary)
        .filter_map(|captures| captures.get(1)?.as_str().parse().ok())
        .max()
}

/// All drafted sections of one application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDraft {
    pub sections: Vec<SectionResult>,
}

impl DocumentDraft {
    pub fn section(&self, kind: SectionKind) -> Option<&SectionResult> {
        self.sections.iter().find(|section| section.kind == kind)
    }

    /// Render the application in document order with canonical headings.
    pub fn assemble(&self) -> String {
        let mut document = String::new();
        for kind in SectionKind::ALL {
            if let Some(section) = self.section(kind) {
                document.push_str(kind.heading());
                document.push_str("\n\n");
                document.push_str(&section.text);
                document.push_str("\n\n");
            }
        }
        document.trim_end().to_string()
    }
}
