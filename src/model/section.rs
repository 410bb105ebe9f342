use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::model::verdict::ValidationVerdict;

/// The eight drafting targets of a US utility application, in the order
/// they appear in the finished document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Title,
    FieldOfInvention,
    Background,
    Objects,
    Summary,
    BriefDescriptionOfDrawings,
    DetailedDescription,
    Claims,
}

impl SectionKind {
    pub const ALL: [SectionKind; 8] = [
        SectionKind::Title,
        SectionKind::FieldOfInvention,
        SectionKind::Background,
        SectionKind::Objects,
        SectionKind::Summary,
        SectionKind::BriefDescriptionOfDrawings,
        SectionKind::DetailedDescription,
        SectionKind::Claims,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Title => "title",
            SectionKind::FieldOfInvention => "field_of_invention",
            SectionKind::Background => "background",
            SectionKind::Objects => "objects",
            SectionKind::Summary => "summary",
            SectionKind::BriefDescriptionOfDrawings => "brief_description_of_drawings",
            SectionKind::DetailedDescription => "detailed_description",
            SectionKind::Claims => "claims",
        }
    }

    /// Canonical document heading, as printed in the assembled application.
    pub fn heading(&self) -> &'static str {
        match self {
            SectionKind::Title => "TITLE OF THE INVENTION",
            SectionKind::FieldOfInvention => "FIELD OF THE INVENTION",
            SectionKind::Background => "BACKGROUND OF THE INVENTION",
            SectionKind::Objects => "OBJECTS OF THE INVENTION",
            SectionKind::Summary => "SUMMARY OF THE INVENTION",
            SectionKind::BriefDescriptionOfDrawings => "BRIEF DESCRIPTION OF THE DRAWINGS",
            SectionKind::DetailedDescription => "DETAILED DESCRIPTION OF THE INVENTION",
            SectionKind::Claims => "CLAIMS",
        }
    }

    /// Upstream sections that must already be drafted before this one.
    pub fn required_context(&self) -> &'static [SectionKind] {
        match self {
            SectionKind::DetailedDescription => &[SectionKind::Claims],
            _ => &[],
        }
    }

    /// Whether the section narrative depends on a description of the figures.
    pub fn needs_drawing_context(&self) -> bool {
        matches!(
            self,
            SectionKind::BriefDescriptionOfDrawings | SectionKind::DetailedDescription
        )
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inventor-supplied abstract of the invention. Every prompt is grounded
/// in this text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventionDescription(String);

impl InventionDescription {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for InventionDescription {
    fn from(value: String) -> Self {
        InventionDescription(value)
    }
}

impl From<&str> for InventionDescription {
    fn from(value: &str) -> Self {
        InventionDescription(value.to_string())
    }
}

impl fmt::Display for InventionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a single drafting run needs as input
/// - kind: which section to draft
/// - description: the inventor's abstract
/// - context: previously accepted sections, keyed by kind
/// - drawing_summary: inventor's one-line-per-figure sketch of the drawings
/// - figure_count: fixed figure count; estimated from the description when absent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRequest {
    pub kind: SectionKind,
    pub description: InventionDescription,
    #[serde(default)]
    pub context: HashMap<SectionKind, SectionResult>,
    #[serde(default)]
    pub drawing_summary: Option<String>,
    #[serde(default)]
    pub figure_count: Option<usize>,
}

impl SectionRequest {
    pub fn new(kind: SectionKind, description: impl Into<InventionDescription>) -> Self {
        SectionRequest {
            kind,
            description: description.into(),
            context: HashMap::new(),
            drawing_summary: None,
            figure_count: None,
        }
    }

    /// Attaches an already drafted section as context, keyed by its kind.
    pub fn with_context(mut self, result: SectionResult) -> Self {
        self.context.insert(result.kind, result);
        self
    }

    pub fn with_drawing_summary(mut self, summary: impl Into<String>) -> Self {
        self.drawing_summary = Some(summary.into());
        self
    }

    pub fn with_figure_count(mut self, count: usize) -> Self {
        self.figure_count = Some(count);
        self
    }

    pub fn context_text(&self, kind: SectionKind) -> Option<&str> {
        self.context.get(&kind).map(|result| result.text.as_str())
    }

    /// The figure narrative available to this request: an explicit summary
    /// wins over an already drafted drawings section.
    pub fn drawing_context(&self) -> Option<&str> {
        self.drawing_summary
            .as_deref()
            .or_else(|| self.context_text(SectionKind::BriefDescriptionOfDrawings))
    }
}

/// One completed generation round, kept only until a better one displaces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationAttempt {
    pub index: u32,
    pub raw: String,
    pub normalized: String,
    pub verdict: ValidationVerdict,
    pub score: f32,
}

/// The accepted (or best surviving) draft for one section
/// - text: normalized section text; empty only when no attempt produced any
/// - verdict: validation outcome of the winning attempt
/// - attempts_used: rounds consumed before acceptance or exhaustion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionResult {
    pub kind: SectionKind,
    pub text: String,
    pub verdict: ValidationVerdict,
    pub attempts_used: u32,
    pub drafted_at: DateTime<Utc>,
}

impl SectionResult {
    pub fn score(&self) -> f32 {
        self.verdict.score()
    }

    pub fn is_valid(&self) -> bool {
        self.verdict.is_valid()
    }
}
