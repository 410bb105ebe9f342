use serde::{Deserialize, Serialize};
use std::fmt;

/// Weight of one hard issue in the attempt score.
pub const ISSUE_WEIGHT: f32 = 1.0;
/// Weight of one soft warning in the attempt score.
pub const WARNING_WEIGHT: f32 = 0.2;

/// Identifies which drafting rule produced an issue or warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    RequiredPhrase,
    BannedPhrase,
    WordCount,
    ParagraphCount,
    MarkerSequence,
    TerminalStatement,
    ClaimStructure,
    TitleForm,
    ObjectCount,
    MissingDetail,
    GenerationFailed,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::RequiredPhrase => "required_phrase",
            RuleId::BannedPhrase => "banned_phrase",
            RuleId::WordCount => "word_count",
            RuleId::ParagraphCount => "paragraph_count",
            RuleId::MarkerSequence => "marker_sequence",
            RuleId::TerminalStatement => "terminal_statement",
            RuleId::ClaimStructure => "claim_structure",
            RuleId::TitleForm => "title_form",
            RuleId::ObjectCount => "object_count",
            RuleId::MissingDetail => "missing_detail",
            RuleId::GenerationFailed => "generation_failed",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A hard rule violation. Any issue makes the attempt invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub rule: RuleId,
    pub message: String,
}

/// A soft quality flag. Warnings lower the attempt score but never block it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub rule: RuleId,
    pub message: String,
}

/// Surface counts measured on the normalized text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCounts {
    pub words: usize,
    pub paragraphs: usize,
    pub markers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub issues: Vec<Issue>,
    pub warnings: Vec<Warning>,
    pub counts: TextCounts,
}

impl ValidationVerdict {
    pub fn clean() -> Self {
        ValidationVerdict {
            issues: Vec::new(),
            warnings: Vec::new(),
            counts: TextCounts::default(),
        }
    }

    pub fn with_counts(counts: TextCounts) -> Self {
        ValidationVerdict {
            issues: Vec::new(),
            warnings: Vec::new(),
            counts,
        }
    }

    pub fn add_issue(&mut self, rule: RuleId, message: impl Into<String>) {
        self.issues.push(Issue {
            rule,
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, rule: RuleId, message: impl Into<String>) {
        self.warnings.push(Warning {
            rule,
            message: message.into(),
        });
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Lower is better. Issues dominate warnings by a factor of five.
    pub fn score(&self) -> f32 {
        ISSUE_WEIGHT * self.issues.len() as f32 + WARNING_WEIGHT * self.warnings.len() as f32
    }

    /// Verdict for a section whose every generation round errored out.
    pub fn generation_failure(message: impl Into<String>) -> Self {
        let mut verdict = ValidationVerdict::clean();
        verdict.add_issue(RuleId::GenerationFailed, message);
        verdict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_verdict_is_valid_with_zero_score() {
        let verdict = ValidationVerdict::clean();
        assert!(verdict.is_valid());
        assert_eq!(verdict.score(), 0.0);
    }

    #[test]
    fn test_issue_invalidates_and_outweighs_warnings() {
        let mut with_issue = ValidationVerdict::clean();
        with_issue.add_issue(RuleId::WordCount, "too short");

        let mut with_warnings = ValidationVerdict::clean();
        for _ in 0..4 {
            with_warnings.add_warning(RuleId::MissingDetail, "no figures referenced");
        }

        assert!(!with_issue.is_valid());
        assert!(with_warnings.is_valid());
        assert!(with_issue.score() > with_warnings.score());
    }

    #[test]
    fn test_score_is_weighted_sum() {
        let mut verdict = ValidationVerdict::clean();
        verdict.add_issue(RuleId::BannedPhrase, "marketing language");
        verdict.add_warning(RuleId::MissingDetail, "no quantitative data");
        verdict.add_warning(RuleId::ParagraphCount, "single paragraph");
        assert!((verdict.score() - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_generation_failure_carries_single_issue() {
        let verdict = ValidationVerdict::generation_failure("engine unreachable");
        assert_eq!(verdict.issues.len(), 1);
        assert_eq!(verdict.issues[0].rule, RuleId::GenerationFailed);
        assert!(verdict.warnings.is_empty());
        assert!(!verdict.is_valid());
    }
}
