use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityGrade::Poor => "POOR",
            QualityGrade::Fair => "FAIR",
            QualityGrade::Good => "GOOD",
            QualityGrade::Excellent => "EXCELLENT",
        }
    }

    /// Fraction of the rubric weight this grade earns.
    pub fn factor(&self) -> f64 {
        match self {
            QualityGrade::Poor => 0.3,
            QualityGrade::Fair => 0.6,
            QualityGrade::Good => 0.85,
            QualityGrade::Excellent => 1.0,
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The five review rubrics, each weighted by its share of the 100-point
/// filing-readiness scorecard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rubric {
    TitleAbstract,
    Claims,
    Background,
    Summary,
    Consistency,
}

impl Rubric {
    pub const ALL: [Rubric; 5] = [
        Rubric::TitleAbstract,
        Rubric::Claims,
        Rubric::Background,
        Rubric::Summary,
        Rubric::Consistency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rubric::TitleAbstract => "title_abstract",
            Rubric::Claims => "claims",
            Rubric::Background => "background",
            Rubric::Summary => "summary",
            Rubric::Consistency => "consistency",
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            Rubric::TitleAbstract => 25.0,
            Rubric::Claims => 30.0,
            Rubric::Background => 20.0,
            Rubric::Summary => 15.0,
            Rubric::Consistency => 10.0,
        }
    }
}

impl fmt::Display for Rubric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one rubric review
/// - passed: whether the section clears the rubric's hard checks
/// - observations: one line per check, with measured values
/// - issues: short defect statements for the synthesis pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewFindings {
    pub rubric: Rubric,
    pub grade: QualityGrade,
    pub passed: bool,
    pub observations: Vec<String>,
    pub issues: Vec<String>,
}

/// Per-rubric score out of its weight, as printed in the final report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RubricScore {
    pub rubric: Rubric,
    pub score: f64,
    pub out_of: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scorecard {
    pub scores: Vec<RubricScore>,
    pub overall: f64,
    pub filing_ready: bool,
    /// Remediation steps ordered by rubric weight, heaviest first.
    pub actions: Vec<String>,
}

impl Scorecard {
    pub fn score_for(&self, rubric: Rubric) -> Option<f64> {
        self.scores
            .iter()
            .find(|entry| entry.rubric == rubric)
            .map(|entry| entry.score)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub findings: Vec<ReviewFindings>,
    pub scorecard: Scorecard,
    pub generated_at: DateTime<Utc>,
}

impl VerificationReport {
    pub fn findings_for(&self, rubric: Rubric) -> Option<&ReviewFindings> {
        self.findings.iter().find(|entry| entry.rubric == rubric)
    }
}
