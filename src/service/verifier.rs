//! Cross-section verification of a drafted application
//!
//! Five pure review passes, one per rubric, each scoped to the text it
//! judges. A synthesis pass folds the findings into a weighted scorecard
//! and a prioritized action list. Nothing here calls the engine; a review
//! that cannot run is scored zero rather than aborting the report.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::pipeline::DocumentDraft;
use super::rules::{
    self, DEPENDENT_CLAIM_MIN, NEED_STATEMENTS, PRIOR_ART_PHRASES, PROBLEM_PHRASES,
};
use super::validate::{claim_references, contains_any, parse_claims, word_count};
use crate::model::{
    InventionDescription, QualityGrade, ReviewFindings, Rubric, RubricScore, Scorecard,
    SectionKind, VerificationReport,
};

/// Overall score a draft must reach, with every rubric passed, to be
/// considered ready for filing.
pub const FILING_READY_THRESHOLD: f64 = 70.0;

const ABSTRACT_WORD_MAX: usize = 150;
const ABSTRACT_WORD_THIN: usize = 20;
const OVERLAP_PASS: u32 = 30;
const OVERLAP_STRONG: u32 = 80;

/// Title words too generic to witness cross-section consistency.
const TITLE_GENERIC_WORDS: &[&str] = &[
    "with", "from", "over", "using", "under", "having", "system", "method", "apparatus",
    "device", "assembly", "thereof",
];

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("verification requires all core sections; missing: {}", .0.join(", "))]
    MissingSections(Vec<&'static str>),
}

/// The texts verification runs against
/// - abstract_text: the inventor's description; the drafted sections are
///   judged for fidelity to it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatentSnapshot {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub claims: Option<String>,
    pub background: Option<String>,
    pub summary: Option<String>,
}

impl PatentSnapshot {
    /// Snapshot of a finished draft, with the inventor's description
    /// standing as the abstract.
    pub fn from_draft(description: &InventionDescription, draft: &DocumentDraft) -> Self {
        let text = |kind: SectionKind| draft.section(kind).map(|section| section.text.clone());
        PatentSnapshot {
            title: text(SectionKind::Title),
            abstract_text: Some(description.as_str().to_string()),
            claims: text(SectionKind::Claims),
            background: text(SectionKind::Background),
            summary: text(SectionKind::Summary),
        }
    }

    /// Absent sections, in canonical order.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        for (name, text) in [
            ("title", &self.title),
            ("abstract", &self.abstract_text),
            ("claims", &self.claims),
            ("background", &self.background),
            ("summary", &self.summary),
        ] {
            if text.as_deref().is_none_or(|t| t.trim().is_empty()) {
                missing.push(name);
            }
        }
        missing
    }
}

/// Run all five reviews and synthesize the scorecard.
pub fn verify(snapshot: &PatentSnapshot) -> Result<VerificationReport, VerifyError> {
    let missing = snapshot.missing();
    if !missing.is_empty() {
        return Err(VerifyError::MissingSections(missing));
    }

    let title = snapshot.title.as_deref().unwrap_or_default();
    let abstract_text = snapshot.abstract_text.as_deref().unwrap_or_default();
    let claims = snapshot.claims.as_deref().unwrap_or_default();
    let background = snapshot.background.as_deref().unwrap_or_default();
    let summary = snapshot.summary.as_deref().unwrap_or_default();

    let findings = vec![
        review_title_abstract(title, abstract_text),
        review_claims(claims),
        review_background(background),
        review_summary(summary),
        review_consistency(snapshot),
    ];
    let scorecard = synthesize(&findings);

    tracing::info!(
        overall = scorecard.overall,
        filing_ready = scorecard.filing_ready,
        "Verification complete"
    );

    Ok(VerificationReport {
        findings,
        scorecard,
        generated_at: Utc::now(),
    })
}

pub fn review_title_abstract(title: &str, abstract_text: &str) -> ReviewFindings {
    let mut observations = Vec::new();
    let mut issues = Vec::new();

    let (title_min, title_max) = rules::rule_set(SectionKind::Title).word_bounds;
    let title_words = word_count(title);
    observations.push(format!(
        "title is {title_words} words (target {title_min}-{title_max})"
    ));
    if title_words < title_min || title_words > title_max {
        issues.push(format!(
            "title length {title_words} outside {title_min}-{title_max} words"
        ));
    }

    for word in title_word_list(title) {
        if rules::TITLE_ARTICLES.contains(&word.as_str()) {
            issues.push(format!("title contains article '{word}'"));
        }
        if rules::TITLE_SUBJECTIVE_WORDS.contains(&word.as_str()) {
            issues.push(format!("title uses subjective wording '{word}'"));
        }
    }

    let abstract_words = word_count(abstract_text);
    observations.push(format!("abstract is {abstract_words} words (limit {ABSTRACT_WORD_MAX})"));
    if abstract_words > ABSTRACT_WORD_MAX {
        issues.push(format!(
            "abstract runs {abstract_words} words, over the {ABSTRACT_WORD_MAX} word limit"
        ));
    }
    let thin_abstract = abstract_words < ABSTRACT_WORD_THIN;
    if thin_abstract {
        observations.push("abstract is thin; reviewers have little to judge fidelity against".to_string());
    }

    findings(Rubric::TitleAbstract, observations, issues, !thin_abstract)
}

pub fn review_claims(claims: &str) -> ReviewFindings {
    let mut observations = Vec::new();
    let mut issues = Vec::new();

    let parsed = parse_claims(claims);
    if parsed.is_empty() {
        issues.push("no numbered claims found".to_string());
        return findings(Rubric::Claims, observations, issues, false);
    }

    let (mut independent, mut dependent) = (0usize, 0usize);
    for (_, body) in &parsed {
        if claim_references(body).is_empty() {
            independent += 1;
        } else {
            dependent += 1;
        }
    }
    observations.push(format!(
        "{} claims: {independent} independent, {dependent} dependent",
        parsed.len()
    ));

    if !parsed.iter().enumerate().all(|(i, (n, _))| *n == i + 1) {
        issues.push("claim numbering is not sequential from 1".to_string());
    }
    let first_body = parsed[0].1.to_lowercase();
    if !first_body.contains("comprising") && !first_body.contains("comprises") {
        issues.push("claim 1 lacks a comprising clause".to_string());
    }
    if independent == 0 {
        issues.push("no independent claim".to_string());
    }
    if dependent < DEPENDENT_CLAIM_MIN {
        issues.push(format!(
            "only {dependent} dependent claims; expected at least {DEPENDENT_CLAIM_MIN}"
        ));
    }

    let excellent = independent >= 2 && dependent >= DEPENDENT_CLAIM_MIN;
    findings(Rubric::Claims, observations, issues, excellent)
}

pub fn review_background(background: &str) -> ReviewFindings {
    let mut observations = Vec::new();
    let mut issues = Vec::new();
    let lower = background.to_lowercase();

    if contains_any(&lower, PRIOR_ART_PHRASES) {
        observations.push("engages with conventional or prior approaches".to_string());
    } else {
        issues.push("does not discuss conventional or prior approaches".to_string());
    }
    if contains_any(&lower, PROBLEM_PHRASES) {
        observations.push("names a concrete problem with the status quo".to_string());
    } else {
        issues.push("no clearly stated problem".to_string());
    }
    if contains_any(&lower, NEED_STATEMENTS) {
        observations.push("closes on a statement of need".to_string());
    } else {
        issues.push("missing the closing statement of need".to_string());
    }

    let quantitative = background.chars().any(|c| c.is_ascii_digit());
    if quantitative {
        observations.push("cites at least one quantitative data point".to_string());
    }

    findings(Rubric::Background, observations, issues, quantitative)
}

pub fn review_summary(summary: &str) -> ReviewFindings {
    let mut observations = Vec::new();
    let mut issues = Vec::new();

    let (word_min, _) = rules::rule_set(SectionKind::Summary).word_bounds;
    let words = word_count(summary);
    observations.push(format!("summary is {words} words"));
    if words < word_min {
        issues.push(format!("summary runs {words} words, under the {word_min} word minimum"));
    }
    if !summary.to_lowercase().contains("invention") {
        issues.push("summary never names the invention".to_string());
    }

    let sentences = summary
        .split(['.', '!', '?'])
        .filter(|fragment| fragment.split_whitespace().count() >= 3)
        .count();
    observations.push(format!("{sentences} substantive sentences"));

    findings(Rubric::Summary, observations, issues, sentences >= 2)
}

pub fn review_consistency(snapshot: &PatentSnapshot) -> ReviewFindings {
    let mut observations = Vec::new();
    let mut issues = Vec::new();

    let title = snapshot.title.as_deref().unwrap_or_default();
    let terms = title_terms(title);
    if terms.is_empty() {
        issues.push("title has no distinctive technical terms to trace".to_string());
        return findings(Rubric::Consistency, observations, issues, false);
    }

    let bodies: Vec<(&str, String)> = [
        ("abstract", snapshot.abstract_text.as_deref()),
        ("claims", snapshot.claims.as_deref()),
        ("background", snapshot.background.as_deref()),
        ("summary", snapshot.summary.as_deref()),
    ]
    .into_iter()
    .filter_map(|(name, text)| text.map(|t| (name, t.to_lowercase())))
    .collect();

    if bodies.is_empty() {
        issues.push("no body sections to compare against the title".to_string());
        return findings(Rubric::Consistency, observations, issues, false);
    }

    let mut fractions = Vec::new();
    for (name, body) in &bodies {
        let hits = terms.iter().filter(|term| body.contains(term.as_str())).count();
        observations.push(format!("{name} reuses {hits} of {} title terms", terms.len()));
        fractions.push(hits as f64 / terms.len() as f64);
    }
    let overlap = (fractions.iter().sum::<f64>() / fractions.len() as f64 * 100.0).round() as u32;
    observations.push(format!("term overlap {overlap}/100"));

    if overlap < OVERLAP_PASS {
        issues.push("title vocabulary barely appears in the body sections".to_string());
    }

    findings(Rubric::Consistency, observations, issues, overlap >= OVERLAP_STRONG)
}

/// Fold the findings into the weighted scorecard. A rubric with no findings
/// entry scores zero and earns a re-run action.
pub fn synthesize(findings: &[ReviewFindings]) -> Scorecard {
    let mut scores = Vec::new();
    let mut overall = 0.0;
    let mut all_passed = true;

    for rubric in Rubric::ALL {
        let entry = findings.iter().find(|f| f.rubric == rubric);
        let score = match entry {
            Some(f) => {
                if !f.passed {
                    all_passed = false;
                }
                rubric.weight() * f.grade.factor()
            }
            None => {
                all_passed = false;
                0.0
            }
        };
        overall += score;
        scores.push(RubricScore {
            rubric,
            score,
            out_of: rubric.weight(),
        });
    }

    let mut by_weight = Rubric::ALL;
    by_weight.sort_by(|a, b| {
        b.weight()
            .partial_cmp(&a.weight())
            .unwrap_or(Ordering::Equal)
    });

    let mut actions = Vec::new();
    for rubric in by_weight {
        match findings.iter().find(|f| f.rubric == rubric) {
            Some(f) if !f.passed => {
                actions.extend(f.issues.iter().map(|issue| format!("{rubric}: {issue}")));
            }
            Some(_) => {}
            None => actions.push(format!("{rubric}: review did not run; re-run verification")),
        }
    }

    Scorecard {
        scores,
        overall,
        filing_ready: overall >= FILING_READY_THRESHOLD && all_passed,
        actions,
    }
}

fn findings(
    rubric: Rubric,
    observations: Vec<String>,
    issues: Vec<String>,
    excellent: bool,
) -> ReviewFindings {
    let grade = match issues.len() {
        0 if excellent => QualityGrade::Excellent,
        0 => QualityGrade::Good,
        1 => QualityGrade::Fair,
        _ => QualityGrade::Poor,
    };
    ReviewFindings {
        rubric,
        grade,
        passed: issues.is_empty(),
        observations,
        issues,
    }
}

fn title_word_list(title: &str) -> Vec<String> {
    title
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// Distinctive lowercased title terms, deduplicated, generic patent
/// vocabulary removed.
fn title_terms(title: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for word in title_word_list(title) {
        if word.len() > 3 && !TITLE_GENERIC_WORDS.contains(&word.as_str()) && !terms.contains(&word)
        {
            terms.push(word);
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITLE: &str = "Soil Moisture Responsive Irrigation Control System";

    const ABSTRACT: &str = "An irrigation controller that uses a buried soil moisture sensor array and a valve manifold to schedule watering. Moisture readings from several depths drive a per zone watering schedule.";

    const CLAIMS: &str = "1. A system for automated irrigation, comprising: a plurality of capacitive soil moisture sensors; a controller coupled to the sensors; and a valve manifold driven by the controller.\n\n2. The system of claim 1, wherein the sensors are buried at staggered depths.\n\n3. The system of claim 1, wherein the controller stores a moisture history.\n\n4. The system of claim 2, wherein the staggered depths span 10 to 40 centimeters.\n\n5. The system of claim 1, wherein the valve manifold comprises a plurality of solenoid valves.\n\n6. A method of irrigating a field, comprising measuring soil moisture at a plurality of depths, computing a watering schedule from the measurements, and actuating valves according to the schedule.";

    const BACKGROUND: &str = "Conventional irrigation systems rely on fixed timers that ignore the actual moisture state of the soil. Studies report that as much as 50 percent of residential irrigation water is wasted through overwatering.\n\nExisting sensor-based controllers attempt to address this problem, but suffer from a significant limitation: buried probes corrode and drift out of calibration.\n\nThere is therefore a need for an irrigation controller that derives watering schedules from reliable soil measurements.";

    const SUMMARY: &str = "The present invention provides an irrigation controller that reads a buried array of capacitive soil moisture sensors, computes a watering schedule from the measured profile, and actuates a valve manifold so that each zone receives water only when its root zone moisture falls below a configurable threshold. Each zone is watered independently from its own moisture history.";

    fn complete_snapshot() -> PatentSnapshot {
        PatentSnapshot {
            title: Some(TITLE.to_string()),
            abstract_text: Some(ABSTRACT.to_string()),
            claims: Some(CLAIMS.to_string()),
            background: Some(BACKGROUND.to_string()),
            summary: Some(SUMMARY.to_string()),
        }
    }

    #[test]
    fn test_missing_sections_are_named_in_canonical_order() {
        let snapshot = PatentSnapshot {
            title: Some(TITLE.to_string()),
            claims: Some(CLAIMS.to_string()),
            ..PatentSnapshot::default()
        };

        let error = verify(&snapshot).unwrap_err();
        let VerifyError::MissingSections(missing) = error;
        assert_eq!(missing, vec!["abstract", "background", "summary"]);
    }

    #[test]
    fn test_blank_section_counts_as_missing() {
        let mut snapshot = complete_snapshot();
        snapshot.summary = Some("   ".to_string());
        assert_eq!(snapshot.missing(), vec!["summary"]);
    }

    #[test]
    fn test_complete_draft_scores_filing_ready() {
        let report = verify(&complete_snapshot()).unwrap();

        assert_eq!(report.findings.len(), 5);
        assert!(report.scorecard.overall > 99.0, "overall: {}", report.scorecard.overall);
        assert!(report.scorecard.filing_ready);
        assert!(report.scorecard.actions.is_empty(), "actions: {:?}", report.scorecard.actions);
        for rubric in Rubric::ALL {
            let entry = report.findings_for(rubric).unwrap();
            assert_eq!(entry.grade, QualityGrade::Excellent, "{rubric} graded {}", entry.grade);
        }
    }

    #[test]
    fn test_claims_review_reports_independent_dependent_split() {
        let entry = review_claims(CLAIMS);
        assert!(entry.passed);
        assert_eq!(entry.grade, QualityGrade::Excellent);
        assert!(entry
            .observations
            .iter()
            .any(|line| line.contains("2 independent") && line.contains("4 dependent")));
    }

    #[test]
    fn test_oversized_abstract_fails_title_rubric() {
        let long_abstract = "word ".repeat(170);
        let entry = review_title_abstract(TITLE, &long_abstract);
        assert!(!entry.passed);
        assert!(entry.issues.iter().any(|issue| issue.contains("150")));
    }

    #[test]
    fn test_unrelated_title_fails_consistency() {
        let mut snapshot = complete_snapshot();
        snapshot.title = Some("Quantum Key Distribution Across Orbital Satellite Relays".to_string());

        let report = verify(&snapshot).unwrap();
        let entry = report.findings_for(Rubric::Consistency).unwrap();
        assert!(!entry.passed);
        assert_eq!(entry.grade, QualityGrade::Fair);
        assert!(!report.scorecard.filing_ready);
        assert!(report
            .scorecard
            .actions
            .iter()
            .any(|action| action.starts_with("consistency:")));
    }

    #[test]
    fn test_synthesis_scores_missing_rubric_zero() {
        let partial: Vec<ReviewFindings> = vec![
            review_title_abstract(TITLE, ABSTRACT),
            review_background(BACKGROUND),
            review_summary(SUMMARY),
            review_consistency(&complete_snapshot()),
        ];

        let scorecard = synthesize(&partial);
        assert_eq!(scorecard.score_for(Rubric::Claims), Some(0.0));
        assert!(!scorecard.filing_ready);
        assert_eq!(scorecard.actions.len(), 1);
        assert!(scorecard.actions[0].starts_with("claims:"));
        assert!(scorecard.actions[0].contains("re-run"));
    }

    #[test]
    fn test_actions_are_ordered_heaviest_rubric_first() {
        let blank = PatentSnapshot {
            title: Some("Widget".to_string()),
            abstract_text: Some("A widget.".to_string()),
            claims: Some("The widget is nice.".to_string()),
            background: Some("Widgets exist.".to_string()),
            summary: Some("It is a widget.".to_string()),
        };

        let report = verify(&blank).unwrap();
        let actions = &report.scorecard.actions;
        assert!(!actions.is_empty());
        let first_claims = actions.iter().position(|a| a.starts_with("claims:"));
        let first_summary = actions.iter().position(|a| a.starts_with("summary:"));
        assert!(first_claims.unwrap() < first_summary.unwrap());
    }
}
