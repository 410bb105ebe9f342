//! Rule-based validation of normalized section text
//!
//! Validation is pure: the same text always produces the same verdict, and
//! no call here touches the generation engine. Hard issues make a draft
//! invalid; warnings only lower its score.

use regex::Regex;
use std::sync::LazyLock;

use super::rules::{
    self, ANOTHER_OBJECT_MIN, DEPENDENT_CLAIM_MIN, MarkerStyle, RuleSet,
};
use crate::model::{RuleId, SectionKind, TextCounts, ValidationVerdict};

static FIGURE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Figure (\d+): illustrates \S.*\.$").unwrap());
static CLAIM_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\.\s+(\S.*)$").unwrap());
static CLAIM_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bclaim\s+(\d+)\b").unwrap());

/// Validate a normalized section draft against its rule set.
pub fn validate(kind: SectionKind, text: &str) -> ValidationVerdict {
    let rules = rules::rule_set(kind);
    let counts = TextCounts {
        words: word_count(text),
        paragraphs: paragraph_count(text),
        markers: marker_count(kind, text),
    };
    let mut verdict = ValidationVerdict::with_counts(counts);

    if text.trim().is_empty() {
        verdict.add_issue(RuleId::WordCount, "section text is empty");
        return verdict;
    }

    let lower = text.to_lowercase();

    check_word_bounds(rules, counts.words, &mut verdict);
    check_required_phrases(rules, &lower, &mut verdict);
    check_banned_phrases(rules, &lower, &mut verdict);
    check_paragraph_band(rules, counts.paragraphs, &mut verdict);
    check_terminal_statement(rules, &lower, &mut verdict);

    if rules.wants_quantitative && !text.chars().any(|c| c.is_ascii_digit()) {
        verdict.add_warning(RuleId::MissingDetail, "no quantitative data point");
    }

    match rules.marker {
        Some(MarkerStyle::Figure) => check_figure_markers(text, &mut verdict),
        Some(MarkerStyle::Claim) => check_claim_structure(text, &mut verdict),
        None => {}
    }

    match kind {
        SectionKind::Title => check_title_form(text, &mut verdict),
        SectionKind::Objects => check_object_count(&lower, &mut verdict),
        SectionKind::FieldOfInvention => {
            if !contains_any(&lower, rules::FIELD_QUALIFIERS) {
                verdict.add_warning(
                    RuleId::MissingDetail,
                    "missing hierarchical qualifier such as 'more particularly'",
                );
            }
        }
        SectionKind::DetailedDescription => {
            if !contains_any(&lower, rules::SCOPE_PHRASES) {
                verdict.add_warning(RuleId::MissingDetail, "no closing scope statement");
            }
        }
        _ => {}
    }

    verdict
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn paragraph_count(text: &str) -> usize {
    text.split("\n\n").filter(|p| !p.trim().is_empty()).count()
}

fn marker_count(kind: SectionKind, text: &str) -> usize {
    match rules::rule_set(kind).marker {
        Some(MarkerStyle::Figure) => text
            .lines()
            .filter(|line| FIGURE_MARKER.is_match(line.trim()))
            .count(),
        Some(MarkerStyle::Claim) => parse_claims(text).len(),
        None => 0,
    }
}

pub(crate) fn contains_any(lower: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| lower.contains(phrase))
}

/// Claim numbers referenced by one claim body.
pub(crate) fn claim_references(body: &str) -> Vec<usize> {
    CLAIM_REFERENCE
        .captures_iter(body)
        .filter_map(|captures| captures.get(1).and_then(|m| m.as_str().parse().ok()))
        .collect()
}

fn check_word_bounds(rules: &RuleSet, words: usize, verdict: &mut ValidationVerdict) {
    let (min, max) = rules.word_bounds;
    if words < min {
        verdict.add_issue(
            RuleId::WordCount,
            format!("word count {words} below minimum {min}"),
        );
    } else if words > max {
        verdict.add_issue(
            RuleId::WordCount,
            format!("word count {words} exceeds maximum {max}"),
        );
    }
}

fn check_required_phrases(rules: &RuleSet, lower: &str, verdict: &mut ValidationVerdict) {
    for group in rules.required_phrases {
        if !contains_any(lower, group) {
            verdict.add_issue(
                RuleId::RequiredPhrase,
                format!("missing required phrase; expected one of: {}", group.join(" / ")),
            );
        }
    }
}

fn check_banned_phrases(rules: &RuleSet, lower: &str, verdict: &mut ValidationVerdict) {
    for list in rules.banned_phrases {
        for phrase in *list {
            if lower.contains(phrase) {
                verdict.add_issue(RuleId::BannedPhrase, format!("contains banned phrase '{phrase}'"));
            }
        }
    }
}

fn check_paragraph_band(rules: &RuleSet, paragraphs: usize, verdict: &mut ValidationVerdict) {
    if let Some((low, high)) = rules.paragraph_band
        && (paragraphs < low || paragraphs > high)
    {
        verdict.add_warning(
            RuleId::ParagraphCount,
            format!("paragraph count {paragraphs} outside ideal range {low}-{high}"),
        );
    }
}

fn check_terminal_statement(rules: &RuleSet, lower: &str, verdict: &mut ValidationVerdict) {
    if rules.terminal_phrases.is_empty() {
        return;
    }
    let last_paragraph = lower
        .rsplit("\n\n")
        .find(|p| !p.trim().is_empty())
        .unwrap_or("");
    if !contains_any(last_paragraph, rules.terminal_phrases) {
        verdict.add_issue(
            RuleId::TerminalStatement,
            "does not close with a statement of need",
        );
    }
}

fn check_title_form(text: &str, verdict: &mut ValidationVerdict) {
    if text.lines().count() > 1 {
        verdict.add_issue(RuleId::TitleForm, "title must be a single line");
    }

    if text
        .chars()
        .last()
        .is_some_and(|c| matches!(c, '.' | '!' | '?' | ':' | ';' | ','))
    {
        verdict.add_issue(RuleId::TitleForm, "title ends with punctuation");
    }

    let words: Vec<String> = text
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .collect();

    let articles: Vec<&String> = words
        .iter()
        .filter(|word| rules::TITLE_ARTICLES.contains(&word.as_str()))
        .collect();
    if !articles.is_empty() {
        verdict.add_issue(
            RuleId::TitleForm,
            format!("title contains article '{}'", articles[0]),
        );
    }

    let subjective: Vec<&String> = words
        .iter()
        .filter(|word| rules::TITLE_SUBJECTIVE_WORDS.contains(&word.as_str()))
        .collect();
    if !subjective.is_empty() {
        verdict.add_issue(
            RuleId::TitleForm,
            format!(
                "title contains subjective wording: {}",
                subjective
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        );
    }
}

fn check_object_count(lower: &str, verdict: &mut ValidationVerdict) {
    let another = lower.matches("another object").count();
    if another < ANOTHER_OBJECT_MIN {
        verdict.add_warning(
            RuleId::ObjectCount,
            format!("only {another} additional object statements, expected at least {ANOTHER_OBJECT_MIN}"),
        );
    }
}

fn check_figure_markers(text: &str, verdict: &mut ValidationVerdict) {
    let mut numbers = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match FIGURE_MARKER.captures(line) {
            Some(captures) => {
                if let Some(number) = captures.get(1).and_then(|m| m.as_str().parse::<usize>().ok())
                {
                    numbers.push(number);
                }
            }
            None => {
                verdict.add_issue(
                    RuleId::MarkerSequence,
                    format!("line {} is not a figure description", i + 1),
                );
            }
        }
    }

    if numbers.is_empty() {
        verdict.add_issue(RuleId::MarkerSequence, "no figure descriptions found");
        return;
    }

    let sequential = numbers.iter().enumerate().all(|(i, n)| *n == i + 1);
    if !sequential {
        verdict.add_issue(
            RuleId::MarkerSequence,
            format!("figure numbers are not sequential from 1: {numbers:?}"),
        );
    }
}

/// Claims as (number, body) pairs, in document order.
pub(crate) fn parse_claims(text: &str) -> Vec<(usize, String)> {
    let mut claims: Vec<(usize, String)> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(captures) = CLAIM_MARKER.captures(trimmed) {
            let number = captures
                .get(1)
                .and_then(|m| m.as_str().parse::<usize>().ok());
            if let (Some(number), Some(body)) = (number, captures.get(2)) {
                claims.push((number, body.as_str().to_string()));
                continue;
            }
        }
        if let Some((_, body)) = claims.last_mut() {
            body.push(' ');
            body.push_str(trimmed);
        }
    }

    claims
}

fn check_claim_structure(text: &str, verdict: &mut ValidationVerdict) {
    let claims = parse_claims(text);

    if claims.is_empty() {
        verdict.add_issue(RuleId::ClaimStructure, "no numbered claims found");
        return;
    }

    let sequential = claims.iter().enumerate().all(|(i, (n, _))| *n == i + 1);
    if !sequential {
        let numbers: Vec<usize> = claims.iter().map(|(n, _)| *n).collect();
        verdict.add_issue(
            RuleId::MarkerSequence,
            format!("claim numbers are not sequential from 1: {numbers:?}"),
        );
    }

    let first_body = claims[0].1.to_lowercase();
    if !first_body.contains("comprising") && !first_body.contains("comprises") {
        verdict.add_issue(
            RuleId::ClaimStructure,
            "independent claim 1 lacks a comprising clause",
        );
    }

    let mut dependent = 0usize;
    for (number, body) in &claims {
        let body_lower = body.to_lowercase();
        let mut references = false;
        for captures in CLAIM_REFERENCE.captures_iter(&body_lower) {
            references = true;
            if let Some(target) = captures.get(1).and_then(|m| m.as_str().parse::<usize>().ok())
                && target >= *number
            {
                verdict.add_issue(
                    RuleId::ClaimStructure,
                    format!("claim {number} references claim {target}, which does not precede it"),
                );
            }
        }
        if references {
            dependent += 1;
        }
    }

    if dependent < DEPENDENT_CLAIM_MIN {
        verdict.add_warning(
            RuleId::MissingDetail,
            format!("only {dependent} dependent claims, expected at least {DEPENDENT_CLAIM_MIN}"),
        );
    }

    let has_method = claims.iter().any(|(_, body)| {
        let body_lower = body.to_lowercase();
        body_lower.starts_with("a method") || body_lower.contains("method of") || body_lower.contains("method for")
    });
    if !has_method {
        verdict.add_issue(RuleId::ClaimStructure, "no method claim present");
    }
}
