//! Deterministic cleanup of raw engine output
//!
//! Normalization is pure and idempotent: running it twice yields the same
//! text as running it once. Validation and scoring always see normalized
//! text, so every rule here has a direct effect on acceptance.

use regex::Regex;
use std::sync::LazyLock;

use crate::model::SectionKind;

static MD_HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*#+\s*").unwrap());
static RULE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:={3,}|-{3,}|_{3,})\s*$").unwrap());
static BULLET_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*[•◦▪-]+\s+").unwrap());
static NUMBERED_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s+").unwrap());
static TRAILING_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());
static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());
static MULTI_BLANK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static TITLE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:patent\s+)?title\s*[:\-]\s*").unwrap());
static FIGURE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*fig(?:ure)?\.?\s*(\d+)(?:\s*[-:.]\s*|\s+)(\S.*)$").unwrap()
});
static FIGURE_VERB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:illustrates|illustrating|shows|showing|depicts|depicting|presents|represents|is)\b[,:]?\s*").unwrap()
});
static CLAIM_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:claim\s+)?(\d+)\s*[.):]\s*(\S.*)$").unwrap());

/// Clean one raw completion into canonical section text.
pub fn normalize(kind: SectionKind, raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = strip_markup(kind, &text);
    let text = strip_echoed_headings(kind, &text);

    match kind {
        SectionKind::Title => normalize_title(&text),
        SectionKind::BriefDescriptionOfDrawings => normalize_figures(&text),
        SectionKind::Claims => normalize_claims(&text),
        SectionKind::Objects => normalize_objects(&text),
        _ => normalize_prose(&text),
    }
}

/// Remove markdown artifacts the engine tends to emit.
fn strip_markup(kind: SectionKind, text: &str) -> String {
    let text = MD_HEADING.replace_all(text, "");
    let text = RULE_LINE.replace_all(&text, "");
    let text = text.replace("**", "").replace('*', "");
    // Claims keep their numbered markers; bullet dashes elsewhere are noise.
    let text = if kind == SectionKind::Claims {
        text
    } else {
        BULLET_PREFIX.replace_all(&text, "").into_owned()
    };
    TRAILING_SPACE.replace_all(&text, "").into_owned()
}

fn heading_variants(kind: SectionKind) -> &'static [&'static str] {
    match kind {
        SectionKind::Title => &["TITLE", "TITLE OF THE INVENTION", "PATENT TITLE"],
        SectionKind::FieldOfInvention => &[
            "FIELD OF THE INVENTION",
            "FIELD OF INVENTION",
            "TECHNICAL FIELD",
            "FIELD",
        ],
        SectionKind::Background => &[
            "BACKGROUND OF THE INVENTION",
            "BACKGROUND",
            "BACKGROUND ART",
        ],
        SectionKind::Objects => &[
            "OBJECTS OF THE INVENTION",
            "OBJECT OF THE INVENTION",
            "OBJECTS",
        ],
        SectionKind::Summary => &["SUMMARY OF THE INVENTION", "SUMMARY"],
        SectionKind::BriefDescriptionOfDrawings => &[
            "BRIEF DESCRIPTION OF THE DRAWINGS",
            "BRIEF DESCRIPTION OF DRAWINGS",
            "DESCRIPTION OF THE DRAWINGS",
        ],
        SectionKind::DetailedDescription => &[
            "DETAILED DESCRIPTION OF THE INVENTION",
            "DETAILED DESCRIPTION",
            "DESCRIPTION OF EMBODIMENTS",
        ],
        SectionKind::Claims => &["CLAIMS", "WHAT IS CLAIMED IS", "I CLAIM", "WE CLAIM"],
    }
}

/// Drop leading lines that merely repeat the section heading.
fn strip_echoed_headings(kind: SectionKind, text: &str) -> String {
    let variants = heading_variants(kind);
    let mut lines: Vec<&str> = text.lines().collect();

    loop {
        let first = lines.iter().position(|line| !line.trim().is_empty());
        let Some(index) = first else { break };
        let candidate = lines[index].trim().trim_end_matches(':').trim().to_uppercase();
        if variants.contains(&candidate.as_str()) {
            lines.drain(..=index);
        } else {
            break;
        }
    }

    lines.join("\n")
}

fn normalize_title(text: &str) -> String {
    let Some(line) = text.lines().find(|line| !line.trim().is_empty()) else {
        return String::new();
    };

    let line = TITLE_LABEL.replace(line.trim(), "");
    let line = line.trim_matches(|c| matches!(c, '"' | '\'' | '`'));
    let line = MULTI_SPACE.replace_all(line.trim(), " ");
    let line = line.trim_end_matches(['.', '?', '!', ':', ';', ',']);
    capitalize_first(line.trim())
}

fn normalize_figures(text: &str) -> String {
    let mut descriptions: Vec<String> = Vec::new();

    for line in text.lines() {
        let Some(captures) = FIGURE_LINE.captures(line) else {
            continue;
        };
        let Some(body) = captures.get(2) else { continue };
        let body = FIGURE_VERB.replace(body.as_str().trim(), "");
        let body = MULTI_SPACE.replace_all(body.trim(), " ");
        let body = decapitalize_first(ensure_terminal(&body).as_str());
        if !body.is_empty() {
            descriptions.push(body);
        }
    }

    if descriptions.is_empty() {
        // Nothing figure-shaped; leave prose for the validator to flag.
        return normalize_prose(text);
    }

    descriptions
        .iter()
        .enumerate()
        .map(|(i, body)| format!("Figure {}: illustrates {}", i + 1, body))
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_claims(text: &str) -> String {
    let mut blocks: Vec<Vec<String>> = Vec::new();

    for line in text.lines() {
        if let Some(captures) = CLAIM_START.captures(line) {
            if let Some(body) = captures.get(2) {
                blocks.push(vec![body.as_str().trim().to_string()]);
                continue;
            }
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        // Continuation of the current claim; preamble before claim 1 is dropped.
        if let Some(current) = blocks.last_mut() {
            current.push(trimmed.to_string());
        }
    }

    if blocks.is_empty() {
        return normalize_prose(text);
    }

    blocks
        .iter()
        .enumerate()
        .map(|(i, lines)| {
            let body = MULTI_SPACE.replace_all(&lines.join(" "), " ").into_owned();
            format!("{}. {}", i + 1, capitalize_first(&ensure_terminal(&body)))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn normalize_objects(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    let mut primary_seen = false;

    for line in text.lines() {
        let line = NUMBERED_PREFIX.replace(line, "");
        let line = MULTI_SPACE.replace_all(line.trim(), " ").into_owned();
        if line.is_empty() {
            continue;
        }

        let key = line.to_lowercase();
        // The engine loves to restate the primary object; keep the first only.
        if key.contains("primary object") {
            if primary_seen {
                continue;
            }
            primary_seen = true;
        }
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);

        lines.push(capitalize_first(&ensure_terminal(&line)));
    }

    lines.join("\n")
}

fn normalize_prose(text: &str) -> String {
    let collapsed = MULTI_BLANK.replace_all(text, "\n\n");
    let paragraphs: Vec<String> = collapsed
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| {
            let flat = MULTI_SPACE.replace_all(paragraph, " ");
            ensure_terminal(flat.trim())
        })
        .collect();

    capitalize_sentences(&paragraphs.join("\n\n"))
}

/// Close a sentence or item: dangling separators become periods and bare
/// endings gain one.
fn ensure_terminal(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        return String::new();
    }
    match trimmed.chars().last() {
        Some('.') | Some('!') | Some('?') => trimmed.to_string(),
        Some(',') | Some(';') | Some(':') => {
            let mut owned = trimmed.to_string();
            owned.pop();
            owned.push('.');
            owned
        }
        _ => format!("{trimmed}."),
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Lowercase a leading word unless it looks like an acronym.
fn decapitalize_first(text: &str) -> String {
    let first_word = text.split_whitespace().next().unwrap_or("");
    let acronym = first_word.chars().filter(|c| c.is_uppercase()).count() > 1;
    if acronym {
        return text.to_string();
    }
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Uppercase the first letter of the text and of each sentence after a
/// terminal punctuation mark.
fn capitalize_sentences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut boundary = true;
    for c in text.chars() {
        if boundary && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            boundary = false;
            continue;
        }
        match c {
            '.' | '!' | '?' => boundary = true,
            c if c.is_whitespace() => {}
            _ => boundary = false,
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_idempotent(kind: SectionKind, raw: &str) {
        let once = normalize(kind, raw);
        let twice = normalize(kind, &once);
        assert_eq!(once, twice, "{kind} normalization is not idempotent");
    }

    #[test]
    fn test_title_strips_labels_quotes_and_punctuation() {
        let raw = "## Title: \"soil  moisture sensing array with predictive controller.\"\n";
        let normalized = normalize(SectionKind::Title, raw);
        assert_eq!(
            normalized,
            "Soil moisture sensing array with predictive controller"
        );
        assert_idempotent(SectionKind::Title, raw);
    }

    #[test]
    fn test_title_takes_first_nonempty_line() {
        let raw = "\n\nIrrigation Control System\nSecond line is commentary.";
        assert_eq!(normalize(SectionKind::Title, raw), "Irrigation Control System");
    }

    #[test]
    fn test_figures_renumber_in_document_order() {
        let raw = "Figure 3: shows the valve assembly\nFigure 1: depicts the pump\nFigure 2: the controller board";
        let normalized = normalize(SectionKind::BriefDescriptionOfDrawings, raw);
        let lines: Vec<&str> = normalized.lines().collect();
        assert_eq!(lines[0], "Figure 1: illustrates the valve assembly.");
        assert_eq!(lines[1], "Figure 2: illustrates the pump.");
        assert_eq!(lines[2], "Figure 3: illustrates the controller board.");
        assert_idempotent(SectionKind::BriefDescriptionOfDrawings, raw);
    }

    #[test]
    fn test_figures_standardize_verb_and_abbreviations() {
        let raw = "FIG. 2 shows The water reservoir";
        let normalized = normalize(SectionKind::BriefDescriptionOfDrawings, raw);
        assert_eq!(normalized, "Figure 1: illustrates the water reservoir.");
    }

    #[test]
    fn test_figures_drop_preamble_prose() {
        let raw = "The accompanying drawings illustrate preferred embodiments.\nFigure 1: illustrates the pump.";
        let normalized = normalize(SectionKind::BriefDescriptionOfDrawings, raw);
        assert_eq!(normalized, "Figure 1: illustrates the pump.");
    }

    #[test]
    fn test_figures_keep_digit_initial_captions() {
        let raw = "Figure 1: illustrates the pump housing.\nFigure 2: 3D perspective view of the manifold\nFigure 3: illustrates the controller.";
        let normalized = normalize(SectionKind::BriefDescriptionOfDrawings, raw);
        let lines: Vec<&str> = normalized.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "Figure 2: illustrates 3D perspective view of the manifold."
        );
        assert_eq!(lines[2], "Figure 3: illustrates the controller.");
        assert_idempotent(SectionKind::BriefDescriptionOfDrawings, raw);
    }

    #[test]
    fn test_claims_renumber_but_keep_internal_references() {
        let raw = "What is claimed is:\n2. A system for irrigation, comprising:\n  a moisture sensor;\n  a controller.\n5. The system of claim 1, wherein the sensor is capacitive";
        let normalized = normalize(SectionKind::Claims, raw);
        let blocks: Vec<&str> = normalized.split("\n\n").collect();
        assert!(blocks[0].starts_with("1. A system for irrigation, comprising: a moisture sensor; a controller."));
        assert!(blocks[1].starts_with("2. The system of claim 1,"));
        assert!(blocks[1].ends_with("capacitive."));
        assert_idempotent(SectionKind::Claims, raw);
    }

    #[test]
    fn test_objects_dedupe_primary_object_and_strip_bullets() {
        let raw = "# OBJECTS OF THE INVENTION\nThe primary object of the present invention is to provide an irrigation controller\n- reduce water waste\n- reduce water waste\nThe primary object of the present invention is to provide an irrigation controller\nIt is another object of the present invention to log usage";
        let normalized = normalize(SectionKind::Objects, raw);
        assert_eq!(normalized.matches("primary object").count(), 1);
        assert_eq!(normalized.matches("Reduce water waste.").count(), 1);
        assert!(normalized.ends_with("It is another object of the present invention to log usage."));
        assert_idempotent(SectionKind::Objects, raw);
    }

    #[test]
    fn test_prose_collapses_blanks_and_fixes_punctuation() {
        let raw = "conventional systems rely on timers,\n\n\n\nthis wastes water";
        let normalized = normalize(SectionKind::Background, raw);
        assert_eq!(
            normalized,
            "Conventional systems rely on timers.\n\nThis wastes water."
        );
        assert_idempotent(SectionKind::Background, raw);
    }

    #[test]
    fn test_echoed_heading_is_dropped() {
        let raw = "SUMMARY OF THE INVENTION\n\nThe present invention provides a controller.";
        let normalized = normalize(SectionKind::Summary, raw);
        assert_eq!(normalized, "The present invention provides a controller.");
    }

    #[test]
    fn test_empty_input_stays_empty() {
        for kind in SectionKind::ALL {
            assert_eq!(normalize(kind, ""), "");
            assert_eq!(normalize(kind, "   \n\n  "), "");
        }
    }

    #[test]
    fn test_markdown_emphasis_is_removed() {
        let raw = "The present invention relates to **capacitive** sensing, and more particularly to *buried* probe arrays.";
        let normalized = normalize(SectionKind::FieldOfInvention, raw);
        assert!(!normalized.contains('*'));
        assert!(normalized.contains("capacitive sensing"));
        assert_idempotent(SectionKind::FieldOfInvention, raw);
    }
}
