//! Per-section drafting rules
//!
//! Each section is validated against a declarative rule set. The validator
//! applies these tables; it carries no section knowledge of its own beyond
//! a handful of structural checks that cannot be expressed as phrase lists.

use crate::model::SectionKind;

/// Marketing language that has no place in a patent application
pub const MARKETING_PHRASES: &[&str] = &[
    "state-of-the-art",
    "best-in-class",
    "cutting-edge",
    "game-changing",
    "groundbreaking",
    "world-class",
    "unparalleled",
    "industry-leading",
];

/// First-person ownership language, prohibited in legally objective sections
pub const FIRST_PERSON_PHRASES: &[&str] = &[
    "our invention",
    "my invention",
    "we have developed",
    "we developed",
    "we propose",
    "our novel",
    "our new",
    "i have invented",
];

/// Subjective adjectives excluded from titles
pub const TITLE_SUBJECTIVE_WORDS: &[&str] = &[
    "novel",
    "improved",
    "innovative",
    "revolutionary",
    "new",
    "better",
    "best",
    "superior",
    "unique",
];

/// Articles excluded from titles
pub const TITLE_ARTICLES: &[&str] = &["a", "an", "the"];

/// Wordings that show the background engages with what already exists
pub const PRIOR_ART_PHRASES: &[&str] =
    &["conventional", "existing", "traditional", "prior art", "known"];

/// Wordings that show the background names a concrete shortcoming
pub const PROBLEM_PHRASES: &[&str] = &[
    "problem",
    "limitation",
    "drawback",
    "disadvantage",
    "challenge",
    "difficult",
];

/// Accepted phrasings for the need statement that closes a background section
pub const NEED_STATEMENTS: &[&str] = &[
    "there is a need",
    "there exists a need",
    "there remains a need",
    "there is therefore a need",
    "a need exists",
    "it would therefore be desirable",
];

/// Hierarchical qualifier expected as the second sentence of the field section
pub const FIELD_QUALIFIERS: &[&str] = &["more particularly", "more specifically", "in particular"];

/// Closing scope language expected at the end of a detailed description
pub const SCOPE_PHRASES: &[&str] = &[
    "without departing from the scope",
    "within the scope of the invention",
    "scope of the appended claims",
];

/// Minimum number of "another object" statements before a draft reads thin
pub const ANOTHER_OBJECT_MIN: usize = 4;

/// Minimum number of dependent claims expected in a full claim set
pub const DEPENDENT_CLAIM_MIN: usize = 4;

/// Structural markers some sections are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// `Figure <n>: illustrates ...` lines, numbered from 1.
    Figure,
    /// `<n>. <claim body>` blocks, numbered from 1.
    Claim,
}

/// Declarative validation rules for one section
/// - required_phrases: groups of interchangeable phrasings; every group must
///   match at least once
/// - banned_phrases: lists whose members may not appear anywhere
/// - paragraph_band: ideal paragraph count; outside it is a warning
/// - terminal_phrases: the final paragraph must contain one of these
#[derive(Debug)]
pub struct RuleSet {
    pub word_bounds: (usize, usize),
    pub required_phrases: &'static [&'static [&'static str]],
    pub banned_phrases: &'static [&'static [&'static str]],
    pub paragraph_band: Option<(usize, usize)>,
    pub marker: Option<MarkerStyle>,
    pub terminal_phrases: &'static [&'static str],
    pub wants_quantitative: bool,
}

const TITLE_RULES: RuleSet = RuleSet {
    word_bounds: (5, 12),
    required_phrases: &[],
    banned_phrases: &[MARKETING_PHRASES, FIRST_PERSON_PHRASES],
    paragraph_band: None,
    marker: None,
    terminal_phrases: &[],
    wants_quantitative: false,
};

const FIELD_RULES: RuleSet = RuleSet {
    word_bounds: (20, 200),
    required_phrases: &[&["relates to", "pertains to"]],
    banned_phrases: &[MARKETING_PHRASES, FIRST_PERSON_PHRASES],
    paragraph_band: Some((1, 2)),
    marker: None,
    terminal_phrases: &[],
    wants_quantitative: false,
};

const BACKGROUND_RULES: RuleSet = RuleSet {
    word_bounds: (80, 350),
    required_phrases: &[PRIOR_ART_PHRASES, PROBLEM_PHRASES],
    banned_phrases: &[MARKETING_PHRASES, FIRST_PERSON_PHRASES],
    paragraph_band: Some((2, 4)),
    marker: None,
    terminal_phrases: NEED_STATEMENTS,
    wants_quantitative: true,
};

const OBJECTS_RULES: RuleSet = RuleSet {
    word_bounds: (60, 500),
    required_phrases: &[&["primary object"]],
    banned_phrases: &[MARKETING_PHRASES, FIRST_PERSON_PHRASES],
    paragraph_band: None,
    marker: None,
    terminal_phrases: &[],
    wants_quantitative: false,
};

const SUMMARY_RULES: RuleSet = RuleSet {
    word_bounds: (40, 200),
    required_phrases: &[&["invention"]],
    banned_phrases: &[MARKETING_PHRASES, FIRST_PERSON_PHRASES],
    paragraph_band: Some((1, 2)),
    marker: None,
    terminal_phrases: &[],
    wants_quantitative: false,
};

const DRAWINGS_RULES: RuleSet = RuleSet {
    word_bounds: (10, 250),
    required_phrases: &[],
    banned_phrases: &[MARKETING_PHRASES],
    paragraph_band: None,
    marker: Some(MarkerStyle::Figure),
    terminal_phrases: &[],
    wants_quantitative: false,
};

const DETAILED_RULES: RuleSet = RuleSet {
    word_bounds: (150, 700),
    required_phrases: &[
        &["referring to", "as shown in", "with reference to", "figure"],
        &["embodiment", "implementation"],
    ],
    banned_phrases: &[MARKETING_PHRASES, FIRST_PERSON_PHRASES],
    paragraph_band: Some((3, 6)),
    marker: None,
    terminal_phrases: &[],
    wants_quantitative: false,
};

const CLAIMS_RULES: RuleSet = RuleSet {
    word_bounds: (60, 900),
    required_phrases: &[],
    banned_phrases: &[MARKETING_PHRASES, FIRST_PERSON_PHRASES],
    paragraph_band: None,
    marker: Some(MarkerStyle::Claim),
    terminal_phrases: &[],
    wants_quantitative: false,
};

pub fn rule_set(kind: SectionKind) -> &'static RuleSet {
    match kind {
        SectionKind::Title => &TITLE_RULES,
        SectionKind::FieldOfInvention => &FIELD_RULES,
        SectionKind::Background => &BACKGROUND_RULES,
        SectionKind::Objects => &OBJECTS_RULES,
        SectionKind::Summary => &SUMMARY_RULES,
        SectionKind::BriefDescriptionOfDrawings => &DRAWINGS_RULES,
        SectionKind::DetailedDescription => &DETAILED_RULES,
        SectionKind::Claims => &CLAIMS_RULES,
    }
}
