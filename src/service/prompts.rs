//! Prompt construction for every section of the application
//!
//! Each prompt ends with a literal priming prefix, the expected first words
//! of the section. The engine continues from that prefix, and the retry
//! controller re-prepends it to the completion, so drafts start in exactly
//! the grammatical form the validation rules expect.

use crate::engine::SamplingConfig;
use crate::index::PriorArtHit;
use crate::model::{SectionKind, SectionRequest};

/// Shared framing for every drafting prompt
pub const DRAFTER_PREAMBLE: &str = r#"You are a patent attorney drafting a United States utility patent application.
Write formally and objectively, in the third person. Never use marketing
language and never refer to the applicant as "we" or "our"."#;

const TITLE_INSTRUCTIONS: &str = r#"Write the title of the patent application.

Rules:
- One single line of 5 to 12 words
- No articles (a, an, the)
- No subjective adjectives such as novel, improved or innovative
- Technical nouns only, no trailing punctuation

Example:
Invention: A wearable cuff that measures blood pressure optically and streams readings to a phone.
Title: Optical Blood Pressure Monitoring Cuff With Wireless Telemetry"#;

const FIELD_INSTRUCTIONS: &str = r#"Write the Field of the Invention section.

Rules:
- One short paragraph of one or two sentences
- The first sentence states the general technical field, starting "The present invention relates to"
- The second sentence narrows it, starting "More particularly, the invention relates to"

Example:
Invention: A wearable cuff that measures blood pressure optically and streams readings to a phone.
Field of the Invention:
The present invention relates to physiological monitoring devices. More particularly, the invention relates to optical blood pressure measurement cuffs with wireless data transmission."#;

const BACKGROUND_INSTRUCTIONS: &str = r#"Write the Background of the Invention section.

Rules:
- Two to four paragraphs of objective technical prose
- Describe conventional systems and their specific limitations
- Include at least one quantitative fact (a number, percentage or measurement)
- Do not mention the present invention or its advantages
- The final paragraph must end with a statement of need, phrased
  "There is therefore a need for ..."

Example:
Invention: A wearable cuff that measures blood pressure optically and streams readings to a phone.
Background of the Invention:
Conventional blood pressure monitors rely on an inflatable cuff that occludes the artery during every reading. Such oscillometric devices are accurate in clinical settings, yet a full inflation cycle takes up to 40 seconds, a limitation that makes frequent or overnight measurement impractical.

There is therefore a need for a blood pressure monitor that measures continuously without occluding the artery."#;

const OBJECTS_INSTRUCTIONS: &str = r#"Write the Objects of the Invention section.

Rules:
- Begin with one sentence: "The primary object of the present invention is to provide ..."
- Then at least five sentences, each on its own line, each beginning
  "It is another object of the present invention to"
- Plain sentences only, no bullet points or numbering

Example:
Invention: A wearable cuff that measures blood pressure optically and streams readings to a phone.
Objects of the Invention:
The primary object of the present invention is to provide a cuff that measures blood pressure without occluding the artery.
It is another object of the present invention to provide continuous monitoring during sleep.
It is another object of the present invention to stream each reading to a paired phone.
It is another object of the present invention to provide a cuff light enough for all-day wear.
It is another object of the present invention to alert the wearer when readings drift outside a configured range.
It is another object of the present invention to operate for a week on one battery charge."#;

const SUMMARY_INSTRUCTIONS: &str = r#"Write the Summary of the Invention section.

Rules:
- One or two paragraphs, three to five sentences in total
- State plainly what the invention provides and its principal components
- Stay consistent with the invention description; claim nothing beyond it

Example:
Invention: A wearable cuff that measures blood pressure optically and streams readings to a phone.
Summary of the Invention:
The present invention provides a wearable cuff that measures blood pressure through an optical sensor held lightly against the wrist. The cuff samples the pulse waveform continuously, derives systolic and diastolic pressure from the sampled waveform, and streams each reading to a paired phone for display and storage."#;

const DRAWINGS_INSTRUCTIONS: &str = r#"Write the Brief Description of the Drawings section.

Rules:
- Exactly one line per figure, no prose before or after
- Every line reads "Figure N: illustrates ..." with N numbered sequentially from 1
- Derive each caption from the drawing summary provided below

Example:
Drawing summary: Fig 1 cuff on wrist, Fig 2 sensor module cross section, Fig 3 processing flowchart
Brief Description of the Drawings:
Figure 1: illustrates the cuff worn on a wrist.
Figure 2: illustrates a cross section of the optical sensor module.
Figure 3: illustrates a flowchart of the pressure computation."#;

const DETAILED_INSTRUCTIONS: &str = r#"Write the Detailed Description of the Invention section.

Rules:
- Three to six paragraphs of technical prose
- Reference the figures by number, e.g. "Referring to Figure 1"
- Introduce embodiments with "In one embodiment"
- Describe every element recited in the claims
- Close with a sentence noting that modifications may be made without
  departing from the scope of the invention

Example:
Invention: A wearable cuff that measures blood pressure optically and streams readings to a phone.
Detailed Description of the Invention:
Referring to the drawings, the present invention is a wearable cuff that derives blood pressure from an optical pulse measurement. As shown in Figure 1, the cuff wraps around the wrist and holds the sensor module of Figure 2 lightly against the skin.

In one embodiment, the sensor module carries two light emitters and a photodiode, and a processor derives systolic and diastolic pressure from the reflected waveform following the flowchart of Figure 3. Each reading is streamed to a paired phone over a low power radio link.

Many modifications may be made to the embodiments described above without departing from the scope of the invention."#;

const CLAIMS_INSTRUCTIONS: &str = r#"Write the Claims section.

Rules:
- Exactly six claims, each starting with its number, e.g. "1. "
- Claim 1 is independent: "A system for ..., comprising:" followed by the elements
- Claims 2 to 5 are dependent: "The system of claim N, wherein ..." and may
  only reference a lower-numbered claim
- Claim 6 is a method claim: "A method of ..., comprising ..."
- Use precise antecedent basis: introduce elements with "a", refer back with "the"

Example:
Invention: A wearable cuff that measures blood pressure optically and streams readings to a phone.
Claims:
1. A system for monitoring blood pressure, comprising: a wearable cuff; an optical sensor held against the skin by the cuff; and a processor that derives blood pressure from a signal of the optical sensor.
2. The system of claim 1, wherein the optical sensor comprises two light emitters and a photodiode.
3. The system of claim 1, wherein the processor streams each reading to a paired phone.
4. The system of claim 2, wherein the light emitters operate at different wavelengths.
5. The system of claim 1, wherein the cuff carries a battery sized for one week of operation.
6. A method of monitoring blood pressure, comprising holding an optical sensor against the skin, sampling a pulse waveform, and deriving blood pressure from the sampled waveform."#;

/// A ready-to-send prompt and the priming prefix it ends with.
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    pub text: String,
    pub echo_prefix: Option<String>,
}

/// Assemble the drafting prompt for one attempt at one section.
pub fn build_prompt(
    kind: SectionKind,
    request: &SectionRequest,
    prior_art: &[PriorArtHit],
    figure_count: usize,
    attempt: u32,
) -> BuiltPrompt {
    let mut prompt = String::with_capacity(2048);
    prompt.push_str(DRAFTER_PREAMBLE);
    prompt.push_str("\n\n");
    prompt.push_str(instructions_for(kind));
    prompt.push_str("\n\n");

    push_block(&mut prompt, "Invention description", request.description.as_str());

    match kind {
        SectionKind::FieldOfInvention | SectionKind::Summary => {
            if let Some(title) = request.context_text(SectionKind::Title) {
                push_block(&mut prompt, "Working title", title);
            }
        }
        SectionKind::BriefDescriptionOfDrawings => {
            if let Some(summary) = request.drawing_context() {
                push_block(&mut prompt, "Drawing summary", summary);
            }
            prompt.push_str(&format!(
                "The application has exactly {figure_count} figure{}.\n\n",
                if figure_count == 1 { "" } else { "s" }
            ));
        }
        SectionKind::DetailedDescription => {
            if let Some(claims) = request.context_text(SectionKind::Claims) {
                push_block(&mut prompt, "Claims to support", claims);
            }
            if let Some(drawings) = request.drawing_context() {
                push_block(&mut prompt, "Drawing summary", drawings);
            }
            if let Some(summary) = request.context_text(SectionKind::Summary) {
                push_block(&mut prompt, "Summary of the invention", summary);
            }
        }
        SectionKind::Claims => {
            if let Some(summary) = request.context_text(SectionKind::Summary) {
                push_block(&mut prompt, "Summary of the invention", summary);
            }
            push_prior_art(&mut prompt, prior_art);
        }
        _ => {}
    }

    if attempt > 1 {
        prompt.push_str(&format!(
            "This is attempt {attempt}. Earlier drafts broke the formatting rules above; follow every rule exactly this time.\n\n"
        ));
    }

    let echo_prefix = SamplingConfig::for_section(kind).echo_prefix;
    prompt.push_str(&heading_label(kind));
    if let Some(ref prefix) = echo_prefix {
        prompt.push_str(prefix);
    }

    BuiltPrompt {
        text: prompt,
        echo_prefix,
    }
}

fn instructions_for(kind: SectionKind) -> &'static str {
    match kind {
        SectionKind::Title => TITLE_INSTRUCTIONS,
        SectionKind::FieldOfInvention => FIELD_INSTRUCTIONS,
        SectionKind::Background => BACKGROUND_INSTRUCTIONS,
        SectionKind::Objects => OBJECTS_INSTRUCTIONS,
        SectionKind::Summary => SUMMARY_INSTRUCTIONS,
        SectionKind::BriefDescriptionOfDrawings => DRAWINGS_INSTRUCTIONS,
        SectionKind::DetailedDescription => DETAILED_INSTRUCTIONS,
        SectionKind::Claims => CLAIMS_INSTRUCTIONS,
    }
}

/// The line the prompt ends on, directly before the priming prefix.
fn heading_label(kind: SectionKind) -> String {
    match kind {
        SectionKind::Title => "Title: ".to_string(),
        _ => format!("{}:\n", kind.heading()),
    }
}

fn push_block(prompt: &mut String, label: &str, body: &str) {
    prompt.push_str(label);
    prompt.push_str(":\n");
    prompt.push_str(body.trim());
    prompt.push_str("\n\n");
}

fn push_prior_art(prompt: &mut String, prior_art: &[PriorArtHit]) {
    if prior_art.is_empty() {
        return;
    }
    prompt.push_str("Related prior art, for differentiation only. Do not copy this language; claim around it:\n");
    for (i, hit) in prior_art.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, hit.excerpt.trim()));
    }
    prompt.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: SectionKind) -> SectionRequest {
        SectionRequest::new(
            kind,
            "An irrigation controller that schedules watering from buried soil moisture sensors.",
        )
    }

    #[test]
    fn test_prompt_ends_with_priming_prefix() {
        for kind in SectionKind::ALL {
            let built = build_prompt(kind, &request(kind), &[], 2, 1);
            if let Some(prefix) = &built.echo_prefix {
                assert!(
                    built.text.ends_with(prefix.as_str()),
                    "{kind} prompt does not end with its prefix"
                );
            }
        }
    }

    #[test]
    fn test_every_template_embeds_a_worked_example() {
        for kind in SectionKind::ALL {
            let built = build_prompt(kind, &request(kind), &[], 2, 1);
            assert!(
                built.text.contains("Example:"),
                "{kind} prompt carries no worked example"
            );
        }
    }

    #[test]
    fn test_claims_prompt_lists_all_retrieved_excerpts() {
        let hits = vec![
            PriorArtHit {
                excerpt: "A drip irrigation network with manual valves.".to_string(),
                score: 0.9,
            },
            PriorArtHit {
                excerpt: "A rain gauge that suspends scheduled watering.".to_string(),
                score: 0.8,
            },
            PriorArtHit {
                excerpt: "A soil probe with a resistive moisture element.".to_string(),
                score: 0.7,
            },
        ];
        let built = build_prompt(SectionKind::Claims, &request(SectionKind::Claims), &hits, 0, 1);
        for hit in &hits {
            assert!(built.text.contains(hit.excerpt.trim()));
        }
        let first = built.text.find("drip irrigation").unwrap();
        let second = built.text.find("rain gauge").unwrap();
        let third = built.text.find("resistive moisture").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_claims_prompt_without_index_has_no_prior_art_block() {
        let built = build_prompt(SectionKind::Claims, &request(SectionKind::Claims), &[], 0, 1);
        assert!(!built.text.contains("Related prior art"));
    }

    #[test]
    fn test_retry_attempts_escalate_strictness() {
        let first = build_prompt(SectionKind::Background, &request(SectionKind::Background), &[], 0, 1);
        let third = build_prompt(SectionKind::Background, &request(SectionKind::Background), &[], 0, 3);
        assert!(!first.text.contains("attempt"));
        assert!(third.text.contains("This is attempt 3"));
    }

    #[test]
    fn test_drawings_prompt_names_figure_count_and_summary() {
        let req = request(SectionKind::BriefDescriptionOfDrawings)
            .with_drawing_summary("Fig 1 overall system, Fig 2 sensor cross-section, Fig 3 flowchart");
        let built = build_prompt(SectionKind::BriefDescriptionOfDrawings, &req, &[], 3, 1);
        assert!(built.text.contains("exactly 3 figures"));
        assert!(built.text.contains("sensor cross-section"));
    }

    #[test]
    fn test_detailed_prompt_carries_claims_context() {
        let claims = crate::model::SectionResult {
            kind: SectionKind::Claims,
            text: "1. A system for automated irrigation, comprising: a sensor.".to_string(),
            verdict: crate::model::ValidationVerdict::clean(),
            attempts_used: 1,
            drafted_at: chrono::Utc::now(),
        };
        let req = request(SectionKind::DetailedDescription)
            .with_context(claims)
            .with_drawing_summary("Fig 1 shows the controller");
        let built = build_prompt(SectionKind::DetailedDescription, &req, &[], 1, 1);
        assert!(built.text.contains("Claims to support"));
        assert!(built.text.contains("A system for automated irrigation"));
        assert!(built.text.contains("Fig 1 shows the controller"));
    }
}
