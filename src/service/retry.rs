//! Generate-validate-retry loop shared by every section
//!
//! Each round builds a fresh prompt, raises the sampling temperature by a
//! fixed step, and validates the normalized draft. A valid draft within the
//! warning budget is accepted immediately; otherwise the lowest-scoring
//! attempt survives, with a draft that has text always outranking one that
//! normalized to nothing and the earliest attempt winning ties.

use chrono::Utc;

use super::normalize::normalize;
use super::prompts::build_prompt;
use super::validate::validate;
use crate::engine::{GenerationClient, GenerationError, SamplingConfig};
use crate::index::PriorArtHit;
use crate::model::{
    GenerationAttempt, RetryConfig, SectionRequest, SectionResult, ValidationVerdict,
};

pub(crate) async fn run_attempts(
    engine: &dyn GenerationClient,
    request: &SectionRequest,
    prior_art: &[PriorArtHit],
    figure_count: usize,
    config: &RetryConfig,
) -> SectionResult {
    let kind = request.kind;
    let base = SamplingConfig::for_section(kind);
    let mut best: Option<GenerationAttempt> = None;
    let mut last_error: Option<GenerationError> = None;

    for attempt in 1..=config.max_attempts {
        let temperature = (base.temperature + config.temperature_step * (attempt - 1) as f32)
            .min(config.max_temperature);
        let sampling = base.clone().with_temperature(temperature);
        let prompt = build_prompt(kind, request, prior_art, figure_count, attempt);

        tracing::debug!(section = %kind, attempt, temperature, "Attempting generation");

        let completion = match engine.generate(&prompt.text, &sampling).await {
            Ok(completion) => completion,
            Err(e) => {
                tracing::warn!(section = %kind, attempt, error = %e, "Generation call failed");
                last_error = Some(e);
                continue;
            }
        };

        let raw = match &prompt.echo_prefix {
            Some(prefix) => format!("{prefix}{completion}"),
            None => completion,
        };
        let normalized = normalize(kind, &raw);
        let verdict = validate(kind, &normalized);
        let score = verdict.score();
        let candidate = GenerationAttempt {
            index: attempt,
            raw,
            normalized,
            verdict,
            score,
        };

        if candidate.verdict.is_valid()
            && candidate.verdict.warnings.len() <= config.accept_warning_limit
        {
            tracing::info!(
                section = %kind,
                attempt,
                warnings = candidate.verdict.warnings.len(),
                "Draft accepted"
            );
            return result_from(candidate, attempt, request);
        }

        tracing::debug!(
            section = %kind,
            attempt,
            score,
            issues = candidate.verdict.issues.len(),
            warnings = candidate.verdict.warnings.len(),
            "Draft rejected"
        );

        // A draft whose text survived normalization beats one that came out
        // empty, whatever the scores say.
        let improves = match &best {
            Some(current) => match (candidate.normalized.is_empty(), current.normalized.is_empty())
            {
                (false, true) => true,
                (true, false) => false,
                _ => candidate.score < current.score,
            },
            None => true,
        };
        if improves {
            best = Some(candidate);
        }
    }

    match best {
        Some(attempt) => {
            tracing::warn!(
                section = %kind,
                score = attempt.score,
                attempts = config.max_attempts,
                "Retries exhausted, keeping best draft"
            );
            result_from(attempt, config.max_attempts, request)
        }
        None => {
            let message = match last_error {
                Some(e) => format!("all {} generation attempts failed: {e}", config.max_attempts),
                None => format!("all {} generation attempts failed", config.max_attempts),
            };
            tracing::error!(section = %kind, error = %message, "Section could not be drafted");
            SectionResult {
                kind,
                text: String::new(),
                verdict: ValidationVerdict::generation_failure(message),
                attempts_used: config.max_attempts,
                drafted_at: Utc::now(),
            }
        }
    }
}

fn result_from(attempt: GenerationAttempt, attempts_used: u32, request: &SectionRequest) -> SectionResult {
    SectionResult {
        kind: request.kind,
        text: attempt.normalized,
        verdict: attempt.verdict,
        attempts_used,
        drafted_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RuleId, SectionKind};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedEngine {
        responses: Mutex<VecDeque<Result<String, GenerationError>>>,
        calls: AtomicU32,
        temperatures: Mutex<Vec<f32>>,
    }

    impl ScriptedEngine {
        fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicU32::new(0),
                temperatures: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationClient for ScriptedEngine {
        async fn generate(
            &self,
            _prompt: &str,
            sampling: &SamplingConfig,
        ) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.temperatures.lock().unwrap().push(sampling.temperature);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GenerationError::ParseError("script exhausted".into())))
        }
    }

    fn title_request() -> SectionRequest {
        SectionRequest::new(
            SectionKind::Title,
            "An irrigation controller that schedules watering from buried soil moisture sensors.",
        )
    }

    const CLEAN_TITLE: &str = "Soil Moisture Sensing Array With Predictive Irrigation Controller";

    #[tokio::test]
    async fn test_valid_first_attempt_stops_after_one_call() {
        let engine = ScriptedEngine::new(vec![
            Ok(CLEAN_TITLE.to_string()),
            Ok("should never be requested".to_string()),
        ]);
        let result =
            run_attempts(&engine, &title_request(), &[], 0, &RetryConfig::default()).await;

        assert_eq!(engine.calls(), 1);
        assert_eq!(result.attempts_used, 1);
        assert!(result.is_valid());
        assert_eq!(result.text, CLEAN_TITLE);
    }

    #[tokio::test]
    async fn test_temperature_escalates_by_step_across_attempts() {
        let engine = ScriptedEngine::new(vec![
            Ok("bad".to_string()),
            Ok("bad".to_string()),
            Ok("bad".to_string()),
        ]);
        let result =
            run_attempts(&engine, &title_request(), &[], 0, &RetryConfig::default()).await;

        let temperatures = engine.temperatures.lock().unwrap().clone();
        assert_eq!(temperatures.len(), 3);
        for (observed, expected) in temperatures.iter().zip([0.5f32, 0.6, 0.7]) {
            assert!((observed - expected).abs() < 1e-4, "temperatures: {temperatures:?}");
        }
        assert_eq!(result.attempts_used, 3);
        assert!(!result.is_valid());
    }

    #[tokio::test]
    async fn test_exhaustion_keeps_lowest_scoring_attempt() {
        // Attempt 1: three issues. Attempt 2: one issue. Attempt 3: three again.
        let engine = ScriptedEngine::new(vec![
            Ok("A Novel System for Improved Irrigation Using Our Invention".to_string()),
            Ok("The Irrigation Controller For Distributed Fields".to_string()),
            Ok("A Novel System for Improved Irrigation Using Our Invention".to_string()),
        ]);
        let result =
            run_attempts(&engine, &title_request(), &[], 0, &RetryConfig::default()).await;

        assert_eq!(engine.calls(), 3);
        assert_eq!(result.text, "The Irrigation Controller For Distributed Fields");
        assert_eq!(result.verdict.issues.len(), 1);
        assert!(result.score() <= 3.0);
    }

    #[tokio::test]
    async fn test_heading_echo_never_displaces_usable_text() {
        // Attempt 1 is a bare heading echo: it normalizes to nothing and
        // scores a single empty-text issue, below the later attempts. The
        // flawed but usable attempt 2 must still win.
        let engine = ScriptedEngine::new(vec![
            Ok("TITLE OF THE INVENTION".to_string()),
            Ok("A Novel System for Improved Irrigation Using Our Invention".to_string()),
            Ok("A Novel System for Improved Irrigation Using Our Invention".to_string()),
        ]);
        let result =
            run_attempts(&engine, &title_request(), &[], 0, &RetryConfig::default()).await;

        assert_eq!(engine.calls(), 3);
        assert_eq!(
            result.text,
            "A Novel System for Improved Irrigation Using Our Invention"
        );
        assert!(!result.is_valid());
        assert_eq!(result.attempts_used, 3);
    }

    #[tokio::test]
    async fn test_all_failures_yield_empty_text_and_failure_issue() {
        let engine = ScriptedEngine::new(vec![
            Err(GenerationError::ParseError("connection refused".into())),
            Err(GenerationError::ParseError("connection refused".into())),
            Err(GenerationError::ParseError("connection refused".into())),
        ]);
        let result =
            run_attempts(&engine, &title_request(), &[], 0, &RetryConfig::default()).await;

        assert_eq!(engine.calls(), 3);
        assert!(result.text.is_empty());
        assert_eq!(result.verdict.issues.len(), 1);
        assert_eq!(result.verdict.issues[0].rule, RuleId::GenerationFailed);
    }

    #[tokio::test]
    async fn test_transient_failure_then_success() {
        let engine = ScriptedEngine::new(vec![
            Err(GenerationError::ParseError("timeout".into())),
            Ok(CLEAN_TITLE.to_string()),
        ]);
        let result =
            run_attempts(&engine, &title_request(), &[], 0, &RetryConfig::default()).await;

        assert_eq!(engine.calls(), 2);
        assert_eq!(result.attempts_used, 2);
        assert!(result.is_valid());
    }

    #[tokio::test]
    async fn test_retry_budget_of_one_means_single_attempt() {
        let engine = ScriptedEngine::new(vec![Ok("bad".to_string())]);
        let config = RetryConfig {
            max_attempts: 1,
            ..RetryConfig::default()
        };
        let result = run_attempts(&engine, &title_request(), &[], 0, &config).await;

        assert_eq!(engine.calls(), 1);
        assert_eq!(result.attempts_used, 1);
    }

    #[tokio::test]
    async fn test_valid_draft_over_warning_budget_is_not_accepted_early() {
        // Valid field text, but two warnings: no hierarchical qualifier and
        // paragraph count outside the ideal band.
        let completion = " to irrigation control systems that measure soil moisture with buried probes.\n\nProbe arrays report to a shared controller node.\n\nSchedules derive from measured values over time across the whole field.";
        let engine = ScriptedEngine::new(vec![
            Ok(completion.to_string()),
            Ok(completion.to_string()),
            Ok(completion.to_string()),
        ]);
        let request = SectionRequest::new(
            SectionKind::FieldOfInvention,
            "An irrigation controller that schedules watering from buried soil moisture sensors.",
        );
        let result = run_attempts(&engine, &request, &[], 0, &RetryConfig::default()).await;

        assert_eq!(engine.calls(), 3);
        assert_eq!(result.attempts_used, 3);
        assert!(result.is_valid());
        assert_eq!(result.verdict.warnings.len(), 2);
    }
}
