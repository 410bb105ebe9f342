use std::fs;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod engine;
mod index;
mod model;
mod service;

use engine::LlamaServerClient;
use index::InMemoryPriorArtIndex;
use model::{Config, InventionDescription};
use service::{CpcClassifier, DraftingService, PatentSnapshot, verify};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(description_path) = args.first() else {
        eprintln!("usage: patent-drafter <description-file> [drawing-summary-file]");
        std::process::exit(2);
    };

    let description = fs::read_to_string(description_path)?.trim().to_string();
    let drawing_summary = match args.get(1) {
        Some(path) => Some(fs::read_to_string(path)?.trim().to_string()),
        None => None,
    };

    let config = Config::from_env();
    let engine_url = config.engine_url().expect("Invalid engine URL");
    let engine = Arc::new(
        LlamaServerClient::with_timeout(
            engine_url,
            Duration::from_secs(config.engine.timeout_secs),
        )
        .expect("Failed to build engine client"),
    );

    let mut drafter = DraftingService::new(engine.clone()).with_retry(config.retry.clone());
    if let Some(path) = &config.index.prior_art_path {
        match InMemoryPriorArtIndex::load(engine.clone(), path) {
            Ok(corpus) => {
                drafter = drafter.with_prior_art(Arc::new(corpus), config.index.top_k);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prior-art corpus unavailable, drafting claims without it");
            }
        }
    }

    tracing::info!(source = %description_path, "Drafting patent application");
    let draft = match drafter
        .draft_document(description.clone(), drawing_summary.as_deref())
        .await
    {
        Ok(draft) => draft,
        Err(e) => {
            tracing::error!(error = %e, "Drafting aborted");
            std::process::exit(1);
        }
    };

    println!("{}", draft.assemble());

    println!("\n--- Section verdicts ---");
    for section in &draft.sections {
        if section.is_valid() {
            println!(
                "{:<40} ok    ({} warnings, {} attempts)",
                section.kind.heading(),
                section.verdict.warnings.len(),
                section.attempts_used
            );
        } else {
            println!(
                "{:<40} FLAGGED ({} issues, {} attempts)",
                section.kind.heading(),
                section.verdict.issues.len(),
                section.attempts_used
            );
            for issue in &section.verdict.issues {
                println!("    {}: {}", issue.rule, issue.message);
            }
        }
    }

    let description = InventionDescription::from(description);

    if let Some(path) = &config.index.cpc_labels_path {
        match CpcClassifier::load(engine.clone(), path).await {
            Ok(classifier) => match classifier.classify(description.as_str()).await {
                Ok(Some(prediction)) => {
                    println!(
                        "\nCPC classification: {} ({:.2}) - {}",
                        prediction.code, prediction.score, prediction.description
                    );
                }
                Ok(None) => tracing::warn!("CPC label set is empty, skipping classification"),
                Err(e) => tracing::warn!(error = %e, "CPC classification failed"),
            },
            Err(e) => tracing::warn!(error = %e, "CPC label set unavailable"),
        }
    }

    match verify(&PatentSnapshot::from_draft(&description, &draft)) {
        Ok(report) => {
            println!("\n--- Verification ---");
            for entry in &report.scorecard.scores {
                println!("{:<16} {:>5.1} / {:.0}", entry.rubric.as_str(), entry.score, entry.out_of);
            }
            println!(
                "overall {:.1} / 100  filing ready: {}",
                report.scorecard.overall, report.scorecard.filing_ready
            );
            for action in &report.scorecard.actions {
                println!("  next: {action}");
            }
        }
        Err(e) => tracing::warn!(error = %e, "Verification skipped"),
    }

    Ok(())
}
