pub mod classifier;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod retry;
pub mod rules;
pub mod validate;
pub mod verifier;

pub use classifier::{CpcClassifier, CpcLabel, CpcPrediction};
pub use normalize::normalize;
pub use pipeline::{DocumentDraft, DraftError, DraftingService};
pub use validate::validate;
pub use verifier::{PatentSnapshot, VerifyError, verify};
