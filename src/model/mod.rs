pub mod config;
pub mod report;
pub mod section;
pub mod verdict;

pub use config::{Config, EngineConfig, IndexConfig, RetryConfig};
pub use report::*;
pub use section::*;
pub use verdict::*;
