pub mod types;
pub mod traits;
pub mod config;
pub mod fetcher;
pub mod parser;
pub mod gate;
pub mod enrichment;
pub mod validator;
pub mod throttle;
pub mod store;
pub mod stats;
pub mod pipeline;

pub use types::*;
pub use traits::{ArticleStore, ContentFetcher, EnrichmentClient};
pub use config::Cli;
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use gate::GateDecision;
pub use enrichment::{EnrichmentConfig, GeminiClient};
pub use throttle::CostThrottle;
pub use store::PgArticleStore;
pub use stats::{Outcome, RunStatistics};
pub use pipeline::{IngestionPipeline, PipelineConfig};
