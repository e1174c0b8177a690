use crate::enrichment::{EnrichmentConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::pipeline::PipelineConfig;
use crate::types::{FetchConfig, IngestError, Result};
use clap::Parser;
use std::time::Duration;

/// Command line and environment configuration for a run.
///
/// Every flag can also be set through the environment (a `.env` file is
/// loaded first by the binary).
#[derive(Debug, Clone, Parser)]
#[command(name = "feed-enricher", version, about = "Ingest feeds, enrich new articles, store them")]
pub struct Cli {
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 14)]
    pub db_max_connections: u32,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, env = "MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, env = "ENRICHMENT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub enrichment_base_url: String,

    #[arg(long, env = "INGEST_CONCURRENCY", default_value_t = 4)]
    pub concurrency: usize,

    #[arg(
        long,
        env = "LOOKBACK_HOURS",
        default_value_t = 24,
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    pub lookback_hours: i64,

    #[arg(long, env = "COST_CEILING", default_value_t = 3_500_000)]
    pub cost_ceiling: u64,

    #[arg(long, env = "COOLDOWN_SECS", default_value_t = 65)]
    pub cooldown_secs: u64,

    #[arg(long, env = "ITEM_DELAY_MS", default_value_t = 500)]
    pub item_delay_ms: u64,

    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 10)]
    pub http_timeout_secs: u64,

    #[arg(long, env = "USER_AGENT")]
    pub user_agent: Option<String>,

    #[arg(long, env = "FEED_MAX_RETRIES", default_value_t = 2)]
    pub feed_max_retries: u32,

    #[arg(long, env = "FEED_RETRY_DELAY_SECS", default_value_t = 1)]
    pub feed_retry_delay_secs: u64,

    /// Only poll these registry ids, e.g. `--source-ids 1,2`
    #[arg(long, env = "SOURCE_IDS", value_delimiter = ',')]
    pub source_ids: Vec<i64>,
}

impl Cli {
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let lookback = chrono::Duration::try_hours(self.lookback_hours)
            .filter(|window| *window > chrono::Duration::zero())
            .ok_or_else(|| {
                IngestError::Config(format!("lookback of {} hours is out of range", self.lookback_hours))
            })?;

        Ok(PipelineConfig {
            concurrency: self.concurrency.max(1),
            lookback,
            cost_ceiling: self.cost_ceiling,
            cooldown: Duration::from_secs(self.cooldown_secs),
            item_delay: Duration::from_millis(self.item_delay_ms),
            source_ids: if self.source_ids.is_empty() {
                None
            } else {
                Some(self.source_ids.clone())
            },
        })
    }

    pub fn fetch_config(&self) -> FetchConfig {
        let defaults = FetchConfig::default();
        FetchConfig {
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            timeout_seconds: self.http_timeout_secs,
            max_retries: self.feed_max_retries,
            retry_delay_seconds: self.feed_retry_delay_secs,
            ..defaults
        }
    }

    pub fn enrichment_config(&self) -> EnrichmentConfig {
        EnrichmentConfig {
            model: self.model.clone(),
            base_url: self.enrichment_base_url.clone(),
            ..EnrichmentConfig::new(self.api_key.clone())
        }
    }

    /// Connection string safe to log.
    pub fn masked_database_url(&self) -> String {
        mask_password(&self.database_url)
    }
}

pub fn mask_password(database_url: &str) -> String {
    match url::Url::parse(database_url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        _ => database_url.to_string(),
    }
}
