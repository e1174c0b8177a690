use crate::gate::{self, GateDecision};
use crate::parser::FeedParser;
use crate::stats::{Outcome, RunStatistics};
use crate::throttle::{CostThrottle, DEFAULT_COOLDOWN, DEFAULT_COST_CEILING};
use crate::traits::{ArticleStore, ContentFetcher, EnrichmentClient};
use crate::types::{EnrichmentRequest, EnrichmentResult, FeedItem, IngestError, Result};
use crate::validator;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Items in flight at once.
    pub concurrency: usize,
    pub lookback: chrono::Duration,
    pub cost_ceiling: u64,
    pub cooldown: Duration,
    /// Pause after each enrichment call that produced output.
    pub item_delay: Duration,
    /// Restrict the source registry to these ids.
    pub source_ids: Option<Vec<i64>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            lookback: chrono::Duration::days(1),
            cost_ceiling: DEFAULT_COST_CEILING,
            cooldown: DEFAULT_COOLDOWN,
            item_delay: Duration::from_millis(500),
            source_ids: None,
        }
    }
}

/// Ingest → dedup → enrich → persist coordinator
pub struct IngestionPipeline {
    fetcher: Arc<dyn ContentFetcher>,
    enricher: Arc<dyn EnrichmentClient>,
    store: Arc<dyn ArticleStore>,
    config: PipelineConfig,
}

impl IngestionPipeline {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        enricher: Arc<dyn EnrichmentClient>,
        store: Arc<dyn ArticleStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            enricher,
            store,
            config,
        }
    }

    /// One full pass: read the registry, pull every feed, process every item.
    pub async fn run(&self) -> RunStatistics {
        let run_id = Uuid::new_v4();
        async {
            info!(
                "Starting ingestion run with {} workers using {}",
                self.config.concurrency,
                self.enricher.client_name()
            );
            let items = self.collect_items().await;
            let stats = self.process_items(items).await;
            info!(
                processed = stats.processed,
                inserted = stats.inserted,
                already_present = stats.already_present,
                too_old = stats.too_old,
                errors = stats.errors,
                cumulative_cost = stats.cumulative_cost,
                "Ingestion run finished"
            );
            stats
        }
        .instrument(info_span!("ingest_run", run_id = %run_id))
        .await
    }

    /// Fetch every registered feed in order and flatten their items. A feed
    /// that cannot be fetched or parsed is skipped.
    pub async fn collect_items(&self) -> Vec<FeedItem> {
        let sources = match self.store.list_sources(self.config.source_ids.as_deref()).await {
            Ok(sources) => sources,
            Err(e) => {
                error!("Failed to load feed sources: {}", e);
                Vec::new()
            }
        };

        let mut items = Vec::new();
        for source in sources {
            match self.fetch_source(&source.url).await {
                Ok(mut feed_items) => {
                    info!("Pulled {} items from feed {} ({})", feed_items.len(), source.id, source.url);
                    items.append(&mut feed_items);
                }
                Err(e) => {
                    warn!("Skipping feed {} ({}): {}", source.id, source.url, e);
                }
            }
        }

        items
    }

    async fn fetch_source(&self, url: &str) -> Result<Vec<FeedItem>> {
        let content = self.fetcher.fetch_feed(url).await?;
        FeedParser::parse_items(&content).map_err(|e| IngestError::SourceRetrieval {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// Run `items` through the worker pool. Cost accounting starts from zero
    /// on every call.
    pub async fn process_items(&self, items: Vec<FeedItem>) -> RunStatistics {
        let throttle = CostThrottle::new(self.config.cost_ceiling, self.config.cooldown);
        let workers = self.config.concurrency.max(1);
        info!(
            "Processing {} items (token ceiling {})",
            items.len(),
            throttle.ceiling()
        );

        let mut stats = stream::iter(items)
            .map(|item| self.process_item(item, &throttle))
            .buffer_unordered(workers)
            .fold(RunStatistics::default(), |mut stats, outcome| async move {
                stats.record(outcome);
                stats
            })
            .await;

        stats.cumulative_cost = throttle.total();
        stats
    }

    /// Drive one item to its terminal state. Never fails: errors become
    /// `Outcome::Error`.
    pub async fn process_item(&self, item: FeedItem, throttle: &CostThrottle) -> Outcome {
        let outcome = match self.try_process_item(&item, throttle).await {
            Ok(outcome) => outcome,
            Err(e) => {
                match &e {
                    IngestError::InvalidResponse { reason, raw } => {
                        warn!(url = %item.url, "Enrichment output rejected ({}): {}", reason, raw);
                    }
                    _ => error!(url = %item.url, "Item failed: {}", e),
                }
                Outcome::Error(e.kind())
            }
        };
        debug!(url = %item.url, ?outcome, "Item finished");
        outcome
    }

    async fn try_process_item(&self, item: &FeedItem, throttle: &CostThrottle) -> Result<Outcome> {
        match gate::classify(item, self.store.as_ref(), Utc::now(), self.config.lookback).await? {
            GateDecision::AlreadyPresent => return Ok(Outcome::AlreadyPresent),
            GateDecision::TooOld => return Ok(Outcome::TooOld),
            GateDecision::Eligible => {}
        }

        let content = self.fetcher.fetch_article(&item.url).await?;
        let request = EnrichmentRequest {
            url: item.url.clone(),
            content,
        };
        let result = self.enricher.enrich(&request).await?;
        let total = throttle.record_cost(result.cost);
        debug!(url = %item.url, cost = result.cost, total, "Enrichment done");

        let stored = self.validate_and_store(item, &result, throttle).await;

        if !self.config.item_delay.is_zero() {
            tokio::time::sleep(self.config.item_delay).await;
        }

        stored
    }

    async fn validate_and_store(
        &self,
        item: &FeedItem,
        result: &EnrichmentResult,
        throttle: &CostThrottle,
    ) -> Result<Outcome> {
        let article = validator::validate(&result.raw_text, item)?;

        let inserted = self.store.insert(&article).await;
        // Applies whether or not the insert went through.
        throttle.cool_down_if_needed().await;
        inserted?;

        info!(url = %item.url, title = %article.title, "Article stored");
        Ok(Outcome::Inserted)
    }
}
