use crate::parser::FeedParser;
use crate::traits::ContentFetcher;
use crate::types::{FetchConfig, IngestError, Result};
use async_trait::async_trait;
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// reqwest-backed fetcher for feeds and article pages.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    fn retry_policy(&self) -> ExponentialBackoff<backoff::SystemClock> {
        let base = Duration::from_secs(self.config.retry_delay_seconds);
        ExponentialBackoff {
            current_interval: base,
            initial_interval: base,
            max_interval: base * 32,
            multiplier: 2.0,
            max_elapsed_time: Some(base * 60),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ContentFetcher for Fetcher {
    async fn fetch_feed(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();
        debug!("Fetching feed: {}", url);

        let mut backoff = self.retry_policy();
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            let result = match self.get(url).await {
                Ok(response) => response.text().await.map_err(IngestError::from),
                Err(e) => Err(e),
            };

            match result {
                Ok(content) => {
                    if !FeedParser::is_valid_feed_content(&content) {
                        return Err(IngestError::SourceRetrieval {
                            url: url.to_string(),
                            reason: "response is not an RSS/Atom document".to_string(),
                        });
                    }
                    info!(
                        "Fetched feed {} ({} bytes in {}ms)",
                        url,
                        content.len(),
                        start_time.elapsed().as_millis()
                    );
                    return Ok(content);
                }
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.config.max_retries {
                        if let Some(delay) = backoff.next_backoff() {
                            warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                    }
                    break;
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        error!("Failed to fetch feed after {} attempts: {}", self.config.max_retries + 1, url);

        Err(IngestError::SourceRetrieval {
            url: url.to_string(),
            reason,
        })
    }

    async fn fetch_article(&self, url: &str) -> Result<String> {
        debug!("Fetching article: {}", url);
        let response = self.get(url).await?;
        let content = response.text().await?;
        Ok(content)
    }
}
