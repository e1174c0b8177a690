#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use feed_enricher::{
    ArticleStore, ContentFetcher, EnrichmentClient, EnrichmentRequest, EnrichmentResult,
    FeedSource, IngestError, PipelineConfig, Result, ValidatedArticle,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Defaults with the politeness delay switched off.
pub fn test_config() -> PipelineConfig {
    PipelineConfig {
        item_delay: Duration::ZERO,
        ..PipelineConfig::default()
    }
}

pub fn rss(items: &[(&str, Option<DateTime<Utc>>)]) -> String {
    let mut body = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rss version=\"2.0\"><channel>\
         <title>Test feed</title><link>https://feed.example</link><description>t</description>\n",
    );
    for (url, published) in items {
        body.push_str("<item><title>item</title>");
        body.push_str(&format!("<link>{}</link>", url));
        if let Some(ts) = published {
            body.push_str(&format!("<pubDate>{}</pubDate>", ts.to_rfc2822()));
        }
        body.push_str("</item>\n");
    }
    body.push_str("</channel></rss>");
    body
}

pub fn enrichment_json(title: &str) -> String {
    format!(
        "Sure! Here is the analysis:\n{{\"title\":\"{}\",\"content\":\"summary of {}\",\"rating\":4,\"category\":\"tech\",\"image_url\":\"https://img.example/{}.png\"}}\nLet me know if you need more.",
        title, title, title
    )
}

/// Serves canned feed documents and article bodies.
#[derive(Default)]
pub struct FakeFetcher {
    feeds: HashMap<String, String>,
    articles: HashMap<String, String>,
    article_requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn with_feed(mut self, url: &str, document: String) -> Self {
        self.feeds.insert(url.to_string(), document);
        self
    }

    pub fn with_article(mut self, url: &str, body: &str) -> Self {
        self.articles.insert(url.to_string(), body.to_string());
        self
    }

    pub fn article_requests(&self) -> Vec<String> {
        self.article_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for FakeFetcher {
    async fn fetch_feed(&self, url: &str) -> Result<String> {
        self.feeds
            .get(url)
            .cloned()
            .ok_or_else(|| IngestError::SourceRetrieval {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            })
    }

    async fn fetch_article(&self, url: &str) -> Result<String> {
        self.article_requests.lock().unwrap().push(url.to_string());
        self.articles
            .get(url)
            .cloned()
            .ok_or_else(|| IngestError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Answers per url with a fixed text and cost; unknown urls get a service error.
#[derive(Default)]
pub struct ScriptedEnricher {
    responses: HashMap<String, (String, u64)>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedEnricher {
    pub fn respond(mut self, url: &str, raw_text: String, cost: u64) -> Self {
        self.responses.insert(url.to_string(), (raw_text, cost));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnrichmentClient for ScriptedEnricher {
    fn client_name(&self) -> String {
        "scripted".to_string()
    }

    async fn enrich(&self, request: &EnrichmentRequest) -> Result<EnrichmentResult> {
        self.requests.lock().unwrap().push(request.url.clone());
        match self.responses.get(&request.url) {
            Some((raw_text, cost)) => Ok(EnrichmentResult {
                raw_text: raw_text.clone(),
                cost: *cost,
            }),
            None => Err(IngestError::Service("model overloaded".to_string())),
        }
    }
}

/// In-memory store with the same uniqueness rule as the real table.
#[derive(Default)]
pub struct MemoryStore {
    articles: Mutex<HashMap<String, ValidatedArticle>>,
    sources: Vec<FeedSource>,
    reject_inserts: bool,
    fail_source_listing: bool,
    insert_attempts: AtomicUsize,
}

impl MemoryStore {
    pub fn with_source(mut self, id: i64, url: &str) -> Self {
        self.sources.push(FeedSource {
            id,
            url: url.to_string(),
        });
        self
    }

    pub fn with_article(self, url: &str) -> Self {
        self.articles.lock().unwrap().insert(
            url.to_string(),
            ValidatedArticle {
                url: url.to_string(),
                image_url: String::new(),
                title: "already here".to_string(),
                summary: String::new(),
                rating: 1,
                category: "misc".to_string(),
                feed_date: None,
            },
        );
        self
    }

    pub fn rejecting_inserts(mut self) -> Self {
        self.reject_inserts = true;
        self
    }

    pub fn failing_source_listing(mut self) -> Self {
        self.fail_source_listing = true;
        self
    }

    pub fn get(&self, url: &str) -> Option<ValidatedArticle> {
        self.articles.lock().unwrap().get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.articles.lock().unwrap().len()
    }

    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn exists(&self, url: &str) -> Result<bool> {
        Ok(self.articles.lock().unwrap().contains_key(url))
    }

    async fn insert(&self, article: &ValidatedArticle) -> Result<()> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if self.reject_inserts {
            return Err(IngestError::Storage(sqlx::Error::PoolTimedOut));
        }
        let mut articles = self.articles.lock().unwrap();
        if articles.contains_key(&article.url) {
            return Err(IngestError::DuplicateArticle {
                url: article.url.clone(),
            });
        }
        articles.insert(article.url.clone(), article.clone());
        Ok(())
    }

    async fn list_sources(&self, ids: Option<&[i64]>) -> Result<Vec<FeedSource>> {
        if self.fail_source_listing {
            return Err(IngestError::Storage(sqlx::Error::PoolClosed));
        }
        Ok(self
            .sources
            .iter()
            .filter(|s| ids.map_or(true, |ids| ids.contains(&s.id)))
            .cloned()
            .collect())
    }
}
