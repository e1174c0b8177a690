use crate::types::{EnrichmentRequest, EnrichmentResult, FeedSource, Result, ValidatedArticle};
use async_trait::async_trait;

/// Network access for feed documents and article bodies
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Raw feed document (RSS/Atom) behind a source URL
    async fn fetch_feed(&self, url: &str) -> Result<String>;

    /// Raw article body behind an item URL. Never retried.
    async fn fetch_article(&self, url: &str) -> Result<String>;
}

/// The external content-analysis capability.
///
/// Implementations return the capability's text verbatim together with the
/// token cost it reported; interpreting the text is the validator's job.
#[async_trait]
pub trait EnrichmentClient: Send + Sync {
    fn client_name(&self) -> String;

    async fn enrich(&self, request: &EnrichmentRequest) -> Result<EnrichmentResult>;
}

/// Relational storage for enriched articles and the feed registry
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn exists(&self, url: &str) -> Result<bool>;

    /// Plain insert. A duplicate url is an error, never ignored.
    async fn insert(&self, article: &ValidatedArticle) -> Result<()>;

    /// Registered feeds, ordered by id. `ids` narrows the registry when set.
    async fn list_sources(&self, ids: Option<&[i64]>) -> Result<Vec<FeedSource>>;
}
