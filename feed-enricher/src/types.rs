use chrono::{DateTime, Utc};
use serde::Serialize;

/// One entry read from a syndication feed. Lives for a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    pub url: String,
    /// Published timestamp, falling back to the entry's updated timestamp.
    pub published_at: Option<DateTime<Utc>>,
}

impl FeedItem {
    pub fn new(url: impl Into<String>, published_at: Option<DateTime<Utc>>) -> Self {
        Self {
            url: url.into(),
            published_at,
        }
    }
}

/// A registered feed in the store's source registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedSource {
    pub id: i64,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentRequest {
    pub url: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentResult {
    pub raw_text: String,
    /// Tokens billed for this call.
    pub cost: u64,
}

/// The only shape the article store accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedArticle {
    pub url: String,
    pub image_url: String,
    pub title: String,
    pub summary: String,
    pub rating: i32,
    pub category: String,
    pub feed_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) RedditRSSBot/1.0".to_string(),
            timeout_seconds: 10,
            max_retries: 2,
            retry_delay_seconds: 1,
            max_redirects: 5,
        }
    }
}

/// Coarse classification of a failed item, carried by `Outcome::Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Service,
    InvalidResponse,
    Storage,
    SourceRetrieval,
    Config,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Enrichment service error: {0}")]
    Service(String),

    #[error("Invalid enrichment response: {reason}")]
    InvalidResponse { reason: String, raw: String },

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Article already stored: {url}")]
    DuplicateArticle { url: String },

    #[error("Could not retrieve feed {url}: {reason}")]
    SourceRetrieval { url: String, reason: String },

    #[error("Feed parse error: {0}")]
    FeedParse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::Transport(_) | IngestError::HttpStatus { .. } | IngestError::InvalidUrl(_) => {
                ErrorKind::Transport
            }
            IngestError::Service(_) | IngestError::Serialization(_) => ErrorKind::Service,
            IngestError::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            IngestError::Storage(_) | IngestError::DuplicateArticle { .. } => ErrorKind::Storage,
            IngestError::SourceRetrieval { .. } | IngestError::FeedParse(_) => {
                ErrorKind::SourceRetrieval
            }
            IngestError::Config(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
