use crate::traits::EnrichmentClient;
use crate::types::{EnrichmentRequest, EnrichmentResult, IngestError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const INSTRUCTIONS: &str = "You read a news web page and describe the article it contains. \
Answer with a single JSON object with the keys \"title\" (string), \"content\" (a short summary, string), \
\"rating\" (integer from 1 to 5 for how informative the article is), \"category\" (one lowercase word) \
and \"image_url\" (the main image of the article, empty string if none).";

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl EnrichmentConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Gemini `generateContent` client. One call per article, no retries.
pub struct GeminiClient {
    http: Client,
    config: EnrichmentConfig,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: u64,
}

impl GeminiClient {
    pub fn new(config: EnrichmentConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(IngestError::Config("enrichment API key is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl EnrichmentClient for GeminiClient {
    fn client_name(&self) -> String {
        format!("gemini ({})", self.config.model)
    }

    async fn enrich(&self, request: &EnrichmentRequest) -> Result<EnrichmentResult> {
        let prompt = format!("URL: {}\n\nPage:\n{}", request.url, request.content);
        let body = GenerateRequest {
            system_instruction: Content {
                role: "system",
                parts: vec![Part { text: INSTRUCTIONS }],
            },
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: &prompt }],
            }],
        };

        debug!("Enriching {} ({} bytes)", request.url, request.content.len());

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(IngestError::Service(format!("HTTP {}: {}", status, text)));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)?;
        let cost = parsed
            .usage_metadata
            .map(|usage| usage.total_token_count)
            .unwrap_or(0);

        let raw_text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        // A blocked or empty candidate is still billed; the validator rejects
        // the empty text once the cost has been recorded.
        if raw_text.trim().is_empty() {
            warn!("Empty completion for {} ({} tokens billed)", request.url, cost);
        }

        Ok(EnrichmentResult { raw_text, cost })
    }
}
