use crate::types::{FeedItem, IngestError, Result};
use chrono::Utc;
use feed_rs::parser;
use std::collections::HashSet;
use tracing::{debug, info};

pub struct FeedParser;

impl FeedParser {
    /// Parse an RSS/Atom document into feed items.
    ///
    /// Entries without a link are dropped, as are repeated links within the
    /// same document.
    pub fn parse_items(content: &str) -> Result<Vec<FeedItem>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| IngestError::FeedParse(format!("Failed to parse feed: {}", e)))?;

        let mut seen_urls = HashSet::new();
        let mut items = Vec::new();

        for entry in feed.entries {
            let url = match entry.links.first() {
                Some(link) => link.href.clone(),
                None => {
                    debug!("Skipping entry without link: {}", entry.id);
                    continue;
                }
            };

            if !seen_urls.insert(url.clone()) {
                debug!("Skipping duplicate entry with URL: {}", url);
                continue;
            }

            let published_at = entry
                .published
                .or(entry.updated)
                .map(|dt| dt.with_timezone(&Utc));

            items.push(FeedItem { url, published_at });
        }

        info!("Parsed feed with {} entries", items.len());
        Ok(items)
    }

    pub fn is_valid_feed_content(content: &str) -> bool {
        let content_lower = content.to_lowercase();

        content_lower.contains("<rss")
            || content_lower.contains("<feed")
            || content_lower.contains("<rdf:rdf")
            || content_lower.contains("<channel")
    }
}
