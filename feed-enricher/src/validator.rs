//! Turns the enrichment capability's free text into a `ValidatedArticle`.
//!
//! The capability is a language model and tends to wrap its JSON in prose.
//! The first parseable JSON object in the text is taken as the answer; the
//! text around it is ignored, but the object itself must be complete.

use crate::types::{FeedItem, IngestError, Result, ValidatedArticle};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
struct EnrichedFields {
    title: String,
    content: String,
    #[serde(deserialize_with = "deserialize_rating")]
    rating: i32,
    category: String,
    image_url: String,
}

const REQUIRED_FIELDS: [&str; 5] = ["title", "content", "rating", "category", "image_url"];

/// Models sometimes quote numbers; accept `4`, `4.0` and `"4"`.
fn deserialize_rating<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| D::Error::custom(format!("rating {} is not an integer", n))),
        Value::String(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| D::Error::custom(format!("rating {:?} is not an integer", s))),
        other => Err(D::Error::custom(format!("rating has unexpected type: {}", other))),
    }
}

/// Find the first well-formed JSON object embedded in `text`.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    for (start, _) in text.match_indices('{') {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        if let Some(Ok(Value::Object(map))) = stream.next() {
            return Some(map);
        }
    }
    None
}

/// Validate raw enrichment output for `item`.
pub fn validate(raw_text: &str, item: &FeedItem) -> Result<ValidatedArticle> {
    let invalid = |reason: String| IngestError::InvalidResponse {
        reason,
        raw: raw_text.to_string(),
    };

    let object = extract_json_object(raw_text)
        .ok_or_else(|| invalid("no JSON object found in response".to_string()))?;

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| object.get(*field).map_or(true, Value::is_null))
        .collect();
    if !missing.is_empty() {
        return Err(invalid(format!("missing fields: {}", missing.join(", "))));
    }

    let fields: EnrichedFields =
        serde_json::from_value(Value::Object(object)).map_err(|e| invalid(e.to_string()))?;

    Ok(ValidatedArticle {
        url: item.url.clone(),
        image_url: fields.image_url,
        title: fields.title,
        summary: fields.content,
        rating: fields.rating,
        category: fields.category,
        feed_date: item.published_at,
    })
}
