//! Freshness & dedup gate: decides whether an item is worth enriching.

use crate::traits::ArticleStore;
use crate::types::{FeedItem, Result};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    AlreadyPresent,
    TooOld,
    Eligible,
}

/// Pure freshness rule. An item exactly at the window edge is fresh; an item
/// without a timestamp is not.
pub fn is_fresh(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>, lookback: Duration) -> bool {
    match published_at {
        Some(ts) => ts >= now - lookback,
        None => false,
    }
}

/// Classify an item. The store is consulted first so known urls never cost a
/// network round trip.
pub async fn classify(
    item: &FeedItem,
    store: &dyn ArticleStore,
    now: DateTime<Utc>,
    lookback: Duration,
) -> Result<GateDecision> {
    if store.exists(&item.url).await? {
        return Ok(GateDecision::AlreadyPresent);
    }

    if !is_fresh(item.published_at, now, lookback) {
        return Ok(GateDecision::TooOld);
    }

    Ok(GateDecision::Eligible)
}
