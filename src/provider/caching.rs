//! Rankings cache in front of a `FantasyDataProvider`.
//!
//! Consensus rankings change a few times a day at most, so responses are
//! kept per (scoring, position, week) for a fixed TTL. Projections and
//! injuries pass straight through. Failed fetches are not cached.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use super::FantasyDataProvider;
use crate::types::{InjuredPlayer, Position, ProjectionRow, RankingsQuery, RankingsResponse};

/// Default TTL for cached rankings.
pub const DEFAULT_RANKINGS_TTL_MINS: i64 = 30;

struct CacheEntry {
    rankings: RankingsResponse,
    inserted_at: DateTime<Utc>,
}

/// Provider decorator caching rankings responses.
pub struct CachingProvider<P: FantasyDataProvider> {
    inner: P,
    ttl: Duration,
    rankings: Mutex<HashMap<String, CacheEntry>>,
}

impl<P: FantasyDataProvider> CachingProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            rankings: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_ttl(inner: P) -> Self {
        Self::new(inner, Duration::minutes(DEFAULT_RANKINGS_TTL_MINS))
    }

    /// Number of live (unexpired) entries.
    pub async fn cached_entries(&self) -> usize {
        let now = Utc::now();
        let cache = self.rankings.lock().await;
        cache
            .values()
            .filter(|entry| now - entry.inserted_at < self.ttl)
            .count()
    }
}

#[async_trait]
impl<P: FantasyDataProvider> FantasyDataProvider for CachingProvider<P> {
    async fn fetch_rankings(&self, query: RankingsQuery) -> Result<RankingsResponse> {
        let key = query.cache_key();
        let now = Utc::now();

        {
            let mut cache = self.rankings.lock().await;
            cache.retain(|_, entry| now - entry.inserted_at < self.ttl);

            if let Some(entry) = cache.get(&key) {
                debug!(cache_key = %key, "Rankings cache hit");
                return Ok(entry.rankings.clone());
            }
        }

        // Not held across the upstream call; concurrent misses on one key
        // may both fetch.
        debug!(cache_key = %key, "Rankings cache miss");
        let rankings = self.inner.fetch_rankings(query).await?;
        self.rankings.lock().await.insert(
            key,
            CacheEntry {
                rankings: rankings.clone(),
                inserted_at: Utc::now(),
            },
        );
        Ok(rankings)
    }

    async fn fetch_projections(&self, position: Position) -> Result<Vec<ProjectionRow>> {
        self.inner.fetch_projections(position).await
    }

    async fn fetch_injuries(&self) -> Result<Vec<InjuredPlayer>> {
        self.inner.fetch_injuries().await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
