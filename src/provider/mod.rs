//! Fantasy data provider integrations.
//!
//! Defines the `FantasyDataProvider` trait and provides:
//! - FantasyPros: rankings (JSON API), projections (HTML tables), injuries
//! - A caching decorator for the rankings endpoint

pub mod caching;
pub mod fantasypros;
pub mod projections;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{InjuredPlayer, Position, ProjectionRow, RankingsQuery, RankingsResponse};

/// Abstraction over the upstream fantasy data source.
///
/// Each method is a thin fetch: rankings and injuries come back as the
/// provider shaped them, projections are parsed out of an HTML table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FantasyDataProvider: Send + Sync {
    /// Fetch consensus rankings for a scoring format / position / week.
    async fn fetch_rankings(&self, query: RankingsQuery) -> Result<RankingsResponse>;

    /// Fetch and parse the projections table for one position.
    async fn fetch_projections(&self, position: Position) -> Result<Vec<ProjectionRow>>;

    /// Fetch the current-week injury report.
    async fn fetch_injuries(&self) -> Result<Vec<InjuredPlayer>>;

    /// Provider name for logging and identification.
    fn name(&self) -> &str;
}
