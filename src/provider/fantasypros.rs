//! FantasyPros integration.
//!
//! Three independent upstream endpoints:
//! - Consensus rankings: JSON API, requires `x-api-key`
//! - Projections: public HTML page per position, parsed by `projections`
//! - Injuries: partners JSON API, current week
//!
//! Base URLs are configurable so the client can be pointed at a mock server.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::projections::parse_projections_table;
use super::FantasyDataProvider;
use crate::config::ProviderConfig;
use crate::types::{InjuredPlayer, Position, ProjectionRow, RankingsQuery, RankingsResponse};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const PROVIDER_NAME: &str = "fantasypros";

const USER_AGENT: &str = "DraughtSheets/0.1.0 (draft-board)";

const API_KEY_HEADER: &str = "x-api-key";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

/// Response from `/api/v1/player-injuries.php`.
#[derive(Debug, Deserialize)]
struct InjuriesResponse {
    #[serde(default)]
    count: u32,
    #[serde(default)]
    injuries: Vec<InjuredPlayer>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// FantasyPros client covering rankings, projections and injuries.
pub struct FantasyProsClient {
    http: Client,
    api_base_url: String,
    site_base_url: String,
    partners_base_url: String,
    season: i32,
    /// Only the rankings API needs it; the other endpoints are public.
    api_key: Option<SecretString>,
}

impl FantasyProsClient {
    /// Create a client from provider config.
    pub fn new(config: &ProviderConfig, api_key: Option<SecretString>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for FantasyPros")?;

        if api_key.is_none() {
            warn!(
                env = %config.api_key_env,
                "No FantasyPros API key configured; rankings requests will be rejected upstream"
            );
        }

        Ok(Self {
            http,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            site_base_url: config.site_base_url.trim_end_matches('/').to_string(),
            partners_base_url: config.partners_base_url.trim_end_matches('/').to_string(),
            season: config.season(),
            api_key,
        })
    }

    // -- Internal helpers ------------------------------------------------

    fn rankings_url(&self, query: &RankingsQuery) -> String {
        format!(
            "{}/v2/json/nfl/{}/consensus-rankings?scoring={}&position={}&week={}",
            self.api_base_url,
            self.season,
            urlencoding::encode(&query.scoring.to_string()),
            urlencoding::encode(&query.position_param()),
            query.week,
        )
    }

    fn projections_url(&self, position: Position) -> String {
        format!(
            "{}/nfl/projections/{}.php?week=draft",
            self.site_base_url,
            position.as_str(),
        )
    }

    fn injuries_url(&self) -> String {
        format!(
            "{}/api/v1/player-injuries.php?sport=NFL&year={}&week=0",
            self.partners_base_url, self.season,
        )
    }

    /// Turn a non-2xx response into an error carrying status and body.
    async fn ensure_success(resp: Response, endpoint: &str) -> Result<Response> {
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("FantasyPros {endpoint} error {status}: {body}");
        }
        Ok(resp)
    }
}

// ---------------------------------------------------------------------------
// FantasyDataProvider trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl FantasyDataProvider for FantasyProsClient {
    async fn fetch_rankings(&self, query: RankingsQuery) -> Result<RankingsResponse> {
        let url = self.rankings_url(&query);
        debug!(url = %url, "Fetching FantasyPros rankings");

        let mut request = self.http.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key.expose_secret().as_str());
        }

        let resp = request
            .send()
            .await
            .context("FantasyPros rankings request failed")?;
        let resp = Self::ensure_success(resp, "rankings").await?;

        let rankings: RankingsResponse = resp
            .json()
            .await
            .context("Failed to parse FantasyPros rankings response")?;

        info!(
            scoring = %query.scoring,
            position = %query.position_param(),
            week = query.week,
            players = rankings.player_count(),
            "Rankings fetched"
        );

        Ok(rankings)
    }

    async fn fetch_projections(&self, position: Position) -> Result<Vec<ProjectionRow>> {
        let url = self.projections_url(position);
        debug!(url = %url, "Fetching FantasyPros projections");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("FantasyPros {position} projections request failed"))?;
        let resp = Self::ensure_success(resp, "projections").await?;

        let html = resp
            .text()
            .await
            .context("Failed to read FantasyPros projections body")?;

        let rows = parse_projections_table(&html)
            .with_context(|| format!("Failed to parse {position} projections table"))?;

        info!(position = %position, rows = rows.len(), "Projections fetched");
        Ok(rows)
    }

    async fn fetch_injuries(&self) -> Result<Vec<InjuredPlayer>> {
        let url = self.injuries_url();
        debug!(url = %url, "Fetching FantasyPros injuries");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("FantasyPros injuries request failed")?;
        let resp = Self::ensure_success(resp, "injuries").await?;

        let report: InjuriesResponse = resp
            .json()
            .await
            .context("Failed to parse FantasyPros injuries response")?;

        info!(
            count = report.count,
            injuries = report.injuries.len(),
            "Injuries fetched"
        );
        Ok(report.injuries)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
