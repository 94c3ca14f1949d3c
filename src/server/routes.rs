//! HTTP route handlers.
//!
//! Proxy endpoints hand provider payloads back as-is; the `/api/players`
//! endpoints drive the shared `PlayerStore`. State is shared via
//! `Arc<ServerState>`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::{DisplayConfig, LeagueConfig};
use crate::engine::PlayerStore;
use crate::presentation::{build_board, BoardPlayer, BoardSettings};
use crate::provider::FantasyDataProvider;
use crate::types::{
    DraftError, InjuredPlayer, Position, ProjectionRow, RankingsQuery, RankingsResponse,
    ScoringFormat,
};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServerState {
    pub provider: Arc<dyn FantasyDataProvider>,
    pub store: RwLock<PlayerStore>,
    pub league: LeagueConfig,
    pub display: DisplayConfig,
}

impl ServerState {
    pub fn new(
        provider: Arc<dyn FantasyDataProvider>,
        league: LeagueConfig,
        display: DisplayConfig,
    ) -> Self {
        let store = PlayerStore::new(league.projection_positions.clone());
        Self {
            provider,
            store: RwLock::new(store),
            league,
            display,
        }
    }

    /// Refresh the board without holding the store lock across upstream
    /// calls. The fetch runs on a snapshot; the result is swapped in under
    /// a short write lock, keeping drafted marks made in the meantime.
    pub async fn refresh(&self, scoring: ScoringFormat) -> anyhow::Result<usize> {
        let mut fresh = self.store.read().await.clone();
        fresh
            .fetch_all_player_data(self.provider.as_ref(), scoring)
            .await?;

        let mut store = self.store.write().await;
        store.adopt_player_data(fresh);
        Ok(store.players().len())
    }
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A failed request, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(DraftError);

impl From<DraftError> for ApiError {
    fn from(err: DraftError) -> Self {
        Self(err)
    }
}

/// Anything surfacing from the provider plumbing is an upstream failure,
/// unless it carries a domain error.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DraftError>() {
            Some(domain) => Self(domain.clone()),
            None => Self(DraftError::Upstream(format!("{err:#}"))),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DraftError::InvalidQuery(_) | DraftError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DraftError::PlayerNotFound(_) => StatusCode::NOT_FOUND,
            DraftError::Upstream(_) => StatusCode::BAD_GATEWAY,
            DraftError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(status = %status, error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct RankingsParams {
    pub scoring: Option<String>,
    pub position: Option<String>,
    pub week: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectionsParams {
    pub position: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshParams {
    pub scoring: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BoardParams {
    pub league_size: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub scoring: ScoringFormat,
    pub players: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemovedResponse {
    pub player_id: u64,
    pub removed: bool,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/rankings
pub async fn get_rankings(
    State(state): State<AppState>,
    Query(params): Query<RankingsParams>,
) -> Result<Json<RankingsResponse>, ApiError> {
    let query = RankingsQuery::from_params(
        params.scoring.as_deref(),
        params.position.as_deref(),
        params.week.as_deref(),
    )?;
    let rankings = state.provider.fetch_rankings(query).await?;
    Ok(Json(rankings))
}

/// GET /api/projections
pub async fn get_projections(
    State(state): State<AppState>,
    Query(params): Query<ProjectionsParams>,
) -> Result<Json<Vec<ProjectionRow>>, ApiError> {
    let position: Position = match params.position.as_deref() {
        Some(p) if !p.trim().is_empty() => p.parse()?,
        _ => Position::Qb,
    };
    let rows = state.provider.fetch_projections(position).await?;
    Ok(Json(rows))
}

/// GET /api/injuries
pub async fn get_injuries(
    State(state): State<AppState>,
) -> Result<Json<Vec<InjuredPlayer>>, ApiError> {
    let injuries = state.provider.fetch_injuries().await?;
    Ok(Json(injuries))
}

/// POST /api/players/refresh
pub async fn refresh_players(
    State(state): State<AppState>,
    Query(params): Query<RefreshParams>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let scoring = match params.scoring.as_deref() {
        Some(s) if !s.trim().is_empty() => s.parse()?,
        _ => state.league.default_scoring,
    };

    let players = state.refresh(scoring).await?;
    info!(scoring = %scoring, players, "Board refreshed");
    Ok(Json(RefreshResponse { scoring, players }))
}

/// GET /api/players
pub async fn get_players(
    State(state): State<AppState>,
    Query(params): Query<BoardParams>,
) -> Result<Json<Vec<BoardPlayer>>, ApiError> {
    let mut settings = BoardSettings::from_config(&state.league, &state.display);
    if let Some(raw) = params.league_size.as_deref() {
        settings.league_size = raw.trim().parse().map_err(|_| {
            DraftError::InvalidQuery(format!("league_size '{raw}' is not a whole number"))
        })?;
    }

    let store = state.store.read().await;
    let board = build_board(&store, &settings)?;
    Ok(Json(board))
}

/// POST /api/players/:id/removed
pub async fn toggle_removed(
    State(state): State<AppState>,
    Path(player_id): Path<u64>,
) -> Result<Json<RemovedResponse>, ApiError> {
    let removed = state.store.write().await.toggle_removed(player_id)?;
    info!(player_id, removed, "Toggled drafted flag");
    Ok(Json(RemovedResponse { player_id, removed }))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
