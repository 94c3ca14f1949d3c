//! In-memory provider for integration testing.
//!
//! Provides a deterministic `FantasyDataProvider` with a small, known
//! player pool. Call counts are recorded so tests can assert which
//! upstream fetches actually happened.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use draughtsheets::provider::FantasyDataProvider;
use draughtsheets::types::*;

/// A mock fantasy data provider for deterministic testing.
///
/// Rankings, projections and injuries are fixed at construction; errors
/// can be forced per dataset from test code.
#[derive(Clone)]
pub struct MockProvider {
    rankings: Vec<RankingPlayer>,
    projections: BTreeMap<Position, Vec<ProjectionRow>>,
    injuries: Vec<InjuredPlayer>,
    pub rankings_calls: Arc<AtomicUsize>,
    pub projection_calls: Arc<AtomicUsize>,
    pub injury_calls: Arc<AtomicUsize>,
    /// If set, rankings fetches return this error.
    rankings_error: Arc<Mutex<Option<String>>>,
    /// If set, projection fetches return this error.
    projections_error: Arc<Mutex<Option<String>>>,
    /// Rankings fetches wait for this lock; hold it to stall them.
    pub rankings_hold: Arc<tokio::sync::Mutex<()>>,
}

impl MockProvider {
    /// Provider with the default pool.
    pub fn new() -> Self {
        Self {
            rankings: default_rankings(),
            projections: default_projections(),
            injuries: default_injuries(),
            rankings_calls: Arc::new(AtomicUsize::new(0)),
            projection_calls: Arc::new(AtomicUsize::new(0)),
            injury_calls: Arc::new(AtomicUsize::new(0)),
            rankings_error: Arc::new(Mutex::new(None)),
            projections_error: Arc::new(Mutex::new(None)),
            rankings_hold: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn fail_rankings(&self, msg: &str) {
        *self.rankings_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn fail_projections(&self, msg: &str) {
        *self.projections_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_errors(&self) {
        *self.rankings_error.lock().unwrap() = None;
        *self.projections_error.lock().unwrap() = None;
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.rankings_calls.load(Ordering::SeqCst),
            self.projection_calls.load(Ordering::SeqCst),
            self.injury_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl FantasyDataProvider for MockProvider {
    async fn fetch_rankings(&self, query: RankingsQuery) -> Result<RankingsResponse> {
        self.rankings_calls.fetch_add(1, Ordering::SeqCst);
        drop(self.rankings_hold.lock().await);
        if let Some(msg) = self.rankings_error.lock().unwrap().clone() {
            return Err(anyhow!(msg));
        }
        let players = self
            .rankings
            .iter()
            .filter(|p| match query.position {
                Some(pos) => p.position().eq_ignore_ascii_case(pos.as_str()),
                None => true,
            })
            .cloned()
            .collect::<Vec<_>>();
        let count = players.len();
        let mut resp = RankingsResponse::with_players(players);
        resp.insert("scoring", json!(query.scoring.to_string()));
        resp.insert("count", json!(count));
        Ok(resp)
    }

    async fn fetch_projections(&self, position: Position) -> Result<Vec<ProjectionRow>> {
        self.projection_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = self.projections_error.lock().unwrap().clone() {
            return Err(anyhow!(msg));
        }
        Ok(self.projections.get(&position).cloned().unwrap_or_default())
    }

    async fn fetch_injuries(&self) -> Result<Vec<InjuredPlayer>> {
        self.injury_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.injuries.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn ranked(id: u64, name: &str, team: &str, pos: &str, ecr: u32, tier: u32) -> RankingPlayer {
    serde_json::from_value(json!({
        "player_id": id,
        "player_name": name,
        "player_team_id": team,
        "player_position_id": pos,
        "player_page_url": format!("https://www.fantasypros.com/nfl/players/{id}.php"),
        "player_image_url": format!("https://images.fantasypros.com/images/players/nfl/{id}/headshot/210x210.png"),
        "player_bye_week": 10,
        "rank_ecr": ecr,
        "rank_min": "1",
        "rank_max": "30",
        "rank_ave": format!("{ecr}.0"),
        "tier": tier
    }))
    .unwrap()
}

/// Ranked pool, in ECR order:
/// 1 RB (projected, injured), 2 WR, 3 QB, 4 TE, 5 FA WR, 6 K (unprojected
/// under the default positions), 7 RB without a projection row.
fn default_rankings() -> Vec<RankingPlayer> {
    vec![
        ranked(1, "Christian McCaffrey", "SF", "RB", 1, 1),
        ranked(2, "CeeDee Lamb", "DAL", "WR", 2, 1),
        ranked(3, "Josh Allen", "BUF", "QB", 13, 2),
        ranked(4, "Travis Kelce", "KC", "TE", 14, 3),
        ranked(5, "Unsigned Receiver", "FA", "WR", 15, 3),
        ranked(6, "Justin Tucker", "BAL", "K", 16, 4),
        ranked(7, "Rookie Back", "NYG", "RB", 17, 4),
    ]
}

fn row(id: &str, name: &str, fpts: f64) -> ProjectionRow {
    ProjectionRow {
        player_id: Some(id.to_string()),
        player: name.to_string(),
        fpts: Some(fpts),
        stats: BTreeMap::from([("fl".to_string(), StatValue::Value("1.0".into()))]),
    }
}

fn default_projections() -> BTreeMap<Position, Vec<ProjectionRow>> {
    BTreeMap::from([
        (Position::Qb, vec![row("3", "Josh Allen BUF", 380.2)]),
        (Position::Rb, vec![row("1", "Christian McCaffrey SF", 310.5)]),
        (
            Position::Wr,
            vec![row("2", "CeeDee Lamb DAL", 280.0), row("5", "Unsigned Receiver", 20.0)],
        ),
        (Position::Te, vec![row("4", "Travis Kelce KC", 190.4)]),
        (Position::K, vec![row("6", "Justin Tucker BAL", 131.3)]),
        (Position::Dst, Vec::new()),
    ])
}

fn default_injuries() -> Vec<InjuredPlayer> {
    vec![serde_json::from_value(json!({
        "player_id": 1,
        "name": "Christian McCaffrey",
        "status": "Questionable",
        "status_short": "Q",
        "injury_type": "Achilles",
        "injury_update_date": "2024-08-20",
        "comment": "Limited in practice",
        "ir_weeks": []
    }))
    .unwrap()]
}
