//! Player store: the draft board's working state.
//!
//! Holds the raw datasets fetched from the provider, the merged player
//! list, and the players marked as drafted. The store is an owned value:
//! whoever needs it (the HTTP server, a test) passes it around explicitly.

use anyhow::{Context, Result};
use futures::future::{try_join, try_join_all};
use std::collections::BTreeMap;
use tracing::{debug, error, info};

use super::merge::merge_players;
use crate::provider::FantasyDataProvider;
use crate::types::{
    DraftError, InjuredPlayer, Player, Position, ProjectionRow, RankingsQuery, ScoringFormat,
};

/// Working state for one draft board.
#[derive(Debug, Clone)]
pub struct PlayerStore {
    /// Positions whose projections make up the merge pool.
    positions: Vec<Position>,
    players: Vec<Player>,
    injuries: Vec<InjuredPlayer>,
    projections: BTreeMap<Position, Vec<ProjectionRow>>,
    removed: Vec<Player>,
}

impl Default for PlayerStore {
    fn default() -> Self {
        Self::new(vec![Position::Qb, Position::Rb, Position::Wr, Position::Te])
    }
}

impl PlayerStore {
    pub fn new(positions: Vec<Position>) -> Self {
        Self {
            positions,
            players: Vec::new(),
            injuries: Vec::new(),
            projections: BTreeMap::new(),
            removed: Vec::new(),
        }
    }

    // -- Reads -------------------------------------------------------------

    /// Merged players, in ranking order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn injuries(&self) -> &[InjuredPlayer] {
        &self.injuries
    }

    /// Projection rows fetched for a position (empty if not fetched yet).
    pub fn projections(&self, position: Position) -> &[ProjectionRow] {
        self.projections
            .get(&position)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Players marked as drafted, in the order they were marked.
    pub fn removed_players(&self) -> &[Player] {
        &self.removed
    }

    /// Merged players not yet marked as drafted.
    pub fn available_players(&self) -> impl Iterator<Item = &Player> {
        self.players
            .iter()
            .filter(|p| !self.is_player_removed(p.player_id))
    }

    pub fn is_player_removed(&self, player_id: u64) -> bool {
        self.removed.iter().any(|p| p.player_id == player_id)
    }

    // -- Writes ------------------------------------------------------------

    pub async fn fetch_injuries(&mut self, provider: &dyn FantasyDataProvider) -> Result<()> {
        self.injuries = provider.fetch_injuries().await?;
        Ok(())
    }

    pub async fn fetch_projections(
        &mut self,
        provider: &dyn FantasyDataProvider,
        position: Position,
    ) -> Result<()> {
        let rows = provider.fetch_projections(position).await?;
        self.projections.insert(position, rows);
        Ok(())
    }

    /// Refresh the board for a scoring format.
    ///
    /// Injuries and projections are fetched only while still empty, all
    /// concurrently; a failure there is returned. Rankings are then fetched
    /// and merged; a failure at that stage is logged and the previous board
    /// stays in place.
    pub async fn fetch_all_player_data(
        &mut self,
        provider: &dyn FantasyDataProvider,
        scoring: ScoringFormat,
    ) -> Result<()> {
        let need_injuries = self.injuries.is_empty();
        let missing: Vec<Position> = self
            .positions
            .iter()
            .copied()
            .filter(|p| self.projections(*p).is_empty())
            .collect();

        debug!(
            need_injuries,
            missing = ?missing,
            "Fetching prerequisite player data"
        );

        let injuries = async {
            if need_injuries {
                provider.fetch_injuries().await.map(Some)
            } else {
                Ok(None)
            }
        };
        let projections = try_join_all(missing.iter().map(|&position| async move {
            provider
                .fetch_projections(position)
                .await
                .map(|rows| (position, rows))
                .with_context(|| format!("Failed to fetch {position} projections"))
        }));

        let (injuries, projections) = try_join(injuries, projections).await?;
        if let Some(injuries) = injuries {
            self.injuries = injuries;
        }
        self.projections.extend(projections);

        match self.merge_rankings(provider, scoring).await {
            Ok(count) => info!(scoring = %scoring, players = count, "Player data refreshed"),
            Err(e) => error!(
                scoring = %scoring,
                error = format!("{e:#}"),
                "Failed to build player list"
            ),
        }
        Ok(())
    }

    async fn merge_rankings(
        &mut self,
        provider: &dyn FantasyDataProvider,
        scoring: ScoringFormat,
    ) -> Result<usize> {
        let rankings = provider
            .fetch_rankings(RankingsQuery::new(scoring))
            .await
            .context("Failed to fetch rankings")?;

        if let Some(ranked) = rankings.players() {
            let pool: Vec<&ProjectionRow> = self
                .positions
                .iter()
                .filter_map(|p| self.projections.get(p))
                .flatten()
                .collect();
            let players = merge_players(&ranked, pool, &self.injuries);
            self.players = players;
        }
        Ok(self.players.len())
    }

    /// Take over the datasets and merged board of a store refreshed
    /// elsewhere. Drafted marks stay with `self`.
    pub fn adopt_player_data(&mut self, fresh: PlayerStore) {
        self.players = fresh.players;
        self.injuries = fresh.injuries;
        self.projections = fresh.projections;
    }

    /// Mark a player as drafted, or un-mark them if already marked.
    ///
    /// Returns whether the player is removed after the toggle.
    pub fn toggle_removed(&mut self, player_id: u64) -> Result<bool, DraftError> {
        if let Some(index) = self.removed.iter().position(|p| p.player_id == player_id) {
            self.removed.remove(index);
            return Ok(false);
        }
        let player = self
            .players
            .iter()
            .find(|p| p.player_id == player_id)
            .ok_or(DraftError::PlayerNotFound(player_id))?;
        self.removed.push(player.clone());
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
