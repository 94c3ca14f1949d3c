//! Presentation: derived display fields for the draft board.
//!
//! Nothing here touches the merge: round/pick and tier colours are computed
//! on the way out, from whatever the store currently holds.

pub mod colour;
pub mod round_pick;

pub use colour::{interpolate_rgb_colour, Rgb};
pub use round_pick::{calculate_round_pick, round_pick, RoundPick};

use serde::Serialize;

use crate::config::{DisplayConfig, LeagueConfig};
use crate::engine::PlayerStore;
use crate::types::{DraftError, Player};

/// Inputs for decorating the board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSettings {
    pub league_size: u32,
    pub min_colour: String,
    pub max_colour: String,
}

impl BoardSettings {
    pub fn from_config(league: &LeagueConfig, display: &DisplayConfig) -> Self {
        Self {
            league_size: league.size,
            min_colour: display.min_colour.clone(),
            max_colour: display.max_colour.clone(),
        }
    }
}

/// A stored player plus its display fields.
#[derive(Debug, Clone, Serialize)]
pub struct BoardPlayer {
    #[serde(flatten)]
    pub player: Player,
    /// `round.pick` for the player's ECR; empty when unranked.
    pub round_pick: String,
    pub tier_colour: String,
    pub removed: bool,
}

/// Decorate every stored player, in ranking order.
///
/// Tier colours run from `min_colour` at tier 1 to `max_colour` at the
/// highest tier on the board.
pub fn build_board(
    store: &PlayerStore,
    settings: &BoardSettings,
) -> Result<Vec<BoardPlayer>, DraftError> {
    if settings.league_size == 0 {
        return Err(DraftError::InvalidInput(
            "league size must be at least 1".to_string(),
        ));
    }

    let players = store.players();
    let top_tier = players.iter().map(|p| p.tier).max().unwrap_or(1).max(1);

    players
        .iter()
        .map(|player| {
            let round_pick = round_pick(player.rank.ecr, settings.league_size)
                .map(|rp| rp.to_string())
                .unwrap_or_default();
            let tier_colour = interpolate_rgb_colour(
                &settings.min_colour,
                &settings.max_colour,
                1.0,
                f64::from(top_tier),
                f64::from(player.tier),
            )?;
            Ok(BoardPlayer {
                player: player.clone(),
                round_pick,
                tier_colour,
                removed: store.is_player_removed(player.player_id),
            })
        })
        .collect()
}
