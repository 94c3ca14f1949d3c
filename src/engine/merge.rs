//! Merge stage: joins rankings, projections and injuries into `Player`s.
//!
//! Rankings carry numeric ids, projection rows carry the same id as a
//! string scraped from markup, injuries carry numeric ids again. A ranked
//! player only makes it onto the board if a projection row matches; the
//! injury is optional.

use std::collections::HashMap;
use tracing::info;

use crate::types::{InjuredPlayer, Player, PlayerRank, ProjectionRow, RankingPlayer};

/// Provider headshot size in the rankings payload.
const FULL_IMAGE_SUFFIX: &str = "210x210.png";

/// Smaller thumbnail the board displays instead.
const THUMB_IMAGE_SUFFIX: &str = "100x100.webp";

/// Build unified player records, in ranking order.
///
/// Free agents are skipped, as are ranked entries without a readable id.
/// So is any ranked player without a projection row sharing its id:
/// projection presence gates the player pool. When ids repeat, the first
/// projection / injury wins.
pub fn merge_players<'a>(
    rankings: &[RankingPlayer],
    projections: impl IntoIterator<Item = &'a ProjectionRow>,
    injuries: &[InjuredPlayer],
) -> Vec<Player> {
    let mut projections_by_id: HashMap<&str, &ProjectionRow> = HashMap::new();
    for row in projections {
        if let Some(id) = row.player_id.as_deref() {
            projections_by_id.entry(id).or_insert(row);
        }
    }

    let mut injuries_by_id: HashMap<u64, &InjuredPlayer> = HashMap::new();
    for injury in injuries {
        injuries_by_id.entry(injury.player_id).or_insert(injury);
    }

    let mut free_agents = 0usize;
    let mut unidentified = 0usize;
    let mut unprojected = 0usize;
    let mut players = Vec::with_capacity(rankings.len());

    for ranked in rankings {
        if ranked.is_free_agent() {
            free_agents += 1;
            continue;
        }
        let Some(player_id) = ranked.player_id() else {
            unidentified += 1;
            continue;
        };
        let Some(projection) = projections_by_id.get(player_id.to_string().as_str()) else {
            unprojected += 1;
            continue;
        };
        let injury = injuries_by_id.get(&player_id).map(|i| (*i).clone());
        players.push(build_player(player_id, ranked, projection, injury));
    }

    info!(
        ranked = rankings.len(),
        merged = players.len(),
        free_agents,
        unidentified,
        unprojected,
        "Player merge complete"
    );

    players
}

fn build_player(
    player_id: u64,
    ranked: &RankingPlayer,
    projection: &ProjectionRow,
    injury: Option<InjuredPlayer>,
) -> Player {
    Player {
        player_id,
        player_name: ranked.player_name(),
        team: ranked.team(),
        position: ranked.position(),
        url: ranked.page_url(),
        image: thumbnail_url(&ranked.image_url()),
        bye_week: ranked.bye_week(),
        tier: ranked.tier(),
        rank: PlayerRank {
            ecr: ranked.rank_ecr(),
            min: ranked.rank_min(),
            max: ranked.rank_max(),
            ave: ranked.rank_ave(),
        },
        fpts: projection.fpts,
        stats: projection.stats.clone(),
        injury,
    }
}

/// Swap the provider's full-size headshot for the smaller webp thumbnail.
pub fn thumbnail_url(image_url: &str) -> String {
    image_url.replace(FULL_IMAGE_SUFFIX, THUMB_IMAGE_SUFFIX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
