//! Overall rank -> draft round and pick.

use std::fmt;

use crate::types::DraftError;

/// Where an overall rank lands in a snake-less draft of `league_size` teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundPick {
    pub round: u32,
    /// 1-based pick within the round.
    pub pick: u32,
}

impl RoundPick {
    /// The pick as a two-digit, zero-padded string (`"02"`).
    pub fn pick_label(&self) -> String {
        format!("{:02}", self.pick)
    }
}

/// Renders as `round.pick`, e.g. `2.02`.
impl fmt::Display for RoundPick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.round, self.pick)
    }
}

/// Convert an overall rank into round and pick.
///
/// `round = ceil(rank / size)`; `pick = rank % size`, except that a zero
/// remainder is the last pick of the round (`size`), never zero.
pub fn round_pick(rank: u32, league_size: u32) -> Result<RoundPick, DraftError> {
    if league_size == 0 {
        return Err(DraftError::InvalidInput(
            "league size must be at least 1".to_string(),
        ));
    }
    if rank == 0 {
        return Err(DraftError::InvalidInput("rank must be at least 1".to_string()));
    }

    let round = rank.div_ceil(league_size);
    let pick = match rank % league_size {
        0 => league_size,
        remainder => remainder,
    };
    Ok(RoundPick { round, pick })
}

/// Round and zero-padded pick label, e.g. `(12, 10) -> (2, "02")`.
pub fn calculate_round_pick(rank: u32, league_size: u32) -> Result<(u32, String), DraftError> {
    let rp = round_pick(rank, league_size)?;
    Ok((rp.round, rp.pick_label()))
}
