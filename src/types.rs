//! Shared types for DraughtSheets.
//!
//! Provider payload shapes (rankings, projections, injuries), the unified
//! `Player` record produced by the merge stage, and the domain error type.
//! Provider shapes keep unknown fields verbatim so the proxy endpoints can
//! hand them back unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Roster position accepted by the projection endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Qb,
    Rb,
    Wr,
    Te,
    K,
    Dst,
}

impl Position {
    /// Every position the provider publishes projections for.
    pub const ALL: &'static [Position] = &[
        Position::Qb,
        Position::Rb,
        Position::Wr,
        Position::Te,
        Position::K,
        Position::Dst,
    ];

    /// Lowercase code used in provider URLs (`qb`, `dst`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Qb => "qb",
            Position::Rb => "rb",
            Position::Wr => "wr",
            Position::Te => "te",
            Position::K => "k",
            Position::Dst => "dst",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Parse a position code (case-insensitive).
impl FromStr for Position {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "qb" => Ok(Position::Qb),
            "rb" => Ok(Position::Rb),
            "wr" => Ok(Position::Wr),
            "te" => Ok(Position::Te),
            "k" => Ok(Position::K),
            "dst" => Ok(Position::Dst),
            _ => Err(DraftError::InvalidQuery(format!(
                "position '{s}' is not one of qb, rb, wr, te, k, dst"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// League scoring format used by the consensus rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScoringFormat {
    #[default]
    Std,
    Ppr,
    Half,
}

impl fmt::Display for ScoringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringFormat::Std => write!(f, "STD"),
            ScoringFormat::Ppr => write!(f, "PPR"),
            ScoringFormat::Half => write!(f, "HALF"),
        }
    }
}

impl FromStr for ScoringFormat {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "std" | "standard" => Ok(ScoringFormat::Std),
            "ppr" => Ok(ScoringFormat::Ppr),
            "half" | "half_ppr" => Ok(ScoringFormat::Half),
            _ => Err(DraftError::InvalidQuery(format!(
                "scoring '{s}' is not one of STD, PPR, HALF"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for ScoringFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

/// Validated rankings request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RankingsQuery {
    pub scoring: ScoringFormat,
    /// `None` requests every position (`ALL`).
    pub position: Option<Position>,
    /// `0` is the draft (season-long) ranking.
    pub week: u8,
}

impl RankingsQuery {
    pub fn new(scoring: ScoringFormat) -> Self {
        Self {
            scoring,
            ..Self::default()
        }
    }

    /// Build a query from raw string parameters, applying defaults.
    pub fn from_params(
        scoring: Option<&str>,
        position: Option<&str>,
        week: Option<&str>,
    ) -> Result<Self, DraftError> {
        let scoring = match scoring {
            Some(s) if !s.trim().is_empty() => s.parse()?,
            _ => ScoringFormat::default(),
        };
        let position = match position {
            Some(p) if !p.trim().is_empty() && !p.trim().eq_ignore_ascii_case("all") => {
                Some(p.parse()?)
            }
            _ => None,
        };
        let week = match week {
            Some(w) if !w.trim().is_empty() => w.trim().parse::<u8>().map_err(|_| {
                DraftError::InvalidQuery(format!("week '{w}' is not a number between 0 and 255"))
            })?,
            _ => 0,
        };
        Ok(Self {
            scoring,
            position,
            week,
        })
    }

    /// Provider value for the `position` parameter.
    pub fn position_param(&self) -> String {
        self.position
            .map(|p| p.to_string())
            .unwrap_or_else(|| "ALL".to_string())
    }

    /// Key identifying this query in the rankings cache.
    pub fn cache_key(&self) -> String {
        format!("{}:{}:{}", self.scoring, self.position_param(), self.week)
    }
}

/// One player in the consensus rankings payload, kept exactly as received.
///
/// The provider is loose with types (`player_bye_week` arrives as `12`,
/// `"12"` or `null`), so nothing is coerced on the way in. Accessors read
/// the fields the merge needs, leniently.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankingPlayer {
    fields: Map<String, Value>,
}

impl RankingPlayer {
    /// Team code the provider uses for unsigned players.
    pub const FREE_AGENT: &'static str = "FA";

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Numeric provider id; `None` when missing or unreadable.
    pub fn player_id(&self) -> Option<u64> {
        whole_number(self.get("player_id"))
    }

    pub fn player_name(&self) -> String {
        lenient_text(self.get("player_name"))
    }

    pub fn team(&self) -> String {
        lenient_text(self.get("player_team_id"))
    }

    pub fn position(&self) -> String {
        lenient_text(self.get("player_position_id"))
    }

    pub fn page_url(&self) -> String {
        lenient_text(self.get("player_page_url"))
    }

    pub fn image_url(&self) -> String {
        lenient_text(self.get("player_image_url"))
    }

    pub fn bye_week(&self) -> String {
        lenient_text(self.get("player_bye_week"))
    }

    pub fn tier(&self) -> u32 {
        small_number(self.get("tier"))
    }

    pub fn rank_ecr(&self) -> u32 {
        small_number(self.get("rank_ecr"))
    }

    pub fn rank_min(&self) -> String {
        lenient_text(self.get("rank_min"))
    }

    pub fn rank_max(&self) -> String {
        lenient_text(self.get("rank_max"))
    }

    pub fn rank_ave(&self) -> String {
        lenient_text(self.get("rank_ave"))
    }

    pub fn is_free_agent(&self) -> bool {
        self.team() == Self::FREE_AGENT
    }
}

/// Consensus rankings envelope (`count`, `scoring`, `players`, ...), kept
/// exactly as received so the proxy hands it back unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankingsResponse {
    body: Map<String, Value>,
}

impl RankingsResponse {
    /// Envelope holding just a `players` list.
    pub fn with_players(players: Vec<RankingPlayer>) -> Self {
        let players = players
            .into_iter()
            .map(|p| Value::Object(p.fields))
            .collect();
        let mut body = Map::new();
        body.insert("players".to_string(), Value::Array(players));
        Self { body }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.body.insert(key.into(), value);
    }

    /// The ranked players, or `None` when the payload has no `players` list.
    /// Entries that are not objects are skipped.
    pub fn players(&self) -> Option<Vec<RankingPlayer>> {
        let players = self.body.get("players")?.as_array()?;
        Some(
            players
                .iter()
                .filter_map(|p| p.as_object().cloned().map(RankingPlayer::from_fields))
                .collect(),
        )
    }

    pub fn player_count(&self) -> usize {
        self.body
            .get("players")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

/// Text form of a loosely-typed provider value; absent or null is empty.
fn lenient_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// A non-negative integer from a number or numeric string.
fn whole_number(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64))
        }
        _ => None,
    }
}

fn small_number(value: Option<&Value>) -> u32 {
    whole_number(value)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

/// Accept a string, number or null where the provider is inconsistent.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_text(Some(&Value::deserialize(deserializer)?)))
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// A projection cell: a plain value, or a stat category holding sub-columns
/// (e.g. `passing -> {att, cmp, yds}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Value(String),
    Group(BTreeMap<String, String>),
}

/// One row of a provider projections table.
///
/// Serializes flat, the way the table reads: `player_id`, `player`, one
/// key per stat (or per category, nesting its stats), then `fpts`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectionRow {
    /// Digits taken from the row's class attribute; string-typed upstream.
    pub player_id: Option<String>,
    #[serde(default)]
    pub player: String,
    #[serde(flatten)]
    pub stats: BTreeMap<String, StatValue>,
    /// Total projected fantasy points.
    pub fpts: Option<f64>,
}

// ---------------------------------------------------------------------------
// Injuries
// ---------------------------------------------------------------------------

/// One entry of the current-week injury report.
///
/// Free-text fields tolerate `null` and numbers; fields not named here ride
/// along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuredPlayer {
    pub player_id: u64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status_short: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub injury_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub injury_update_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub comment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ir_weeks: Vec<Value>,
    #[serde(default)]
    pub practice_1: Option<String>,
    #[serde(default)]
    pub practice_2: Option<String>,
    #[serde(default)]
    pub practice_3: Option<String>,
    #[serde(default)]
    pub probability_of_playing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yahoo_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Unified player
// ---------------------------------------------------------------------------

/// Consensus rank breakdown carried onto the unified record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRank {
    pub ecr: u32,
    pub min: String,
    pub max: String,
    pub ave: String,
}

/// A ranked player joined with its projection and (optionally) its injury.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: u64,
    pub player_name: String,
    pub team: String,
    pub position: String,
    pub url: String,
    pub image: String,
    pub bye_week: String,
    pub tier: u32,
    pub rank: PlayerRank,
    pub fpts: Option<f64>,
    pub stats: BTreeMap<String, StatValue>,
    pub injury: Option<InjuredPlayer>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for DraughtSheets.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Player not found: {0}")]
    PlayerNotFound(u64),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
