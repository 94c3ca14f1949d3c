//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section has defaults, so an empty file is a valid config.
//! Secrets (the provider API key) are referenced by env-var name in the
//! config and resolved at runtime via `std::env::var`.

use anyhow::{Context, Result};
use chrono::Datelike;
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;

use crate::presentation::Rgb;
use crate::types::{DraftError, Position, ScoringFormat};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub cache: CacheConfig,
    pub league: LeagueConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    /// Host of the JSON rankings API.
    pub api_base_url: String,
    /// Host of the public site serving the projection tables.
    pub site_base_url: String,
    /// Host of the partners API serving the injury report.
    pub partners_base_url: String,
    /// Name of the env var holding the rankings API key.
    pub api_key_env: String,
    /// Season year; defaults to the current calendar year.
    pub season: Option<i32>,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.fantasypros.com".to_string(),
            site_base_url: "https://www.fantasypros.com".to_string(),
            partners_base_url: "https://partners.fantasypros.com".to_string(),
            api_key_env: "FFP_API_KEY".to_string(),
            season: None,
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    pub fn season(&self) -> i32 {
        self.season.unwrap_or_else(|| chrono::Utc::now().year())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub rankings_ttl_mins: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            rankings_ttl_mins: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LeagueConfig {
    /// Number of teams drafting.
    pub size: u32,
    pub default_scoring: ScoringFormat,
    /// Positions whose projections gate the merged player pool.
    pub projection_positions: Vec<Position>,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            size: 12,
            default_scoring: ScoringFormat::Std,
            projection_positions: vec![Position::Qb, Position::Rb, Position::Wr, Position::Te],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DisplayConfig {
    /// Colour of the first tier.
    pub min_colour: String,
    /// Colour of the last tier.
    pub max_colour: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            min_colour: "rgb(34,197,94)".to_string(),
            max_colour: "rgb(239,68,68)".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later, at request time.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.league.size == 0 {
            return Err(DraftError::Config("league.size must be at least 1".into()));
        }
        if self.league.projection_positions.is_empty() {
            return Err(DraftError::Config(
                "league.projection_positions must name at least one position".into(),
            ));
        }
        if self.cache.rankings_ttl_mins < 0 {
            return Err(DraftError::Config(
                "cache.rankings_ttl_mins must not be negative".into(),
            ));
        }
        for (key, colour) in [
            ("display.min_colour", &self.display.min_colour),
            ("display.max_colour", &self.display.max_colour),
        ] {
            colour
                .parse::<Rgb>()
                .map_err(|e| DraftError::Config(format!("{key}: {e}")))?;
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// The provider API key, if its env var is set.
    pub fn api_key(&self) -> Option<SecretString> {
        Self::resolve_env(&self.provider.api_key_env)
            .ok()
            .map(SecretString::new)
    }
}
