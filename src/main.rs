//! DRAUGHTSHEETS: Fantasy football draft board aggregator
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the cached FantasyPros provider, warms the board, and serves
//! the HTTP API until Ctrl-C.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use draughtsheets::config::AppConfig;
use draughtsheets::provider::caching::CachingProvider;
use draughtsheets::provider::fantasypros::FantasyProsClient;
use draughtsheets::provider::FantasyDataProvider;
use draughtsheets::server::{self, ServerState};

const BANNER: &str = r#"
 ___                  _   _   ___ _           _
|   \ _ _ __ _ _  _ __| |_| |_/ __| |_  ___ ___| |_ ___
| |) | '_/ _` | || / _` | ' \  _\__ \ ' \/ -_) -_)  _(_-<
|___/|_| \__,_|\_,_\__, |_||_\__|___/_||_\___\___|\__/__/
                   |___/
  Rankings + projections + injuries, one board.
  v0.1.0
"#;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path = std::env::var("DRAUGHTSHEETS_CONFIG")
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = if Path::new(&config_path).exists() {
        AppConfig::load(&config_path)?
    } else {
        warn!(path = %config_path, "Config file not found, using defaults");
        AppConfig::default()
    };

    println!("{BANNER}");
    info!(
        season = cfg.provider.season(),
        league_size = cfg.league.size,
        scoring = %cfg.league.default_scoring,
        positions = ?cfg.league.projection_positions,
        "DRAUGHTSHEETS starting up"
    );

    // -- Provider ---------------------------------------------------------

    let client = FantasyProsClient::new(&cfg.provider, cfg.api_key())?;
    let ttl = chrono::Duration::minutes(cfg.cache.rankings_ttl_mins);
    let provider: Arc<dyn FantasyDataProvider> = Arc::new(CachingProvider::new(client, ttl));
    info!(
        provider = provider.name(),
        rankings_ttl_mins = cfg.cache.rankings_ttl_mins,
        "Provider ready"
    );

    // -- Shared state -----------------------------------------------------

    let state = Arc::new(ServerState::new(
        provider,
        cfg.league.clone(),
        cfg.display.clone(),
    ));

    if let Err(e) = state.refresh(cfg.league.default_scoring).await {
        warn!(
            error = format!("{e:#}"),
            "Initial board load failed, refresh from the board to retry"
        );
    }

    // -- Serve ------------------------------------------------------------

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| {
            format!("Invalid listen address {}:{}", cfg.server.host, cfg.server.port)
        })?;

    server::serve(state, addr).await?;
    info!("DRAUGHTSHEETS shut down cleanly.");
    Ok(())
}

/// Initialise tracing with env-filter and optional JSON output.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("draughtsheets=info"));

    let json_logging = std::env::var("DRAUGHTSHEETS_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
