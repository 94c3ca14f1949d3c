//! Server: Axum HTTP front end for the draft board.
//!
//! Serves the provider proxy endpoints, the player board API, and a
//! self-contained HTML board. CORS is open for local front ends.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    response::Html,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

pub use routes::{AppState, ServerState};

/// The embedded board HTML (compiled into the binary).
const BOARD_HTML: &str = include_str!("templates/index.html");

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
    }
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Provider proxy
        .route("/api/rankings", get(routes::get_rankings))
        .route("/api/projections", get(routes::get_projections))
        .route("/api/injuries", get(routes::get_injuries))
        .route("/rankings", get(routes::get_rankings))
        .route("/projections", get(routes::get_projections))
        .route("/injuries", get(routes::get_injuries))
        // Board
        .route("/api/players", get(routes::get_players))
        .route("/api/players/refresh", post(routes::refresh_players))
        .route("/api/players/:id/removed", post(routes::toggle_removed))
        .route("/health", get(routes::health))
        // Board HTML
        .route("/", get(serve_board))
        .layer(cors)
        .with_state(state)
}

/// Serve the embedded HTML board.
async fn serve_board() -> Html<&'static str> {
    Html(BOARD_HTML)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
