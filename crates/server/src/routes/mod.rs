pub mod analyze;
pub mod frontend;
pub mod games;
pub mod health;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::clients::chess_com::ChessComClient;
use crate::clients::llm::LlmClient;
use crate::config::Config;

/// Build the application router with its shared clients.
pub fn app(config: Config) -> anyhow::Result<Router> {
    let chess_com = Arc::new(
        ChessComClient::new(&config.chess_com_api_url).map_err(anyhow::Error::msg)?,
    );
    let llm = Arc::new(LlmClient::new(&config.llm).map_err(anyhow::Error::msg)?);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        // Front end
        .route("/", get(frontend::index))
        // Health
        .route("/health", get(health::health_check))
        // Games
        .route("/api/games/{username}", get(games::get_recent_games))
        // Analysis
        .route("/api/analyze", post(analyze::analyze_game))
        .route("/api/players/{username}/analyze", post(analyze::analyze_player))
        // Shared state
        .layer(Extension(config))
        .layer(Extension(chess_com))
        .layer(Extension(llm))
        .layer(CompressionLayer::new())
        .layer(cors))
}
