use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use serde_json::Value as JsonValue;

use crate::clients::chess_com::ChessComClient;
use crate::config::Config;
use crate::error::AppError;

/// GET /api/games/{username}
pub async fn get_recent_games(
    Extension(config): Extension<Config>,
    Extension(chess_com): Extension<Arc<ChessComClient>>,
    Path(username): Path<String>,
) -> Result<Json<JsonValue>, AppError> {
    let games = chess_com
        .fetch_recent_games(&username, config.recent_games)
        .await
        .map_err(AppError::Upstream)?;

    if games.is_empty() {
        return Err(AppError::NotFound("No games found".into()));
    }

    tracing::info!(username = %username, count = games.len(), "Listed recent games");
    Ok(Json(serde_json::to_value(games).map_err(|e| AppError::Internal(e.to_string()))?))
}
