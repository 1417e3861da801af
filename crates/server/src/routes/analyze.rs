use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use game_analyzer::{session, GameEvaluation, GameInput};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::clients::chess_com::ChessComClient;
use crate::clients::llm::LlmClient;
use crate::config::Config;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub pgn: Option<String>,
    pub username: Option<String>,
}

/// POST /api/analyze
pub async fn analyze_game(
    Extension(config): Extension<Config>,
    Extension(llm): Extension<Arc<LlmClient>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<JsonValue>, AppError> {
    let pgn = req
        .pgn
        .filter(|p| !p.trim().is_empty())
        .ok_or(AppError::BadRequest("No PGN provided".into()))?;

    let games = [GameInput {
        pgn,
        username: req.username,
    }];
    let report = session::analyze_games(&config.analysis, &games)
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("Analysis returned no report".into()))?;

    let textual_analysis = llm.summarize(&report.evaluation).await;

    Ok(Json(json!({
        "white": report.white,
        "black": report.black,
        "result": report.result,
        "user_color": report.user_color,
        "move_count": report.move_count,
        "evaluation": report.evaluation,
        "textual_analysis": textual_analysis,
    })))
}

/// POST /api/players/{username}/analyze
pub async fn analyze_player(
    Extension(config): Extension<Config>,
    Extension(chess_com): Extension<Arc<ChessComClient>>,
    Extension(llm): Extension<Arc<LlmClient>>,
    Path(username): Path<String>,
) -> Result<Json<JsonValue>, AppError> {
    let recent = chess_com
        .fetch_recent_games(&username, config.recent_games)
        .await
        .map_err(AppError::Upstream)?;

    let inputs: Vec<GameInput> = recent
        .iter()
        .filter_map(|game| {
            game.pgn.clone().map(|pgn| GameInput {
                pgn,
                username: Some(username.clone()),
            })
        })
        .collect();

    if inputs.is_empty() {
        return Err(AppError::NotFound("No games found".into()));
    }

    tracing::info!(username = %username, games = inputs.len(), "Analyzing recent games");
    let reports = session::analyze_games(&config.analysis, &inputs).await?;

    let combined = GameEvaluation::merged(reports.iter().map(|r| &r.evaluation));
    let textual_analysis = llm.summarize(&combined).await;

    Ok(Json(json!({
        "username": username,
        "games": reports,
        "textual_analysis": textual_analysis,
    })))
}
