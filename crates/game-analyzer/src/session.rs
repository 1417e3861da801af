//! One engine per request: spawn, analyze every game, shut down.

use chess_core::game_data::PlayerColor;
use chess_core::pgn;
use chess_core::sampling::SampleTargets;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::error::AnalyzerError;
use crate::evaluation::{evaluate_game, Evaluator, GameEvaluation};
use crate::stockfish::StockfishEngine;

/// A game to analyze, optionally on behalf of one of its players.
#[derive(Debug, Clone, Deserialize)]
pub struct GameInput {
    pub pgn: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameReport {
    pub white: String,
    pub black: String,
    pub result: String,
    /// Side the requesting user played; scores are from this side when set
    pub user_color: Option<PlayerColor>,
    pub move_count: usize,
    pub evaluation: GameEvaluation,
}

impl GameReport {
    fn unreadable() -> Self {
        Self {
            white: "Unknown".to_string(),
            black: "Unknown".to_string(),
            result: "*".to_string(),
            user_color: None,
            move_count: 0,
            evaluation: GameEvaluation::default(),
        }
    }
}

/// Analyze `games` with a freshly spawned Stockfish.
///
/// Fails only if the engine cannot be started. The engine is shut down
/// before returning, and killed if this future is dropped early.
pub async fn analyze_games(
    config: &AnalysisConfig,
    games: &[GameInput],
) -> Result<Vec<GameReport>, AnalyzerError> {
    let mut engine = StockfishEngine::new(&config.engine).await?;
    info!(games = games.len(), path = %config.engine.stockfish_path, "Stockfish ready");

    let reports = analyze_with(&mut engine, &config.samples, games).await;

    engine.quit().await;
    Ok(reports)
}

/// Analyze games one after another with a single evaluator. A game whose
/// PGN cannot be read produces an empty report instead of failing the batch.
pub async fn analyze_with<E: Evaluator>(
    evaluator: &mut E,
    targets: &SampleTargets,
    games: &[GameInput],
) -> Vec<GameReport> {
    let mut reports = Vec::with_capacity(games.len());

    for (i, game) in games.iter().enumerate() {
        let Some(data) = pgn::parse_pgn(&game.pgn) else {
            warn!(game = i, "No moves in PGN, skipping analysis");
            reports.push(GameReport::unreadable());
            continue;
        };

        let user_color = game
            .username
            .as_deref()
            .and_then(|name| data.metadata.color_of(name));
        if game.username.is_some() && user_color.is_none() {
            warn!(game = i, white = %data.metadata.white, black = %data.metadata.black,
                "Requesting user did not play this game, reporting White's view");
        }

        let evaluation = evaluate_game(&data.moves, evaluator, targets, user_color).await;
        info!(
            game = i,
            moves = data.moves.len(),
            evaluated = evaluation.len(),
            "Game evaluated"
        );

        reports.push(GameReport {
            white: data.metadata.white,
            black: data.metadata.black,
            result: data.metadata.result,
            user_color,
            move_count: data.moves.len(),
            evaluation,
        });
    }

    reports
}
