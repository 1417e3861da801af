use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use game_analyzer::AnalyzerError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<AnalyzerError> for AppError {
    fn from(e: AnalyzerError) -> Self {
        match e {
            AnalyzerError::Stockfish(msg) => AppError::EngineUnavailable(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream error: {msg}");
                (StatusCode::BAD_GATEWAY, "Chess.com request failed".to_string())
            }
            AppError::EngineUnavailable(msg) => {
                tracing::error!("Engine unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Analysis engine unavailable".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        (status, Json(json!({ "detail": message }))).into_response()
    }
}
