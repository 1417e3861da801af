//! Analyzer error types

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Stockfish error: {0}")]
    Stockfish(String),

    #[error("Engine search timed out after {0:?}")]
    Timeout(Duration),

    #[error("Illegal move {san} at index {index}")]
    IllegalMove { index: usize, san: String },

    #[error("Unreadable move notation {san:?} at index {index}")]
    Notation { index: usize, san: String },
}
