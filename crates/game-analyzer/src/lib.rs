//! Engine-backed game evaluation.
//!
//! Walks a game's moves, sends a sampled subset of positions to a UCI
//! engine and groups the resulting scores by game phase.

pub mod config;
pub mod error;
pub mod evaluation;
pub mod session;
pub mod stockfish;

pub use config::{AnalysisConfig, EngineConfig};
pub use error::AnalyzerError;
pub use evaluation::{evaluate_game, EvaluatedMove, Evaluator, GameEvaluation};
pub use session::{analyze_games, analyze_with, GameInput, GameReport};
