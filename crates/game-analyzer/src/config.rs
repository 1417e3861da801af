//! Analysis configuration from environment variables

use std::env;
use std::time::Duration;

use chess_core::sampling::SampleTargets;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Path to Stockfish binary
    pub stockfish_path: String,

    /// Search depth per sampled position
    pub depth: u32,

    /// Wall-clock budget per sampled position (zero = depth only)
    pub time_budget: Duration,

    /// UCI Threads option
    pub threads: u32,

    /// UCI Hash option in MB
    pub hash_mb: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stockfish_path: "./stockfish".to_string(),
            depth: 12,
            time_budget: Duration::from_millis(1000),
            threads: 1,
            hash_mb: 64,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AnalysisConfig {
    /// Positions sampled per phase
    pub samples: SampleTargets,

    pub engine: EngineConfig,
}

impl AnalysisConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let samples = SampleTargets {
            opening: env_parse("OPENING_SAMPLES").unwrap_or(defaults.samples.opening),
            middlegame: env_parse("MIDDLEGAME_SAMPLES").unwrap_or(defaults.samples.middlegame),
            endgame: env_parse("ENDGAME_SAMPLES").unwrap_or(defaults.samples.endgame),
        };

        let engine = EngineConfig {
            stockfish_path: env::var("STOCKFISH_PATH")
                .unwrap_or(defaults.engine.stockfish_path),
            depth: env_parse("EVAL_DEPTH").unwrap_or(defaults.engine.depth),
            time_budget: env_parse("EVAL_TIME_BUDGET_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.engine.time_budget),
            threads: env_parse("ENGINE_THREADS").unwrap_or(defaults.engine.threads),
            hash_mb: env_parse("ENGINE_HASH_MB").unwrap_or(defaults.engine.hash_mb),
        };

        Self { samples, engine }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
