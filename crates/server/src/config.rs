use std::env;

use game_analyzer::AnalysisConfig;

#[derive(Clone, Debug)]
pub struct LlmConfig {
    /// Chat-completions endpoint (OpenAI-compatible)
    pub api_url: String,
    /// No key means summaries are built locally
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base URL of the Chess.com public API
    pub chess_com_api_url: String,
    /// How many of a player's latest games to list and analyze
    pub recent_games: usize,
    pub analysis: AnalysisConfig,
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            chess_com_api_url: "https://api.chess.com/pub".to_string(),
            recent_games: 10,
            analysis: AnalysisConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            chess_com_api_url: env::var("CHESS_COM_API_URL")
                .unwrap_or(defaults.chess_com_api_url),
            recent_games: env::var("RECENT_GAMES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.recent_games),
            analysis: AnalysisConfig::from_env(),
            llm: LlmConfig {
                api_url: env::var("LLM_API_URL").unwrap_or(defaults.llm.api_url),
                api_key: env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty()),
                model: env::var("LLM_MODEL").unwrap_or(defaults.llm.model),
            },
        }
    }
}
