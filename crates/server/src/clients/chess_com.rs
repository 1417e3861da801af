use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// How many monthly archives to walk back through when collecting games.
const MAX_ARCHIVES: usize = 3;

/// A game as listed to the front end.
#[derive(Debug, Clone, Serialize)]
pub struct ChessComGame {
    pub white: String,
    pub black: String,
    /// Result from the requesting player's side ("win", "checkmated", ...)
    pub result: String,
    pub url: Option<String>,
    pub pgn: Option<String>,
    pub end_time: Option<String>,
}

pub struct ChessComClient {
    client: Client,
    base_url: String,
}

impl ChessComClient {
    pub fn new(base_url: &str) -> Result<Self, String> {
        let client = Client::builder()
            .user_agent("ChessPhaseAnalyzer/1.0")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| format!("HTTP client error: {e}"))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Monthly archive URLs for a player, oldest first. Unknown players
    /// have no archives.
    pub async fn fetch_archives(&self, username: &str) -> Result<Vec<String>, String> {
        let url = format!(
            "{}/player/{}/games/archives",
            self.base_url,
            username.to_lowercase()
        );

        let Some(data) = self.get_json(&url).await? else {
            return Ok(vec![]);
        };

        Ok(data["archives"]
            .as_array()
            .map(|archives| {
                archives
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// The player's last `limit` standard-chess games, oldest first.
    pub async fn fetch_recent_games(
        &self,
        username: &str,
        limit: usize,
    ) -> Result<Vec<ChessComGame>, String> {
        let archives = self.fetch_archives(username).await?;
        let mut collected: Vec<ChessComGame> = Vec::new();

        for archive in archives.iter().rev().take(MAX_ARCHIVES) {
            if collected.len() >= limit {
                break;
            }
            let mut month = self.fetch_archive_games(archive, username).await?;
            tracing::debug!(archive = %archive, games = month.len(), "Fetched archive");
            month.append(&mut collected);
            collected = month;
        }

        let skip = collected.len().saturating_sub(limit);
        Ok(collected.split_off(skip))
    }

    /// Games from one monthly archive URL, in archive order.
    async fn fetch_archive_games(
        &self,
        archive_url: &str,
        username: &str,
    ) -> Result<Vec<ChessComGame>, String> {
        let Some(data) = self.get_json(archive_url).await? else {
            return Ok(vec![]);
        };

        let games = data["games"].as_array().cloned().unwrap_or_default();
        Ok(games
            .iter()
            .filter(|game| {
                // Skip variant games
                game.get("rules").and_then(|v| v.as_str()).unwrap_or("chess") == "chess"
            })
            .map(|game| parse_game(game, username))
            .collect())
    }

    /// GET a JSON document; 404 maps to `None`.
    async fn get_json(&self, url: &str) -> Result<Option<Value>, String> {
        // Rate limit
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Request error: {e}"))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !resp.status().is_success() {
            return Err(format!("HTTP {} from {url}", resp.status()));
        }

        resp.json()
            .await
            .map(Some)
            .map_err(|e| format!("JSON parse error: {e}"))
    }
}

fn parse_game(game: &Value, username: &str) -> ChessComGame {
    let side = |color: &str, field: &str| {
        game[color][field].as_str().unwrap_or_default().to_string()
    };

    let white = side("white", "username");
    let black = side("black", "username");
    let result = if white.eq_ignore_ascii_case(username) {
        side("white", "result")
    } else {
        side("black", "result")
    };

    let end_time = game["end_time"]
        .as_i64()
        .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.to_rfc3339());

    ChessComGame {
        white,
        black,
        result,
        url: game["url"].as_str().map(String::from),
        pgn: game["pgn"].as_str().map(String::from),
        end_time,
    }
}
