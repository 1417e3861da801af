//! Phase summaries from a chat-completions language model.
//!
//! The model receives the `{opening, middlegame, endgame}` evaluation
//! mapping as JSON and must answer with a JSON object carrying one text per
//! phase. Without an API key, or when the call fails, a plain summary is
//! computed from the numbers instead.

use chess_core::sampling::Phase;
use game_analyzer::{EvaluatedMove, GameEvaluation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::LlmConfig;

const SYSTEM_PROMPT: &str = "You are a chess coach. You receive engine evaluations \
(centipawns, from the player's point of view) of sampled moves grouped by game phase. \
Reply with a JSON object with exactly the keys \"opening\", \"middlegame\" and \"endgame\", \
each a short paragraph on the player's strengths and weaknesses in that phase.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub opening: String,
    pub middlegame: String,
    pub endgame: String,
}

pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| format!("HTTP client error: {e}"))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Summarize an evaluation. Never fails: falls back to [`offline_summary`].
    pub async fn summarize(&self, evaluation: &GameEvaluation) -> PhaseSummary {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return offline_summary(evaluation);
        };

        match self.request_summary(api_key, evaluation).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = %e, "LLM summary failed, using offline summary");
                offline_summary(evaluation)
            }
        }
    }

    async fn request_summary(
        &self,
        api_key: &str,
        evaluation: &GameEvaluation,
    ) -> Result<PhaseSummary, String> {
        let payload = serde_json::to_string(evaluation)
            .map_err(|e| format!("Serialize error: {e}"))?;

        let body = json!({
            "model": self.config.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": payload },
            ],
        });

        let resp = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Request error: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| format!("JSON parse error: {e}"))?;

        parse_completion(&data)
    }
}

/// Pull the phase summary out of a chat-completions response.
fn parse_completion(data: &Value) -> Result<PhaseSummary, String> {
    let content = data["choices"][0]["message"]["content"]
        .as_str()
        .ok_or("Completion has no message content")?;
    serde_json::from_str(content).map_err(|e| format!("Summary is not the expected JSON: {e}"))
}

/// Summary built from the evaluations alone.
pub fn offline_summary(evaluation: &GameEvaluation) -> PhaseSummary {
    PhaseSummary {
        opening: describe_phase(Phase::Opening, &evaluation.opening),
        middlegame: describe_phase(Phase::Middlegame, &evaluation.middlegame),
        endgame: describe_phase(Phase::Endgame, &evaluation.endgame),
    }
}

fn describe_phase(phase: Phase, moves: &[EvaluatedMove]) -> String {
    let scored: Vec<(&EvaluatedMove, i32)> = moves
        .iter()
        .filter_map(|m| m.evaluation.map(|e| (m, e)))
        .collect();

    let Some(&(low, low_eval)) = scored.iter().min_by_key(|(_, e)| *e) else {
        return format!("{}: no evaluated positions.", capitalize(phase.as_str()));
    };
    let average = scored.iter().map(|(_, e)| *e as f64).sum::<f64>() / scored.len() as f64;

    let verdict = if average >= 100.0 {
        "you held a clear edge"
    } else if average > -100.0 {
        "the position stayed roughly balanced"
    } else {
        "you were under pressure"
    };

    format!(
        "{}: {} (average {:+.2} over {} positions). Low point after move {} {} at {:+.2}.",
        capitalize(phase.as_str()),
        verdict,
        average / 100.0,
        scored.len(),
        low.move_number,
        low.notation,
        low_eval as f64 / 100.0,
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
