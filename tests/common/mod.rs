use axum::{extract::Path, http::StatusCode, routing::get, Json, Router};
use reqwest::Client;
use serde_json::{json, Value};
use server::config::Config;
use tokio::net::TcpListener;

/// Build a reqwest client for tests.
pub fn client() -> Client {
    Client::new()
}

/// Serve `router` on an ephemeral local port and return its base URL.
async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    base
}

/// Start the analyzer app with `config` and return its base URL.
pub async fn spawn_app(config: Config) -> String {
    serve(server::app(config).unwrap()).await
}

/// Config whose engine path does not exist and whose Chess.com base is `chess_com`.
pub fn test_config(chess_com: &str) -> Config {
    let mut config = Config::default();
    config.chess_com_api_url = chess_com.to_string();
    config.analysis.engine.stockfish_path = "/nonexistent/stockfish".to_string();
    config
}

fn fake_game(month: &str, i: usize, rules: &str) -> Value {
    json!({
        "url": format!("https://www.chess.com/game/live/2025-{month}-{i}"),
        "pgn": "[White \"Alice\"]\n[Black \"bob\"]\n[Result \"1-0\"]\n\n1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0",
        "end_time": 1_735_689_600 + i as i64,
        "rules": rules,
        "white": { "username": "Alice", "result": "win" },
        "black": { "username": "bob", "result": "checkmated" }
    })
}

/// Minimal stand-in for the Chess.com public API.
///
/// Only "alice" exists: January 2025 has 5 games, February 2025 has 8
/// standard games and one Chess960 game.
pub async fn spawn_fake_chess_com() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let archive_base = base.clone();
    let router = Router::new()
        .route(
            "/pub/player/{username}/games/archives",
            get(move |Path(username): Path<String>| {
                let base = archive_base.clone();
                async move {
                    if username != "alice" {
                        return (StatusCode::NOT_FOUND, Json(json!({ "code": 0 })));
                    }
                    (
                        StatusCode::OK,
                        Json(json!({
                            "archives": [
                                format!("{base}/pub/player/alice/games/2025/01"),
                                format!("{base}/pub/player/alice/games/2025/02"),
                            ]
                        })),
                    )
                }
            }),
        )
        .route(
            "/pub/player/{username}/games/{year}/{month}",
            get(|Path((_, _, month)): Path<(String, String, String)>| async move {
                let mut games: Vec<Value> = if month == "01" {
                    (0..5).map(|i| fake_game(&month, i, "chess")).collect()
                } else {
                    (0..8).map(|i| fake_game(&month, i, "chess")).collect()
                };
                if month == "02" {
                    games.insert(4, fake_game(&month, 99, "chess960"));
                }
                Json(json!({ "games": games }))
            }),
        );

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("{base}/pub")
}

/// A Chess.com stand-in that answers every request with 500.
pub async fn spawn_failing_chess_com() -> String {
    let router = Router::new().fallback(|| async {
        (StatusCode::INTERNAL_SERVER_ERROR, "upstream down")
    });
    format!("{}/pub", serve(router).await)
}
