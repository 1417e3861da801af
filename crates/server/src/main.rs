use server::config;
use server::routes;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env();
    tracing::info!(
        stockfish_path = %config.analysis.engine.stockfish_path,
        depth = config.analysis.engine.depth,
        budget_ms = config.analysis.engine.time_budget.as_millis() as u64,
        llm = config.llm.api_key.is_some(),
        "Config loaded"
    );

    let addr = format!("{}:{}", config.host, config.port);
    let app = routes::app(config)?;

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
