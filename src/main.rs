use crc_gateway::app::{app, AppState};
use crc_gateway::config;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up CRC_API_BASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crc_gateway=info,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting CRC gateway in {:?} mode", config.environment);
    tracing::info!("Core API at {}", config.upstream.base_url);

    let state = AppState::from_config(config.clone())
        .unwrap_or_else(|e| panic!("invalid core API base URL: {}", e));
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("CRC_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 CRC gateway listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
