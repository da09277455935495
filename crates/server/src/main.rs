use lahja_server::{build_router, state::AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lahja_core::shared::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lahja_server=debug,lahja_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let host = std::env::var("LAHJA_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("LAHJA_PORT").unwrap_or_else(|_| "8080".to_string());

    let app_state = AppState::new(config);
    info!(
        device = %app_state.engine.device(),
        whisper = %app_state.engine.config().whisper_model,
        dialect = %app_state.engine.config().dialect_model,
        "engine ready"
    );

    let app = build_router(app_state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
