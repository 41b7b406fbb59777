// src/main.rs

use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use coach_backend::api::http::http_router;
use coach_backend::config::CONFIG;
use coach_backend::db;
use coach_backend::llm::GeminiClient;
use coach_backend::state::AppState;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let level: Level = CONFIG.log_level.parse().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting coach backend");
    info!("Model: {}", CONFIG.model);

    let pool = db::create_pool(&CONFIG.database_url, CONFIG.sqlite_max_connections).await?;
    db::run_migrations(&pool).await?;

    let llm = Arc::new(GeminiClient::new()?);
    let app_state = Arc::new(AppState::new(pool, llm));

    let origin: axum::http::HeaderValue = CONFIG.cors_origin.parse()?;
    let cors = CorsLayer::new()
        .allow_origin([origin])
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", http_router(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let bind_address = CONFIG.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
