use std::sync::Arc;

mod app;
mod auth;
mod config;
mod dashboard;
mod db;
mod error;
mod extract;
mod ids;
#[cfg(test)]
mod memory;
mod state;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "contactboard=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);
    let addr = app::bind_addr(&config)?;

    let db = db::connect(&config.database).await?;
    db::ping(&db).await?;

    sqlx::migrate!("./migrations").run(&db).await?;

    let app = app::build_app(AppState::postgres(db.clone(), config));
    app::serve(app, addr).await?;

    db.close().await;
    tracing::info!("database pool closed");
    Ok(())
}
