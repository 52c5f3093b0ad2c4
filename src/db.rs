use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{error, info};

use crate::config::DatabaseConfig;

/// Opens the shared pool. Closed by `main` after the server stops.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(config.pool_size)
        .connect(&config.url)
        .await
        .context("connect to database")?;
    info!(pool_size = config.pool_size, "database pool ready");
    Ok(db)
}

/// Round-trips `SELECT 1` so a bad connection shows up at startup.
pub async fn ping(db: &PgPool) -> anyhow::Result<()> {
    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(db).await {
        Ok(_) => {
            info!("database connected successfully");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "database connection check failed");
            Err(e).context("database ping")
        }
    }
}
