use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Opens the candidate-store connection pool. Pool sizing comes from
/// configuration alongside the other runtime tunables.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!("opening candidate store pool ({max_connections} connections max)");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!("candidate store ready");
    Ok(pool)
}
