use std::time::Duration;

use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};

const SCHEMA: &str = include_str!("../sql/schema.sql");

/// connect_with_retry
///
/// Opens the connection pool, retrying a bounded number of times while the database is
/// still coming up. The last connection error is returned once `attempts` run out.
pub async fn connect_with_retry(
    options: PgConnectOptions,
    max_connections: u32,
    attempts: u32,
    delay: Duration,
) -> Result<PgPool, sqlx::Error> {
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        match PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => {
                tracing::info!(attempt, "connected to Postgres");
                return Ok(pool);
            }
            Err(e) if attempt < attempts => {
                tracing::warn!(attempt, attempts, error = %e, "Postgres not reachable, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Creates the tables and seeds the roles if they are missing.
pub async fn bootstrap_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    tracing::info!("database schema ready");
    Ok(())
}
