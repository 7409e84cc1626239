// textscore-core/src/db/mod.rs

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, Pool, Postgres};
use tracing::{info, warn};

use crate::Error;

pub mod config;

pub use config::DbConfig;

/// Our Database struct wraps a Pool<Postgres>.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Postgres>,
}

impl Database {
    /// Create a new pool. Does not wait; call [`wait_for_db`] first on a cold start.
    pub async fn new(config: &DbConfig) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options()?)
            .await?;

        info!("Connected to Postgres at {}", config.describe());
        Ok(Self { pool })
    }

    /// Apply pending migrations from `migrations/`. Never drops data.
    pub async fn migrate(&self) -> Result<(), Error> {
        info!("Applying migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations applied successfully.");
        Ok(())
    }

    /// Drop every table (including the migration ledger) and rebuild the schema.
    /// All stored analyses are discarded.
    pub async fn reset_schema(&self) -> Result<(), Error> {
        warn!("Resetting schema; all stored analyses will be discarded.");
        sqlx::query("DROP TABLE IF EXISTS text_analyses")
            .execute(&self.pool)
            .await?;
        sqlx::query("DROP TABLE IF EXISTS _sqlx_migrations")
            .execute(&self.pool)
            .await?;
        self.migrate().await
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Poll until a single connection succeeds, sleeping `interval` between tries.
///
/// With `max_attempts = None` this retries forever; otherwise the last
/// connection error is returned once the attempts are used up.
pub async fn wait_for_db(
    config: &DbConfig,
    interval: Duration,
    max_attempts: Option<u32>,
) -> Result<(), Error> {
    let options = config.connect_options()?;
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match PgConnection::connect_with(&options).await {
            Ok(conn) => {
                let _ = conn.close().await;
                info!("Database is ready!");
                return Ok(());
            }
            Err(e) => {
                if max_attempts.is_some_and(|max| attempt >= max) {
                    warn!("Giving up on {} after {} attempts", config.describe(), attempt);
                    return Err(Error::Database(e));
                }
                warn!("Database is not ready. Waiting... (attempt {}: {})", attempt, e);
                tokio::time::sleep(interval).await;
            }
        }
    }
}
