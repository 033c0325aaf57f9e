use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

use crate::error::AppError;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// PostgreSQL connection pool plus schema migrations
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// Run all pending migrations from `backend/migrations`
    pub async fn migrate(&self) -> Result<(), AppError> {
        let start = std::time::Instant::now();
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed in {:?}", start.elapsed());
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
