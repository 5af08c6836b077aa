use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

/// Configuration for the record database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    /// Load from `DATABASE_URL`, `DB_MAX_CONNECTIONS` and `DB_MIN_CONNECTIONS`.
    ///
    /// Returns `None` when no database URL is set.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("DATABASE_URL").ok()?;
        Some(Self {
            url,
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
            min_connections: std::env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        })
    }
}

/// Open the connection pool.
pub async fn connect(config: &DatabaseConfig) -> Result<DbConn, DbErr> {
    tracing::info!("Initializing database connection...");

    let opts = ConnectOptions::new(&config.url)
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true)
        .to_owned();

    let conn = Database::connect(opts).await?;
    tracing::info!(
        "Database connected (pool: {}-{})",
        config.min_connections,
        config.max_connections
    );

    Ok(conn)
}
