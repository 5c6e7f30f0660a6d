use crate::config::AppConfig;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = crate::db::connect(&config).await?;
        Ok(Self { db, config })
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }

    /// Fresh state backed by a private in-memory database with the schema applied.
    #[cfg(test)]
    pub async fn in_memory() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 0,
            // one connection, otherwise every pooled connection sees its own empty database
            db_max_connections: 1,
        });
        let db = crate::db::connect(&config).await?;
        crate::db::init_schema(&db).await?;
        Ok(Self::from_parts(db, config))
    }
}
