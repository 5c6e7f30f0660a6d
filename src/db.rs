use std::{str::FromStr, time::Duration};

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::config::AppConfig;

pub async fn connect(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("parse database url {}", config.database_url))?
        .create_if_missing(true);

    let db = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        // an in-memory database lives only as long as its connection
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await
        .context("connect to database")?;
    tracing::info!(url = %config.database_url, "database connected");
    Ok(db)
}

/// Creates the `users` and `signals` tables when absent. Existing tables are
/// left untouched, so this runs on every startup.
pub async fn init_schema(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        VARCHAR(120) NOT NULL,
            email       VARCHAR(120) NOT NULL UNIQUE,
            home_state  VARCHAR(50),
            grade       VARCHAR(20),
            board       VARCHAR(50),
            category    VARCHAR(50),
            created_at  DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(db)
    .await
    .context("create users table")?;

    // user_id carries no foreign key: signals for unknown users are accepted
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS signals (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id          INTEGER NOT NULL,
            question_id      INTEGER NOT NULL,
            selected_option  VARCHAR(255),
            confidence       INTEGER,
            time_spent_ms    INTEGER,
            order_index      INTEGER,
            skipped          BOOLEAN NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(db)
    .await
    .context("create signals table")?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_signals_user_order
            ON signals (user_id, order_index)
        "#,
    )
    .execute(db)
    .await
    .context("create signals index")?;

    tracing::debug!("schema ready");
    Ok(())
}
