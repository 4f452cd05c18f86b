//! Application config store.
//!
//! A small SQLite database owned by the assistant itself, holding the single
//! warehouse connection row. Two concurrent `upsert` calls race: the last
//! writer wins and nothing detects the overwrite.

use crate::error::{AssistantError, AssistantResult};
use crate::models::{ConnectionConfig, Dialect};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

mod queries {
    pub const CREATE_TABLE: &str = r#"
        CREATE TABLE IF NOT EXISTS db_config (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            dialect TEXT NOT NULL,
            connection_string TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#;

    pub const SELECT_CURRENT: &str = r#"
        SELECT dialect, connection_string, created_at, updated_at
        FROM db_config
        WHERE id = 1
        "#;

    pub const UPSERT: &str = r#"
        INSERT INTO db_config (id, dialect, connection_string, created_at, updated_at)
        VALUES (1, ?1, ?2, ?3, ?3)
        ON CONFLICT(id) DO UPDATE SET
            dialect = excluded.dialect,
            connection_string = excluded.connection_string,
            updated_at = excluded.updated_at
        "#;
}

/// Persistence for the zero-or-one warehouse connection record.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    pool: SqlitePool,
}

impl ConfigStore {
    /// Open (creating if needed) the app database at `url` and ensure the table exists.
    pub async fn open(url: &str) -> AssistantResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| {
                AssistantError::persistence(format!("Invalid app database URL '{}': {}", url, e))
            })?
            .create_if_missing(true);

        // One connection keeps `sqlite::memory:` databases alive across calls
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| {
                AssistantError::persistence(format!("Failed to open app database: {}", e))
            })?;

        sqlx::query(queries::CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| {
                AssistantError::persistence(format!("Failed to initialize db_config: {}", e))
            })?;

        debug!(url, "Opened app database");
        Ok(Self { pool })
    }

    /// The stored connection, if one has been saved.
    pub async fn current(&self) -> AssistantResult<Option<ConnectionConfig>> {
        let row = sqlx::query_as::<_, (String, String, DateTime<Utc>, DateTime<Utc>)>(
            queries::SELECT_CURRENT,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AssistantError::persistence(format!("Failed to read db_config: {}", e)))?;

        let Some((dialect, connection_string, created_at, updated_at)) = row else {
            return Ok(None);
        };
        let dialect = Dialect::from_str(&dialect).map_err(AssistantError::persistence)?;

        Ok(Some(ConnectionConfig {
            dialect,
            connection_string,
            created_at,
            updated_at,
        }))
    }

    /// Insert or overwrite the single connection row.
    ///
    /// `created_at` survives an overwrite; `updated_at` is refreshed.
    pub async fn upsert(
        &self,
        dialect: Dialect,
        connection_string: &str,
    ) -> AssistantResult<ConnectionConfig> {
        sqlx::query(queries::UPSERT)
            .bind(dialect.as_str())
            .bind(connection_string)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AssistantError::persistence(format!("Failed to save db_config: {}", e))
            })?;

        let saved = self
            .current()
            .await?
            .ok_or_else(|| AssistantError::persistence("db_config row missing after save"))?;
        info!(
            dialect = %saved.dialect,
            connection = %saved.masked_connection_string(),
            "Saved warehouse connection"
        );
        Ok(saved)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
