//! The warehouse seam.
//!
//! [`Warehouse`] is the contract the DQ rules, the metadata extractor and the
//! agent handlers are written against. [`WarehouseClient`] is the live
//! implementation: it dispatches to the dialect module named by the stored
//! connection config and opens a short-lived connection per call.

use crate::db::guard;
use crate::db::store::ConfigStore;
use crate::db::{mssql, postgres};
use crate::error::{AssistantError, AssistantResult};
use crate::models::{
    ColumnInfo, ConnectionConfig, Dialect, DuplicateCount, ProbeOutcome, QueryOutput,
};
use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Default cap on rows returned by a read-only query.
pub const DEFAULT_MAX_ROWS: usize = 1000;

/// Default connection establishment timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Read-only access to a relational warehouse.
pub trait Warehouse: Sync {
    /// Base table names, sorted. Empty when the schema has no tables.
    fn list_tables(&self) -> impl Future<Output = AssistantResult<Vec<String>>> + Send;

    /// Columns of `table` in ordinal order; `Schema` error when it does not exist.
    fn get_columns(
        &self,
        table: &str,
    ) -> impl Future<Output = AssistantResult<Vec<ColumnInfo>>> + Send;

    /// Execute a statement without the read-only check.
    ///
    /// Callers should go through [`Warehouse::run_read_only_sql`].
    fn query_rows(&self, sql: &str) -> impl Future<Output = AssistantResult<QueryOutput>> + Send;

    fn count_rows(&self, table: &str) -> impl Future<Output = AssistantResult<u64>> + Send;

    fn count_nulls(
        &self,
        table: &str,
        column: &str,
    ) -> impl Future<Output = AssistantResult<u64>> + Send;

    fn count_duplicate_rows(
        &self,
        table: &str,
    ) -> impl Future<Output = AssistantResult<DuplicateCount>> + Send;

    /// Run a statement whose leading keyword is `SELECT`.
    ///
    /// See [`guard`] for what this check does and does not prevent.
    fn run_read_only_sql(
        &self,
        sql: &str,
    ) -> impl Future<Output = AssistantResult<QueryOutput>> + Send {
        async move {
            guard::validate_read_only(sql)?;
            self.query_rows(sql.trim()).await
        }
    }
}

/// Map the result of the rows-minus-distinct-rows statement.
///
/// Only the dialect's "column type is not comparable" errors mean the count is
/// unsupported. A missing table or a permission error still fails the rule.
pub fn duplicate_count_from(
    dialect: Dialect,
    result: AssistantResult<u64>,
) -> AssistantResult<DuplicateCount> {
    match result {
        Ok(n) => Ok(DuplicateCount::Counted(n)),
        Err(e)
            if e
                .sql_state()
                .is_some_and(|code| dialect.not_comparable_codes().iter().any(|c| *c == code)) =>
        {
            debug!(dialect = %dialect, error = %e, "Duplicate count not supported for table");
            Ok(DuplicateCount::Unsupported)
        }
        Err(e) => Err(e),
    }
}

/// Per-call connection settings.
#[derive(Debug, Clone)]
pub struct WarehouseOptions {
    pub max_rows: usize,
    pub connect_timeout: Duration,
}

impl Default for WarehouseOptions {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Live warehouse client resolved from the stored connection config.
///
/// Holding no config is a valid state: every operation then fails with a
/// connection error, which is how an unconfigured assistant reports itself.
#[derive(Debug, Clone)]
pub struct WarehouseClient {
    config: Option<ConnectionConfig>,
    options: WarehouseOptions,
}

impl WarehouseClient {
    pub fn new(config: Option<ConnectionConfig>, options: WarehouseOptions) -> Self {
        Self { config, options }
    }

    /// Client for a connection string that has not been persisted yet.
    pub fn for_connection_string(
        dialect: Dialect,
        connection_string: impl Into<String>,
        options: WarehouseOptions,
    ) -> Self {
        let now = Utc::now();
        Self::new(
            Some(ConnectionConfig {
                dialect,
                connection_string: connection_string.into(),
                created_at: now,
                updated_at: now,
            }),
            options,
        )
    }

    /// Re-read the current config from the store.
    pub async fn resolve(store: &ConfigStore, options: WarehouseOptions) -> AssistantResult<Self> {
        let config = store.current().await?;
        match &config {
            Some(c) => debug!(dialect = %c.dialect, "Resolved warehouse connection"),
            None => debug!("No warehouse connection configured"),
        }
        Ok(Self::new(config, options))
    }

    pub fn dialect(&self) -> Option<Dialect> {
        self.config.as_ref().map(|c| c.dialect)
    }

    fn require_config(&self) -> AssistantResult<&ConnectionConfig> {
        self.config.as_ref().ok_or_else(AssistantError::not_configured)
    }

    /// Liveness probe (`SELECT 1`).
    pub async fn ping(&self) -> AssistantResult<()> {
        let config = self.require_config()?;
        match config.dialect {
            Dialect::Postgres => postgres::ping(&config.connection_string, &self.options).await,
            Dialect::Mssql => mssql::ping(&config.connection_string, &self.options).await,
        }?;
        info!(
            dialect = config.dialect.display_name(),
            connection = %config.masked_connection_string(),
            "Warehouse connection is alive"
        );
        Ok(())
    }

    /// Probe and report the outcome as data instead of an error.
    pub async fn probe(&self) -> ProbeOutcome {
        match self.ping().await {
            Ok(()) => ProbeOutcome {
                success: true,
                error: None,
            },
            Err(e) => ProbeOutcome {
                success: false,
                error: Some(e.to_string()),
            },
        }
    }
}

impl Warehouse for WarehouseClient {
    async fn list_tables(&self) -> AssistantResult<Vec<String>> {
        let config = self.require_config()?;
        match config.dialect {
            Dialect::Postgres => postgres::list_tables(&config.connection_string, &self.options).await,
            Dialect::Mssql => mssql::list_tables(&config.connection_string, &self.options).await,
        }
    }

    async fn get_columns(&self, table: &str) -> AssistantResult<Vec<ColumnInfo>> {
        let config = self.require_config()?;
        match config.dialect {
            Dialect::Postgres => {
                postgres::get_columns(&config.connection_string, &self.options, table).await
            }
            Dialect::Mssql => {
                mssql::get_columns(&config.connection_string, &self.options, table).await
            }
        }
    }

    async fn query_rows(&self, sql: &str) -> AssistantResult<QueryOutput> {
        let config = self.require_config()?;
        debug!(sql = %sql, limit = self.options.max_rows, "Executing read-only query");
        match config.dialect {
            Dialect::Postgres => {
                postgres::query_rows(&config.connection_string, &self.options, sql).await
            }
            Dialect::Mssql => mssql::query_rows(&config.connection_string, &self.options, sql).await,
        }
    }

    async fn count_rows(&self, table: &str) -> AssistantResult<u64> {
        let config = self.require_config()?;
        match config.dialect {
            Dialect::Postgres => {
                postgres::count_rows(&config.connection_string, &self.options, table).await
            }
            Dialect::Mssql => mssql::count_rows(&config.connection_string, &self.options, table).await,
        }
    }

    async fn count_nulls(&self, table: &str, column: &str) -> AssistantResult<u64> {
        let config = self.require_config()?;
        match config.dialect {
            Dialect::Postgres => {
                postgres::count_nulls(&config.connection_string, &self.options, table, column).await
            }
            Dialect::Mssql => {
                mssql::count_nulls(&config.connection_string, &self.options, table, column).await
            }
        }
    }

    async fn count_duplicate_rows(&self, table: &str) -> AssistantResult<DuplicateCount> {
        let config = self.require_config()?;
        match config.dialect {
            Dialect::Postgres => {
                postgres::count_duplicate_rows(&config.connection_string, &self.options, table)
                    .await
            }
            Dialect::Mssql => {
                mssql::count_duplicate_rows(&config.connection_string, &self.options, table).await
            }
        }
    }
}
