//! PostgreSQL warehouse operations.
//!
//! Every function opens its own connection, runs its statements and closes the
//! connection again. Introspection is limited to base tables in `current_schema()`.

use crate::db::types::RowToJson;
use crate::db::warehouse::{WarehouseOptions, duplicate_count_from};
use crate::error::{AssistantError, AssistantResult};
use crate::models::{ColumnInfo, Dialect, DuplicateCount, QueryOutput};
use futures_util::StreamExt;
use sqlx::postgres::PgRow;
use sqlx::{Column, Connection, PgConnection, Row};
use tracing::{debug, warn};

mod queries {
    pub const PING: &str = "SELECT 1";

    pub const LIST_TABLES: &str = r#"
        SELECT table_name::text AS table_name
        FROM information_schema.tables
        WHERE table_schema = current_schema()
        AND table_type = 'BASE TABLE'
        ORDER BY table_name
        "#;

    pub const DESCRIBE_COLUMNS: &str = r#"
        SELECT
            column_name::text AS column_name,
            data_type::text AS data_type,
            is_nullable::text AS is_nullable
        FROM information_schema.columns
        WHERE table_schema = current_schema()
        AND table_name = $1
        ORDER BY ordinal_position
        "#;
}

async fn open(connection_string: &str, options: &WarehouseOptions) -> AssistantResult<PgConnection> {
    match tokio::time::timeout(options.connect_timeout, PgConnection::connect(connection_string))
        .await
    {
        Ok(conn) => Ok(conn?),
        Err(_) => Err(AssistantError::connection(
            format!(
                "Timed out after {}s connecting to {}",
                options.connect_timeout.as_secs(),
                Dialect::Postgres.display_name()
            ),
            "Check that the server is reachable and accepting connections",
        )),
    }
}

async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        warn!(error = %e, "Failed to close PostgreSQL connection cleanly");
    }
}

pub async fn ping(connection_string: &str, options: &WarehouseOptions) -> AssistantResult<()> {
    let mut conn = open(connection_string, options).await?;
    let result = sqlx::query(queries::PING).execute(&mut conn).await;
    close(conn).await;
    result?;
    Ok(())
}

pub async fn list_tables(
    connection_string: &str,
    options: &WarehouseOptions,
) -> AssistantResult<Vec<String>> {
    let mut conn = open(connection_string, options).await?;
    let result = sqlx::query_scalar::<_, String>(queries::LIST_TABLES)
        .fetch_all(&mut conn)
        .await;
    close(conn).await;

    let tables = result?;
    debug!(count = tables.len(), "Listed PostgreSQL tables");
    Ok(tables)
}

pub async fn get_columns(
    connection_string: &str,
    options: &WarehouseOptions,
    table: &str,
) -> AssistantResult<Vec<ColumnInfo>> {
    let mut conn = open(connection_string, options).await?;
    let result = sqlx::query(queries::DESCRIBE_COLUMNS)
        .bind(table)
        .fetch_all(&mut conn)
        .await;
    close(conn).await;

    let columns = result?
        .iter()
        .map(|row| {
            let name: String = row.get("column_name");
            let data_type: String = row.get("data_type");
            let nullable: String = row.get("is_nullable");
            ColumnInfo::new(name, data_type, nullable == "YES")
        })
        .collect::<Vec<_>>();

    if columns.is_empty() {
        return Err(AssistantError::schema(
            format!("Table '{}' not found", table),
            table,
        ));
    }
    debug!(table, count = columns.len(), "Described PostgreSQL table");
    Ok(columns)
}

/// Stream at most `limit` rows. Column names come from the first row, or from
/// the prepared statement when the result is empty.
async fn fetch_limited(
    conn: &mut PgConnection,
    sql: &str,
    limit: usize,
) -> AssistantResult<(Vec<String>, Vec<PgRow>)> {
    use sqlx::Executor;
    let rows = (&mut *conn)
        .fetch(sql)
        .take(limit)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    let columns = match rows.first() {
        Some(row) => row.column_names(),
        None => (&mut *conn)
            .describe(sql)
            .await?
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
    };
    Ok((columns, rows))
}

pub async fn query_rows(
    connection_string: &str,
    options: &WarehouseOptions,
    sql: &str,
) -> AssistantResult<QueryOutput> {
    let mut conn = open(connection_string, options).await?;
    let result = fetch_limited(&mut conn, sql, options.max_rows + 1).await;
    close(conn).await;

    let (columns, rows) = result?;
    let truncated = rows.len() > options.max_rows;
    let rows = rows
        .iter()
        .take(options.max_rows)
        .map(|r| r.to_json_map())
        .collect::<Vec<_>>();

    if truncated {
        warn!(limit = options.max_rows, "Query result truncated");
    }
    Ok(QueryOutput {
        columns,
        rows,
        truncated,
    })
}

async fn scalar_count(
    connection_string: &str,
    options: &WarehouseOptions,
    sql: &str,
) -> AssistantResult<u64> {
    let mut conn = open(connection_string, options).await?;
    let result = sqlx::query_scalar::<_, i64>(sql).fetch_one(&mut conn).await;
    close(conn).await;
    Ok(result?.max(0) as u64)
}

pub async fn count_rows(
    connection_string: &str,
    options: &WarehouseOptions,
    table: &str,
) -> AssistantResult<u64> {
    let sql = format!(
        "SELECT COUNT(*) FROM {}",
        Dialect::Postgres.quote_identifier(table)
    );
    scalar_count(connection_string, options, &sql).await
}

pub async fn count_nulls(
    connection_string: &str,
    options: &WarehouseOptions,
    table: &str,
    column: &str,
) -> AssistantResult<u64> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {} IS NULL",
        Dialect::Postgres.quote_identifier(table),
        Dialect::Postgres.quote_identifier(column)
    );
    scalar_count(connection_string, options, &sql).await
}

/// Rows minus distinct rows. Column types without an equality operator
/// (`json`, `point`, ...) make `SELECT DISTINCT *` fail with `42883`, which
/// reports as unsupported.
pub async fn count_duplicate_rows(
    connection_string: &str,
    options: &WarehouseOptions,
    table: &str,
) -> AssistantResult<DuplicateCount> {
    let quoted = Dialect::Postgres.quote_identifier(table);
    let sql = format!(
        "SELECT (SELECT COUNT(*) FROM {quoted}) - (SELECT COUNT(*) FROM (SELECT DISTINCT * FROM {quoted}) AS distinct_rows)"
    );
    duplicate_count_from(
        Dialect::Postgres,
        scalar_count(connection_string, options, &sql).await,
    )
}
