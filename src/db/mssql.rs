//! SQL Server warehouse operations.
//!
//! Parallel to the PostgreSQL module: every function opens a TDS connection,
//! runs its statements and closes it. Introspection reads `INFORMATION_SCHEMA`
//! for the login's default schema (`SCHEMA_NAME()`) in the connected database.

use crate::db::types::RowToJson;
use crate::db::warehouse::{WarehouseOptions, duplicate_count_from};
use crate::error::{AssistantError, AssistantResult};
use crate::models::{ColumnInfo, Dialect, DuplicateCount, QueryOutput};
use futures_util::StreamExt;
use tiberius::{Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, warn};

type MssqlClient = Client<Compat<TcpStream>>;

mod queries {
    pub const PING: &str = "SELECT 1";

    pub const LIST_TABLES: &str = r#"
        SELECT TABLE_NAME
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_SCHEMA = SCHEMA_NAME()
        AND TABLE_TYPE = 'BASE TABLE'
        ORDER BY TABLE_NAME
        "#;

    pub const DESCRIBE_COLUMNS: &str = r#"
        SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE
        FROM INFORMATION_SCHEMA.COLUMNS
        WHERE TABLE_SCHEMA = SCHEMA_NAME()
        AND TABLE_NAME = @P1
        ORDER BY ORDINAL_POSITION
        "#;
}

async fn open(connection_string: &str, options: &WarehouseOptions) -> AssistantResult<MssqlClient> {
    let config = Config::from_ado_string(connection_string).map_err(|e| {
        AssistantError::connection(
            format!("Invalid SQL Server connection string: {}", e),
            "Check the server, database and credential fields",
        )
    })?;

    let connect = async move {
        let tcp = TcpStream::connect(config.get_addr()).await.map_err(|e| {
            AssistantError::connection(
                format!("I/O error: {}", e),
                "Check network connectivity and database server status",
            )
        })?;
        tcp.set_nodelay(true).map_err(|e| {
            AssistantError::connection(format!("I/O error: {}", e), "Check the network stack")
        })?;
        Client::connect(config, tcp.compat_write())
            .await
            .map_err(AssistantError::from)
    };

    match tokio::time::timeout(options.connect_timeout, connect).await {
        Ok(client) => client,
        Err(_) => Err(AssistantError::connection(
            format!(
                "Timed out after {}s connecting to {}",
                options.connect_timeout.as_secs(),
                Dialect::Mssql.display_name()
            ),
            "Check that the server is reachable and TCP/IP is enabled",
        )),
    }
}

async fn close(client: MssqlClient) {
    if let Err(e) = client.close().await {
        warn!(error = %e, "Failed to close SQL Server connection cleanly");
    }
}

/// Run one statement and collect the rows of its first result set.
async fn fetch_first_result(
    client: &mut MssqlClient,
    sql: &str,
    param: Option<&str>,
) -> AssistantResult<Vec<tiberius::Row>> {
    let stream = match param {
        Some(p) => client.query(sql, &[&p]).await?,
        None => client.simple_query(sql).await?,
    };
    Ok(stream.into_first_result().await?)
}

pub async fn ping(connection_string: &str, options: &WarehouseOptions) -> AssistantResult<()> {
    let mut client = open(connection_string, options).await?;
    let result = fetch_first_result(&mut client, queries::PING, None).await;
    close(client).await;
    result?;
    Ok(())
}

pub async fn list_tables(
    connection_string: &str,
    options: &WarehouseOptions,
) -> AssistantResult<Vec<String>> {
    let mut client = open(connection_string, options).await?;
    let result = fetch_first_result(&mut client, queries::LIST_TABLES, None).await;
    close(client).await;

    let tables = result?
        .iter()
        .filter_map(|row| row.try_get::<&str, _>(0).ok().flatten().map(str::to_string))
        .collect::<Vec<_>>();
    debug!(count = tables.len(), "Listed SQL Server tables");
    Ok(tables)
}

pub async fn get_columns(
    connection_string: &str,
    options: &WarehouseOptions,
    table: &str,
) -> AssistantResult<Vec<ColumnInfo>> {
    let mut client = open(connection_string, options).await?;
    let result = fetch_first_result(&mut client, queries::DESCRIBE_COLUMNS, Some(table)).await;
    close(client).await;

    let mut columns = Vec::new();
    for row in result? {
        let name = row.try_get::<&str, _>("COLUMN_NAME")?.unwrap_or_default();
        let data_type = row.try_get::<&str, _>("DATA_TYPE")?.unwrap_or_default();
        let nullable = row.try_get::<&str, _>("IS_NULLABLE")? == Some("YES");
        columns.push(ColumnInfo::new(name, data_type, nullable));
    }

    if columns.is_empty() {
        return Err(AssistantError::schema(
            format!("Table '{}' not found", table),
            table,
        ));
    }
    debug!(table, count = columns.len(), "Described SQL Server table");
    Ok(columns)
}

/// Stream at most `limit` rows of the first result set. Column metadata arrives
/// before any row, so an empty result still names its columns.
async fn fetch_limited(
    client: &mut MssqlClient,
    sql: &str,
    limit: usize,
) -> AssistantResult<(Vec<String>, Vec<tiberius::Row>)> {
    let mut stream = client.simple_query(sql).await?;
    let columns = stream
        .columns()
        .await?
        .map(|cols| cols.iter().map(|c| c.name().to_string()).collect())
        .unwrap_or_default();
    let rows = stream
        .into_row_stream()
        .take(limit)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, tiberius::error::Error>>()?;
    Ok((columns, rows))
}

pub async fn query_rows(
    connection_string: &str,
    options: &WarehouseOptions,
    sql: &str,
) -> AssistantResult<QueryOutput> {
    let mut client = open(connection_string, options).await?;
    let result = fetch_limited(&mut client, sql, options.max_rows + 1).await;
    close(client).await;

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
    let mut client = open(connection_string, options).await?;
    let result = fetch_first_result(&mut client, sql, None).await;
    close(client).await;

    let rows = result?;
    let row = rows
        .first()
        .ok_or_else(|| AssistantError::internal("COUNT query returned no rows"))?;
    let count = match row.try_get::<i64, _>(0) {
        Ok(v) => v,
        Err(_) => row.try_get::<i32, _>(0)?.map(i64::from),
    };
    Ok(count.unwrap_or(0).max(0) as u64)
}

pub async fn count_rows(
    connection_string: &str,
    options: &WarehouseOptions,
    table: &str,
) -> AssistantResult<u64> {
    let sql = format!(
        "SELECT COUNT_BIG(*) FROM {}",
        Dialect::Mssql.quote_identifier(table)
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
        "SELECT COUNT_BIG(*) FROM {} WHERE {} IS NULL",
        Dialect::Mssql.quote_identifier(table),
        Dialect::Mssql.quote_identifier(column)
    );
    scalar_count(connection_string, options, &sql).await
}

/// Rows minus distinct rows. `text`, `ntext`, `image` and `xml` columns cannot be
/// compared, so `SELECT DISTINCT *` fails on such tables (errors 305, 306, 421)
/// and reports as unsupported.
pub async fn count_duplicate_rows(
    connection_string: &str,
    options: &WarehouseOptions,
    table: &str,
) -> AssistantResult<DuplicateCount> {
    let quoted = Dialect::Mssql.quote_identifier(table);
    let sql = format!(
        "SELECT (SELECT COUNT_BIG(*) FROM {quoted}) - (SELECT COUNT_BIG(*) FROM (SELECT DISTINCT * FROM {quoted}) AS distinct_rows)"
    );
    duplicate_count_from(
        Dialect::Mssql,
        scalar_count(connection_string, options, &sql).await,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_introspection_limited_to_default_schema() {
        for sql in [queries::LIST_TABLES, queries::DESCRIBE_COLUMNS] {
            assert!(sql.contains("TABLE_SCHEMA = SCHEMA_NAME()"), "{sql}");
        }
    }
}
