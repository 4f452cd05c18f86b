//! SQL agent: writes or explains SQL Server queries against the live schema.
//!
//! The schema map always covers every table; the table selection is ignored.
//! Referenced tables are not validated here; the prompt asks the model to
//! point out names that are missing from the map.

use crate::agents::{render, schema_error_entry};
use crate::db::Warehouse;
use crate::error::AssistantResult;
use crate::llm::CompletionService;
use crate::models::AskRequest;
use std::collections::BTreeMap;
use tracing::debug;

/// Table name to column names, with an `ERROR: ...` entry for failed tables.
pub type SchemaMap = BTreeMap<String, Vec<String>>;

pub(crate) async fn schema_map<W: Warehouse>(warehouse: &W, tables: &[String]) -> SchemaMap {
    let mut map = BTreeMap::new();
    for table in tables {
        let columns = match warehouse.get_columns(table).await {
            Ok(columns) => columns.into_iter().map(|c| c.name).collect(),
            Err(e) => vec![schema_error_entry(&e)],
        };
        map.insert(table.clone(), columns);
    }
    map
}

pub fn prompt(schema: &SchemaMap, request_text: &str) -> String {
    format!(
        "You are Dr. Database, an expert SQL assistant for SQL Server.\n\
         \n\
         ### DATABASE SCHEMA\n\
         {schema}\n\
         \n\
         ### RULES\n\
         - Use ONLY the tables and columns shown in the schema.\n\
         - If the user refers to non-existent tables/columns, point it out.\n\
         - Prefer readable SQL with CTEs when helpful.\n\
         - Target SQL Server dialect.\n\
         \n\
         ### USER REQUEST\n\
         {request_text}\n\
         \n\
         ### OUTPUT\n\
         Return ONLY the final SQL (no commentary).\n",
        schema = render(schema),
    )
}

pub async fn answer<W, C>(request: &AskRequest, warehouse: &W, llm: &C) -> AssistantResult<String>
where
    W: Warehouse,
    C: CompletionService,
{
    let all_tables = warehouse.list_tables().await?;
    let schema = schema_map(warehouse, &all_tables).await;

    let request_text = match request.sql_text.as_deref() {
        Some(sql) if !sql.trim().is_empty() => sql,
        _ => request.question.as_str(),
    };
    debug!(tables = schema.len(), "Built SQL schema map");

    llm.complete(&prompt(&schema, request_text)).await
}
