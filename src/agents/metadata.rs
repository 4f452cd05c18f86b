//! Metadata agent: explains the schema of the selected (or all) tables.

use crate::agents::{render, tables_in_scope};
use crate::db::Warehouse;
use crate::error::AssistantResult;
use crate::llm::CompletionService;
use crate::models::{AskRequest, ColumnInfo};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Per-table entry in the metadata context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TableColumns {
    Columns(Vec<ColumnInfo>),
    Error { error: String },
}

pub fn prompt(
    question: &str,
    all_tables: &[String],
    context: &BTreeMap<String, TableColumns>,
) -> String {
    format!(
        "You are Dr. Database's Metadata Agent.\n\
         \n\
         User question:\n\
         {question}\n\
         \n\
         Available tables:\n\
         {tables}\n\
         \n\
         Table metadata:\n\
         {metadata}\n\
         \n\
         Explain the schema and answer the question using ONLY this information.\n\
         Keep it concise and practical.\n",
        tables = render(&all_tables),
        metadata = render(context),
    )
}

pub async fn answer<W, C>(request: &AskRequest, warehouse: &W, llm: &C) -> AssistantResult<String>
where
    W: Warehouse,
    C: CompletionService,
{
    let all_tables = warehouse.list_tables().await?;
    let scope = tables_in_scope(&request.tables, all_tables.clone());

    let mut context = BTreeMap::new();
    for table in scope {
        let entry = match warehouse.get_columns(&table).await {
            Ok(columns) => TableColumns::Columns(columns),
            Err(e) => {
                warn!(table = %table, error = %e, "Skipping table in metadata context");
                TableColumns::Error {
                    error: e.to_string(),
                }
            }
        };
        context.insert(table, entry);
    }
    debug!(tables = context.len(), "Built metadata context");

    llm.complete(&prompt(&request.question, &all_tables, &context))
        .await
}
