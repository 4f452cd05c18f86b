//! Root-cause agent: combines schema and DQ results into causal hypotheses.

use crate::agents::sql::{SchemaMap, schema_map};
use crate::agents::{render, tables_in_scope};
use crate::db::Warehouse;
use crate::dq::DqRunner;
use crate::error::AssistantResult;
use crate::llm::CompletionService;
use crate::models::{AskRequest, TableDqReport};
use std::collections::BTreeMap;

pub fn prompt(
    question: &str,
    tables: &[String],
    schema: &SchemaMap,
    reports: &BTreeMap<String, TableDqReport>,
) -> String {
    format!(
        "You are Dr. Database's Root-Cause Analysis Agent.\n\
         \n\
         User question:\n\
         {question}\n\
         \n\
         Relevant tables:\n\
         {tables}\n\
         \n\
         Schema:\n\
         {schema}\n\
         \n\
         Data Quality results:\n\
         {results}\n\
         \n\
         Infer the MOST LIKELY root causes.\n\
         Explain your reasoning in 3-6 bullet points, and suggest concrete next steps.\n",
        tables = render(&tables),
        schema = render(schema),
        results = render(reports),
    )
}

pub async fn answer<W, C>(request: &AskRequest, warehouse: &W, llm: &C) -> AssistantResult<String>
where
    W: Warehouse,
    C: CompletionService,
{
    let all_tables = warehouse.list_tables().await?;
    let scope = tables_in_scope(&request.tables, all_tables);

    let schema = schema_map(warehouse, &scope).await;
    let reports = DqRunner::run_for_tables(warehouse, &scope).await;

    llm.complete(&prompt(&request.question, &scope, &schema, &reports))
        .await
}
