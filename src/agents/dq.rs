//! DQ agent: runs the checks and asks the model to interpret them.

use crate::agents::{render, tables_in_scope};
use crate::db::Warehouse;
use crate::dq::DqRunner;
use crate::error::AssistantResult;
use crate::llm::CompletionService;
use crate::models::{AskRequest, TableDqReport};
use std::collections::BTreeMap;

pub fn prompt(question: &str, reports: &BTreeMap<String, TableDqReport>) -> String {
    format!(
        "You are Dr. Database's Data Quality Agent.\n\
         \n\
         User question:\n\
         {question}\n\
         \n\
         Data quality results (per table):\n\
         {results}\n\
         \n\
         Explain:\n\
         - Key issues by table\n\
         - How serious they are\n\
         - What should be done next\n\
         Use clear, structured bullet points.\n",
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
    let reports = DqRunner::run_for_tables(warehouse, &scope).await;

    llm.complete(&prompt(&request.question, &reports)).await
}
