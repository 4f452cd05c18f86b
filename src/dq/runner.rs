//! DQ runner: applies the rule registry to one or all tables.

use crate::db::Warehouse;
use crate::dq::DqRule;
use crate::error::AssistantResult;
use crate::models::{DqResult, TableDqReport};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Namespace for DQ execution.
pub struct DqRunner;

impl DqRunner {
    /// Run every rule on `table`.
    ///
    /// Always yields one result per rule, in registry order. A failing rule
    /// becomes an `error` result and the remaining rules still run.
    pub async fn run_for_table<W: Warehouse>(warehouse: &W, table: &str) -> TableDqReport {
        let mut results = Vec::with_capacity(DqRule::ALL.len());
        for rule in DqRule::ALL {
            let result = match rule.evaluate(warehouse, table).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(table, rule = %rule, error = %e, "DQ rule failed");
                    DqResult::error(rule, e.to_string())
                }
            };
            results.push(result);
        }

        let report = TableDqReport {
            table: table.to_string(),
            results,
        };
        debug!(table, errors = report.error_count(), "DQ run finished for table");
        report
    }

    /// Run every rule on every listed table. Only the listing failure propagates.
    pub async fn run_for_all_tables<W: Warehouse>(
        warehouse: &W,
    ) -> AssistantResult<BTreeMap<String, TableDqReport>> {
        let tables = warehouse.list_tables().await?;
        Ok(Self::run_for_tables(warehouse, &tables).await)
    }

    /// Run every rule on the given tables, keyed by table name.
    pub async fn run_for_tables<W: Warehouse>(
        warehouse: &W,
        tables: &[String],
    ) -> BTreeMap<String, TableDqReport> {
        let mut reports = BTreeMap::new();
        for table in tables {
            let report = Self::run_for_table(warehouse, table).await;
            reports.insert(table.clone(), report);
        }
        info!(tables = reports.len(), "DQ run finished");
        reports
    }
}
