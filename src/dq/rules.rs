//! The fixed data-quality rule set.

use crate::db::Warehouse;
use crate::error::AssistantResult;
use crate::models::{DqDetails, DqResult, NullCount};
use serde::Serialize;

/// One data-quality check. The set is closed; [`DqRule::ALL`] is the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DqRule {
    NullCheck,
    DuplicateCheck,
    RowCount,
    SchemaCheck,
}

impl DqRule {
    /// Registry, in execution order.
    pub const ALL: [DqRule; 4] = [
        Self::NullCheck,
        Self::DuplicateCheck,
        Self::RowCount,
        Self::SchemaCheck,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::NullCheck => "null_check",
            Self::DuplicateCheck => "duplicate_check",
            Self::RowCount => "row_count",
            Self::SchemaCheck => "schema_check",
        }
    }

    /// Evaluate this rule against `table`.
    ///
    /// A returned error means the rule could not complete; the runner turns it
    /// into an `error` result.
    pub async fn evaluate<W: Warehouse>(
        &self,
        warehouse: &W,
        table: &str,
    ) -> AssistantResult<DqResult> {
        let details = match self {
            Self::NullCheck => {
                let columns = warehouse.get_columns(table).await?;
                let mut null_counts = Vec::with_capacity(columns.len());
                for column in columns {
                    let null_count = warehouse.count_nulls(table, &column.name).await?;
                    null_counts.push(NullCount {
                        column: column.name,
                        null_count,
                    });
                }
                DqDetails::NullCounts { null_counts }
            }
            Self::DuplicateCheck => DqDetails::Duplicates {
                duplicate_rows: warehouse.count_duplicate_rows(table).await?,
            },
            Self::RowCount => DqDetails::RowCount {
                row_count: warehouse.count_rows(table).await?,
            },
            Self::SchemaCheck => DqDetails::Schema {
                schema: warehouse.get_columns(table).await?,
            },
        };
        Ok(DqResult::pass(*self, details))
    }
}

impl std::fmt::Display for DqRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
