//! Data-quality result models.
//!
//! A `DqResult` is produced fresh for every rule on every run and is never persisted.
//! Its `details` payload is rule-specific; see [`DqDetails`].

use crate::dq::DqRule;
use crate::models::ColumnInfo;
use serde::{Serialize, Serializer};

/// Outcome status of one rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DqStatus {
    Pass,
    Error,
}

/// NULL count for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NullCount {
    pub column: String,
    pub null_count: u64,
}

/// Duplicate-row count, or a marker that the warehouse cannot compute one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateCount {
    Counted(u64),
    Unsupported,
}

impl Serialize for DuplicateCount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Counted(n) => serializer.serialize_u64(*n),
            Self::Unsupported => serializer.serialize_str("unsupported"),
        }
    }
}

/// Rule-specific details payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DqDetails {
    NullCounts { null_counts: Vec<NullCount> },
    Duplicates { duplicate_rows: DuplicateCount },
    RowCount { row_count: u64 },
    Schema { schema: Vec<ColumnInfo> },
    Error { error: String },
}

/// One outcome per rule per table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DqResult {
    pub rule: DqRule,
    pub status: DqStatus,
    pub details: DqDetails,
}

impl DqResult {
    /// A passing result with the given details.
    pub fn pass(rule: DqRule, details: DqDetails) -> Self {
        Self {
            rule,
            status: DqStatus::Pass,
            details,
        }
    }

    /// A synthetic error result standing in for a rule that failed.
    pub fn error(rule: DqRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            status: DqStatus::Error,
            details: DqDetails::Error {
                error: message.into(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == DqStatus::Error
    }
}

/// All rule outcomes for one table, in registry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDqReport {
    pub table: String,
    pub results: Vec<DqResult>,
}

impl TableDqReport {
    /// Look up the result of a specific rule.
    pub fn result(&self, rule: DqRule) -> Option<&DqResult> {
        self.results.iter().find(|r| r.rule == rule)
    }

    /// Number of rules that ended in error.
    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_duplicate_count_serialization() {
        let counted = DqResult::pass(
            DqRule::DuplicateCheck,
            DqDetails::Duplicates {
                duplicate_rows: DuplicateCount::Counted(3),
            },
        );
        assert_eq!(
            serde_json::to_value(&counted).unwrap(),
            json!({"rule": "duplicate_check", "status": "pass", "details": {"duplicate_rows": 3}})
        );

        let unsupported = DqDetails::Duplicates {
            duplicate_rows: DuplicateCount::Unsupported,
        };
        assert_eq!(
            serde_json::to_value(&unsupported).unwrap(),
            json!({"duplicate_rows": "unsupported"})
        );
    }

    #[test]
    fn test_error_result_shape() {
        let result = DqResult::error(DqRule::NullCheck, "Table 'x' not found");
        assert!(result.is_error());
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"rule": "null_check", "status": "error", "details": {"error": "Table 'x' not found"}})
        );
    }

    #[test]
    fn test_report_lookup() {
        let report = TableDqReport {
            table: "Orders".to_string(),
            results: vec![
                DqResult::pass(DqRule::RowCount, DqDetails::RowCount { row_count: 10 }),
                DqResult::error(DqRule::SchemaCheck, "boom"),
            ],
        };
        assert_eq!(
            report.result(DqRule::RowCount).map(|r| &r.details),
            Some(&DqDetails::RowCount { row_count: 10 })
        );
        assert_eq!(report.error_count(), 1);
        assert!(report.result(DqRule::NullCheck).is_none());
    }
}
