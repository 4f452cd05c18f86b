//! Shared fixtures: an in-memory warehouse and a scripted completion service.

#![allow(dead_code)]

use dr_database::error::{AssistantError, AssistantResult};
use dr_database::llm::CompletionService;
use dr_database::db::warehouse::duplicate_count_from;
use dr_database::models::{ColumnInfo, Dialect, DuplicateCount, QueryOutput};
use dr_database::Warehouse;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::sync::Mutex;

/// One table held in memory. Cells are `None` for NULL.
#[derive(Debug, Clone, Default)]
pub struct FakeTable {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Warehouse double answering the counting primitives from in-memory rows.
#[derive(Debug, Default)]
pub struct FakeWarehouse {
    tables: BTreeMap<String, FakeTable>,
    unconfigured: bool,
    broken_columns: HashSet<String>,
    no_distinct: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    /// A warehouse with no saved connection: every call fails.
    pub fn unconfigured() -> Self {
        Self {
            unconfigured: true,
            ..Self::default()
        }
    }

    pub fn with_table(mut self, name: &str, columns: &[(&str, &str, bool)], rows: &[&[Option<&str>]]) -> Self {
        let table = FakeTable {
            columns: columns
                .iter()
                .map(|(n, t, nullable)| ColumnInfo::new(*n, *t, *nullable))
                .collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
        };
        self.tables.insert(name.to_string(), table);
        self
    }

    /// Introspection of `name` fails even though it is listed.
    pub fn with_broken_columns(mut self, name: &str) -> Self {
        self.broken_columns.insert(name.to_string());
        self
    }

    /// The engine rejects `SELECT DISTINCT *` on `name`.
    pub fn without_distinct(mut self, name: &str) -> Self {
        self.no_distinct.insert(name.to_string());
        self
    }

    /// Operations invoked so far, e.g. `list_tables` or `count_rows(Orders)`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> AssistantResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.unconfigured {
            return Err(AssistantError::not_configured());
        }
        Ok(())
    }

    fn table(&self, name: &str) -> AssistantResult<&FakeTable> {
        self.tables
            .get(name)
            .ok_or_else(|| AssistantError::schema(format!("Table '{}' not found", name), name))
    }
}

impl Warehouse for FakeWarehouse {
    async fn list_tables(&self) -> AssistantResult<Vec<String>> {
        self.record("list_tables".to_string())?;
        Ok(self.tables.keys().cloned().collect())
    }

    async fn get_columns(&self, table: &str) -> AssistantResult<Vec<ColumnInfo>> {
        self.record(format!("get_columns({})", table))?;
        if self.broken_columns.contains(table) {
            return Err(AssistantError::connection(
                "connection reset during introspection",
                "retry",
            ));
        }
        Ok(self.table(table)?.columns.clone())
    }

    async fn query_rows(&self, sql: &str) -> AssistantResult<QueryOutput> {
        self.record(format!("query_rows({})", sql))?;
        let mut row = serde_json::Map::new();
        row.insert("?column?".to_string(), serde_json::Value::from(1));
        Ok(QueryOutput {
            columns: vec!["?column?".to_string()],
            rows: vec![row],
            truncated: false,
        })
    }

    async fn count_rows(&self, table: &str) -> AssistantResult<u64> {
        self.record(format!("count_rows({})", table))?;
        Ok(self.table(table)?.rows.len() as u64)
    }

    async fn count_nulls(&self, table: &str, column: &str) -> AssistantResult<u64> {
        self.record(format!("count_nulls({}, {})", table, column))?;
        let t = self.table(table)?;
        let idx = t
            .columns
            .iter()
            .position(|c| c.name == column)
            .ok_or_else(|| AssistantError::database(format!("column {} does not exist", column), None, "fix"))?;
        Ok(t.rows.iter().filter(|r| r[idx].is_none()).count() as u64)
    }

    async fn count_duplicate_rows(&self, table: &str) -> AssistantResult<DuplicateCount> {
        self.record(format!("count_duplicate_rows({})", table))?;
        // Engine-shaped errors, mapped the way the live client maps them
        let counted = match self.tables.get(table) {
            None => Err(AssistantError::database(
                format!("relation \"{}\" does not exist", table),
                Some("42P01".to_string()),
                "Check the table name",
            )),
            Some(_) if self.no_distinct.contains(table) => Err(AssistantError::database(
                "could not identify an equality operator for type json",
                Some("42883".to_string()),
                "Cast the column to a comparable type",
            )),
            Some(t) => {
                let distinct = t.rows.iter().collect::<BTreeSet<_>>().len();
                Ok((t.rows.len() - distinct) as u64)
            }
        };
        duplicate_count_from(Dialect::Postgres, counted)
    }
}

/// Orders and Customers, with NULLs and one duplicated order row.
pub fn sample_warehouse() -> FakeWarehouse {
    FakeWarehouse::new()
        .with_table(
            "Orders",
            &[("id", "int", false), ("customer_id", "int", true), ("total", "numeric", true)],
            &[
                &[Some("1"), Some("10"), Some("9.50")],
                &[Some("2"), None, Some("3.00")],
                &[Some("2"), None, Some("3.00")],
                &[Some("3"), Some("11"), None],
            ],
        )
        .with_table(
            "Customers",
            &[("id", "int", false), ("email", "nvarchar", true)],
            &[&[Some("10"), Some("a@example.com")], &[Some("11"), None]],
        )
}

enum Reply {
    Text(String),
    Fail(String),
}

/// Completion double. Replies are consumed in order; once they run out the
/// prompt itself is echoed back as the answer.
#[derive(Default)]
pub struct ScriptedCompletion {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    pub fn echo() -> Self {
        Self::default()
    }

    pub fn replying(replies: &[&str]) -> Self {
        let completion = Self::default();
        completion
            .replies
            .lock()
            .unwrap()
            .extend(replies.iter().map(|r| Reply::Text(r.to_string())));
        completion
    }

    /// Queue a failure after any replies already scripted.
    pub fn then_fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Fail(message.to_string()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl CompletionService for ScriptedCompletion {
    async fn complete(&self, prompt: &str) -> AssistantResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(message)) => Err(AssistantError::upstream(message)),
            None => Ok(prompt.to_string()),
        }
    }
}
