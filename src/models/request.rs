//! Request and response records at the question-answering boundary.

use serde::{Deserialize, Serialize};

/// Routing tag selecting which handler answers a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Metadata,
    Dq,
    Sql,
    #[serde(rename = "rootcause")]
    RootCause,
}

impl Intent {
    /// All intents, in the order they are offered to the classifier.
    pub const ALL: [Intent; 4] = [Self::Metadata, Self::Dq, Self::Sql, Self::RootCause];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Dq => "dq",
            Self::Sql => "sql",
            Self::RootCause => "rootcause",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|intent| intent.as_str() == lower)
            .ok_or_else(|| {
                format!(
                    "Unknown intent '{}': expected metadata, dq, sql or rootcause",
                    s.trim()
                )
            })
    }
}

/// A question entering the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// Tables the user selected; empty means "no selection"
    #[serde(default)]
    pub tables: Vec<String>,
    /// Raw SQL to explain, if any
    #[serde(default)]
    pub sql_text: Option<String>,
}

impl AskRequest {
    /// Create a request with no table selection and no SQL.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            tables: Vec::new(),
            sql_text: None,
        }
    }

    /// Select tables to focus on.
    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = tables.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a raw SQL snippet.
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql_text = Some(sql.into());
        self
    }
}

/// A completed pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub intent: Intent,
    pub answer: String,
    /// Nodes visited, in order
    pub debug: Vec<String>,
}
