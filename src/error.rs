//! Error types for Dr. Database.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Variants follow the assistant's failure taxonomy: connection, schema, read-only
//! policy and upstream completion failures, plus statement-level engine errors.

use crate::models::Intent;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table, "208" for SQL Server invalid object
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Schema error: {message} (object: {object})")]
    Schema { message: String, object: String },

    #[error("Read-only policy violation: {message}")]
    PolicyViolation { message: String },

    #[error("Completion service error: {message}")]
    Upstream { message: String },

    #[error("Persistence error: {message}")]
    Persistence { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AssistantError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// The warehouse has never been configured.
    pub fn not_configured() -> Self {
        Self::connection(
            "No warehouse connection configured",
            "Save a connection with the `connect` command first",
        )
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Create a schema error.
    pub fn schema(message: impl Into<String>, object: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
            object: object.into(),
        }
    }

    /// Create a read-only policy violation.
    pub fn policy_violation(message: impl Into<String>) -> Self {
        Self::PolicyViolation {
            message: message.into(),
        }
    }

    /// Create a completion service error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    /// Create a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Engine error code of a statement-level failure.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Database { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }
}

/// Convert sqlx errors to AssistantError.
impl From<sqlx::Error> for AssistantError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => AssistantError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                AssistantError::database(
                    db_err.message(),
                    code,
                    "Check the SQL syntax and referenced objects",
                )
            }
            sqlx::Error::RowNotFound => AssistantError::database(
                "No rows returned",
                None,
                "Verify the query conditions match existing data",
            ),
            sqlx::Error::PoolTimedOut => {
                AssistantError::connection("Timed out acquiring a connection", "Retry later")
            }
            sqlx::Error::PoolClosed => {
                AssistantError::connection("Connection pool is closed", "Reconnect to the database")
            }
            sqlx::Error::Io(io_err) => AssistantError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => AssistantError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => AssistantError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnNotFound(col) => {
                AssistantError::schema(format!("Column not found: {}", col), col.to_string())
            }
            sqlx::Error::ColumnDecode { index, source } => {
                AssistantError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => {
                AssistantError::internal(format!("Decode error: {}", source))
            }
            _ => AssistantError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Convert SQL Server driver errors to AssistantError.
impl From<tiberius::error::Error> for AssistantError {
    fn from(err: tiberius::error::Error) -> Self {
        match err {
            tiberius::error::Error::Server(token) => AssistantError::database(
                token.message().to_string(),
                Some(token.code().to_string()),
                "Check the SQL syntax and referenced objects",
            ),
            tiberius::error::Error::Io { .. } => AssistantError::connection(
                err.to_string(),
                "Check network connectivity and database server status",
            ),
            other => AssistantError::connection(
                other.to_string(),
                "Check the connection string and SQL Server configuration",
            ),
        }
    }
}

/// Convert completion transport errors to AssistantError.
impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AssistantError::upstream(format!("request timed out: {}", err))
        } else if let Some(status) = err.status() {
            AssistantError::upstream(format!("HTTP {}: {}", status, err))
        } else {
            AssistantError::upstream(err.to_string())
        }
    }
}

/// Result type alias for assistant operations.
pub type AssistantResult<T> = Result<T, AssistantError>;

/// A failed pipeline run: the error plus how far the run got.
#[derive(Error, Debug)]
#[error("Pipeline run failed: {source}")]
pub struct PipelineError {
    #[source]
    pub source: AssistantError,
    /// Intent reached before the failure, if classification completed.
    pub intent: Option<Intent>,
    /// Debug trace accumulated up to the failing node.
    pub debug: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AssistantError::connection("Failed to connect", "Check credentials");
        assert!(err.to_string().contains("Connection failed"));
    }

    #[test]
    fn test_error_suggestion() {
        let err = AssistantError::database(
            "Syntax error",
            Some("42601".to_string()),
            "Check SQL syntax",
        );
        assert_eq!(err.suggestion(), Some("Check SQL syntax"));
        assert!(AssistantError::upstream("boom").suggestion().is_none());
    }

    #[test]
    fn test_not_configured_is_connection_error() {
        let err = AssistantError::not_configured();
        assert!(matches!(err, AssistantError::Connection { .. }));
        assert!(err.suggestion().unwrap().contains("connect"));
    }

    #[test]
    fn test_sql_state_only_on_database_errors() {
        let err = AssistantError::database("bad", Some("42P01".to_string()), "fix");
        assert_eq!(err.sql_state(), Some("42P01"));
        assert!(AssistantError::database("bad", None, "fix").sql_state().is_none());
        assert!(AssistantError::connection("down", "retry").sql_state().is_none());
    }

    #[test]
    fn test_pipeline_error_display_includes_source() {
        let err = PipelineError {
            source: AssistantError::not_configured(),
            intent: Some(Intent::Metadata),
            debug: vec!["classify_intent → metadata".to_string()],
        };
        assert!(err.to_string().contains("No warehouse connection configured"));
    }
}
