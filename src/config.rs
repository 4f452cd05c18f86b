//! Configuration handling for Dr. Database.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use crate::db::WarehouseOptions;
use crate::error::{AssistantError, AssistantResult};
use crate::llm::GeminiSettings;
use crate::llm::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS};
use crate::models::{ConnectionDescriptor, Dialect, Intent};
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

pub const DEFAULT_APP_DATABASE: &str = "sqlite://dr_database_internal.db?mode=rwc";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = crate::db::warehouse::DEFAULT_CONNECT_TIMEOUT_SECS;
pub const DEFAULT_MAX_ROWS: usize = crate::db::warehouse::DEFAULT_MAX_ROWS;

/// Configuration for Dr. Database.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dr-database",
    about = "Data-warehouse assistant - schema metadata, data-quality checks and LLM-routed questions",
    version,
    author
)]
pub struct Config {
    /// App database holding the saved warehouse connection (SQLite URL)
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_APP_DATABASE,
        env = "DRDB_APP_DATABASE"
    )]
    pub app_database: String,

    /// Gemini API key (required by `ask`)
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, global = true, default_value = DEFAULT_MODEL, env = "DRDB_LLM_MODEL")]
    pub llm_model: String,

    /// Sampling temperature
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_TEMPERATURE,
        env = "DRDB_LLM_TEMPERATURE"
    )]
    pub llm_temperature: f32,

    /// Completion service base URL
    #[arg(long, global = true, default_value = DEFAULT_ENDPOINT, env = "DRDB_LLM_ENDPOINT")]
    pub llm_endpoint: String,

    /// Completion request timeout in seconds
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_TIMEOUT_SECS,
        env = "DRDB_LLM_TIMEOUT"
    )]
    pub llm_timeout: u64,

    /// Warehouse connection timeout in seconds
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "DRDB_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Maximum rows returned by `sql`
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_ROWS, env = "DRDB_MAX_ROWS")]
    pub max_rows: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "DRDB_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, global = true, env = "DRDB_JSON_LOGS")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Build, probe and save the warehouse connection
    Connect(ConnectArgs),
    /// Probe the saved warehouse connection
    Test,
    /// Show the saved connection with credentials masked
    ShowConfig,
    /// List warehouse tables
    Tables,
    /// Describe the columns of a table
    Columns { table: String },
    /// Extract metadata for a table
    Metadata { table: String },
    /// Run data-quality checks on one table, or every table
    Dq {
        #[arg(long)]
        table: Option<String>,
    },
    /// Run a read-only SELECT statement
    Sql { statement: String },
    /// Ask a question
    Ask(AskArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ConnectArgs {
    /// Warehouse dialect (postgres or mssql)
    #[arg(long)]
    pub dialect: Dialect,

    /// Use this connection string as-is instead of building one
    #[arg(
        long,
        env = "DRDB_CONNECTION_STRING",
        hide_env_values = true,
        conflicts_with_all = ["host", "port", "database", "username", "password"]
    )]
    pub connection_string: Option<String>,

    #[arg(long)]
    pub host: Option<String>,

    /// Defaults to 5432 (postgres) or 1433 (mssql)
    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long)]
    pub database: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long, env = "DRDB_WAREHOUSE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl ConnectArgs {
    /// The connection string to probe and save.
    pub fn resolve_connection_string(&self) -> AssistantResult<String> {
        if let Some(conn) = &self.connection_string {
            return Ok(conn.clone());
        }
        let descriptor = ConnectionDescriptor {
            dialect: self.dialect,
            host: self.host.clone().unwrap_or_default(),
            port: self.port,
            database: self.database.clone().unwrap_or_default(),
            username: self.username.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
        };
        descriptor
            .connection_string()
            .map_err(|e| AssistantError::invalid_input(e.to_string()))
    }
}

#[derive(Debug, Clone, Args)]
pub struct AskArgs {
    pub question: String,

    /// Focus on these tables (repeatable)
    #[arg(long = "table", value_name = "TABLE")]
    pub tables: Vec<String>,

    /// SQL snippet to write or explain
    #[arg(long = "sql", value_name = "SQL")]
    pub sql_text: Option<String>,

    /// Route to this handler without calling the classifier
    #[arg(long)]
    pub intent: Option<Intent>,
}

impl Config {
    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn warehouse_options(&self) -> WarehouseOptions {
        WarehouseOptions {
            max_rows: self.max_rows,
            connect_timeout: self.connect_timeout_duration(),
        }
    }

    /// Completion settings; the API key is required.
    pub fn gemini_settings(&self) -> AssistantResult<GeminiSettings> {
        let api_key = self
            .gemini_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AssistantError::invalid_input(
                    "Gemini API key missing: set GEMINI_API_KEY or pass --gemini-api-key",
                )
            })?;
        Ok(GeminiSettings {
            api_key,
            model: self.llm_model.clone(),
            temperature: self.llm_temperature,
            endpoint: self.llm_endpoint.clone(),
            timeout: Duration::from_secs(self.llm_timeout),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["dr-database", "tables"]).unwrap();
        assert_eq!(config.max_rows, 1000);
        assert_eq!(config.llm_model, "gemini-2.0-flash");
        assert!((config.llm_temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.connect_timeout_duration(), Duration::from_secs(10));
        assert!(matches!(config.command, Command::Tables));
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let config =
            Config::try_parse_from(["dr-database", "sql", "SELECT 1", "--max-rows", "5"]).unwrap();
        assert_eq!(config.warehouse_options().max_rows, 5);
        match config.command {
            Command::Sql { statement } => assert_eq!(statement, "SELECT 1"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_ask_arguments() {
        let config = Config::try_parse_from([
            "dr-database",
            "ask",
            "why?",
            "--table",
            "Orders",
            "--table",
            "Customers",
            "--intent",
            "rootcause",
        ])
        .unwrap();
        let Command::Ask(args) = config.command else {
            panic!("expected ask");
        };
        assert_eq!(args.tables, vec!["Orders", "Customers"]);
        assert_eq!(args.intent, Some(Intent::RootCause));
        assert!(args.sql_text.is_none());
    }

    #[test]
    fn test_connect_builds_connection_string() {
        let config = Config::try_parse_from([
            "dr-database",
            "connect",
            "--dialect",
            "mssql",
            "--host",
            "db.local",
            "--database",
            "dw",
            "--username",
            "sa",
            "--password",
            "secret",
        ])
        .unwrap();
        let Command::Connect(args) = config.command else {
            panic!("expected connect");
        };
        let conn = args.resolve_connection_string().unwrap();
        assert!(conn.starts_with("server=tcp:db.local,1433;"));
    }

    #[test]
    fn test_connect_missing_host_is_invalid_input() {
        let config = Config::try_parse_from(["dr-database", "connect", "--dialect", "postgres"])
            .unwrap();
        let Command::Connect(args) = config.command else {
            panic!("expected connect");
        };
        let err = args.resolve_connection_string().unwrap_err();
        assert!(matches!(err, AssistantError::InvalidInput { .. }));
    }

    #[test]
    fn test_gemini_settings_require_key() {
        let mut config = Config::try_parse_from(["dr-database", "tables"]).unwrap();
        config.gemini_api_key = None;
        assert!(config.gemini_settings().is_err());

        config.gemini_api_key = Some("k".to_string());
        let settings = config.gemini_settings().unwrap();
        assert_eq!(settings.model, DEFAULT_MODEL);
    }
}
