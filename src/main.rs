//! Dr. Database - Main entry point.
//!
//! Command results are printed to stdout as pretty JSON; logs go to stderr.

use clap::Parser;
use dr_database::config::{AskArgs, Command, Config, ConnectArgs};
use dr_database::models::AskRequest;
use dr_database::{
    ConfigStore, DqRunner, GeminiClient, MetadataExtractor, Pipeline, Warehouse, WarehouseClient,
};
use serde::Serialize;
use serde_json::json;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn connect(config: &Config, store: &ConfigStore, args: &ConnectArgs) -> CliResult<()> {
    let connection_string = args.resolve_connection_string()?;
    let client = WarehouseClient::for_connection_string(
        args.dialect,
        connection_string.as_str(),
        config.warehouse_options(),
    );

    // Only a connection that answers the probe is saved
    client.ping().await?;
    let saved = store.upsert(args.dialect, &connection_string).await?;
    print_json(&saved.summary())
}

/// A failed pipeline run is reported as JSON on stderr here, so the caller only
/// sets the exit status.
async fn ask(client: &WarehouseClient, config: &Config, args: &AskArgs) -> CliResult<ExitCode> {
    let llm = GeminiClient::new(config.gemini_settings()?)?;
    let request = AskRequest {
        question: args.question.clone(),
        tables: args.tables.clone(),
        sql_text: args.sql_text.clone(),
    };

    let pipeline = Pipeline::new(client, &llm).with_forced_intent(args.intent);
    match pipeline.run(request).await {
        Ok(response) => {
            print_json(&response)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "error": e.source.to_string(),
                    "suggestion": e.source.suggestion(),
                    "intent": e.intent,
                    "debug": e.debug,
                }))?
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(config: &Config) -> CliResult<ExitCode> {
    let store = ConfigStore::open(&config.app_database).await?;

    if let Command::Connect(args) = &config.command {
        connect(config, &store, args).await?;
        return Ok(ExitCode::SUCCESS);
    }
    if let Command::ShowConfig = &config.command {
        match store.current().await? {
            Some(saved) => print_json(&saved.summary())?,
            None => print_json(&json!({ "configured": false }))?,
        }
        return Ok(ExitCode::SUCCESS);
    }

    let client = WarehouseClient::resolve(&store, config.warehouse_options()).await?;
    match &config.command {
        Command::Test => print_json(&client.probe().await)?,
        Command::Tables => print_json(&client.list_tables().await?)?,
        Command::Columns { table } => print_json(&client.get_columns(table).await?)?,
        Command::Metadata { table } => {
            print_json(&MetadataExtractor::extract(&client, table).await?)?
        }
        Command::Dq { table: Some(table) } => {
            print_json(&DqRunner::run_for_table(&client, table).await)?
        }
        Command::Dq { table: None } => print_json(&DqRunner::run_for_all_tables(&client).await?)?,
        Command::Sql { statement } => print_json(&client.run_read_only_sql(statement).await?)?,
        Command::Ask(args) => return ask(&client, config, args).await,
        Command::Connect(_) | Command::ShowConfig => {}
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse configuration from command line and environment
    let config = Config::parse();

    // Initialize logging
    init_tracing(&config);

    info!("Starting Dr. Database v{}", env!("CARGO_PKG_VERSION"));

    match run(&config).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}
