//! Dr. Database Library
//!
//! A data-warehouse assistant: connects to a PostgreSQL or SQL Server
//! warehouse, extracts schema metadata, runs data-quality checks and routes
//! natural-language questions to prompt-templated agents.

pub mod agents;
pub mod config;
pub mod db;
pub mod dq;
pub mod error;
pub mod graph;
pub mod llm;
pub mod metadata;
pub mod models;

pub use config::Config;
pub use db::{ConfigStore, Warehouse, WarehouseClient, WarehouseOptions};
pub use dq::{DqRule, DqRunner};
pub use error::{AssistantError, AssistantResult, PipelineError};
pub use graph::Pipeline;
pub use llm::{CompletionService, GeminiClient};
pub use metadata::MetadataExtractor;
