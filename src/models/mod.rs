//! Data models for Dr. Database.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod dq;
pub mod request;
pub mod schema;

// Re-export commonly used types
pub use connection::{
    ConnectionConfig, ConnectionConfigError, ConnectionDescriptor, ConnectionSummary, Dialect,
    ProbeOutcome, mask_connection_string,
};
pub use dq::{DqDetails, DqResult, DqStatus, DuplicateCount, NullCount, TableDqReport};
pub use request::{AskRequest, AskResponse, Intent};
pub use schema::{ColumnInfo, QueryOutput, TableMetadata};
