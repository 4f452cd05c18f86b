//! Database access layer.
//!
//! This module provides:
//! - The `Warehouse` trait and its live, dialect-dispatching client
//! - PostgreSQL and SQL Server operation modules
//! - The read-only statement guard
//! - Row-to-JSON type mappings
//! - The SQLite-backed app config store

pub mod guard;
pub mod mssql;
pub mod postgres;
pub mod store;
pub mod types;
pub mod warehouse;

pub use store::ConfigStore;
pub use types::RowToJson;
pub use warehouse::{Warehouse, WarehouseClient, WarehouseOptions};
