//! Intent classifier and the four agent handlers.
//!
//! Each handler gathers its context from the warehouse, renders one prompt and
//! makes a single completion call. The prompt builders are plain functions of
//! the gathered context so they can be checked without a model.
//!
//! Every handler begins with `list_tables()`. A failure there (most commonly
//! an unconfigured warehouse) is returned to the caller; failures while
//! introspecting an individual table are recorded in the context instead.

pub mod classifier;
pub mod dq;
pub mod metadata;
pub mod rootcause;
pub mod sql;

pub use classifier::IntentClassifier;

use crate::error::AssistantError;
use serde::Serialize;

/// Tables a handler should look at: the selection, or every table when empty.
pub(crate) fn tables_in_scope(selected: &[String], all_tables: Vec<String>) -> Vec<String> {
    if selected.is_empty() {
        all_tables
    } else {
        selected.to_vec()
    }
}

/// Context value rendered into prompts.
pub(crate) fn render<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unrenderable: {}>", e))
}

/// Entry recorded in a schema map for a table that could not be introspected.
pub(crate) fn schema_error_entry(err: &AssistantError) -> String {
    format!("ERROR: {}", err)
}
