//! Table metadata extraction.

use crate::db::Warehouse;
use crate::error::AssistantResult;
use crate::models::TableMetadata;
use tracing::debug;

/// Namespace for metadata extraction.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Column list of `table` aggregated into a metadata record.
    ///
    /// Nothing is cached: two calls with no schema change in between return
    /// equal records.
    pub async fn extract<W: Warehouse>(warehouse: &W, table: &str) -> AssistantResult<TableMetadata> {
        let columns = warehouse.get_columns(table).await?;
        let metadata = TableMetadata::new(table, columns);
        debug!(table, columns = metadata.column_count, "Extracted table metadata");
        Ok(metadata)
    }
}
