use crate::prelude::*;

use crate::base::schema::{EnrichedValueType, FieldName};

pub type TableName = String;

/// Free-form per-table options passed through by the host.
pub type TableOptions = BTreeMap<String, String>;

/// Resumption token for paginated reads. `last_id` is the highest record id
/// covered by previous read windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOffset {
    pub last_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionType {
    Snapshot,
    Incremental,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub primary_keys: Vec<FieldName>,
    pub ingestion_type: IngestionType,
}

/// One read window: a finite stream of records plus the offset to resume
/// from. Records whose fetch failed are omitted from the stream.
pub struct TableRead<'a> {
    pub records: BoxStream<'a, serde_json::Value>,
    pub next_offset: Option<SourceOffset>,
}

impl std::fmt::Debug for TableRead<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableRead")
            .field("next_offset", &self.next_offset)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Tables this connector provides.
    fn list_tables(&self) -> Vec<TableName>;

    /// Schema of one table, as a typed descriptor tree.
    async fn get_table_schema(
        &self,
        table_name: &str,
        options: &TableOptions,
    ) -> Result<EnrichedValueType>;

    /// Key and ingestion metadata of one table.
    async fn read_table_metadata(
        &self,
        table_name: &str,
        options: &TableOptions,
    ) -> Result<TableMetadata>;

    /// Read one window of records following `start_offset`.
    /// Fetching happens lazily as the returned stream is consumed.
    async fn read_table(
        &self,
        table_name: &str,
        start_offset: Option<SourceOffset>,
        options: &TableOptions,
    ) -> Result<TableRead<'async_trait>>;
}
