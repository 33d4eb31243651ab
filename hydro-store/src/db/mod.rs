pub mod csv_store;
pub mod production_queries;

pub use csv_store::{ColumnMapping, CsvDataStore, LoadOptions, LossColumns, RowPolicy};

use crate::{
    domain::{AggregationResult, GroupBy, ListOptions, Metric, ProductionRecord, RecordFilter},
    error::StoreError,
};

/// Read-only query access to production records.
///
/// Implementations must be shareable across request handlers; the CSV-backed
/// store is the only one today, a database-backed one is expected to replace it.
#[async_trait::async_trait]
pub trait DataStore: Send + Sync {
    /// Records matching every constraint in `filter`, ordered and sliced per `options`.
    async fn list(
        &self,
        filter: &RecordFilter,
        options: &ListOptions,
    ) -> Result<Vec<ProductionRecord>, StoreError>;

    /// One result per distinct group key in the filtered set, ascending by key.
    async fn aggregate(
        &self,
        group_by: GroupBy,
        metric: Metric,
        filter: &RecordFilter,
    ) -> Result<Vec<AggregationResult>, StoreError>;

    fn record_count(&self) -> usize;
}
