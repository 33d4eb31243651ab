use std::sync::Arc;

use anyhow::Context;
use hydro_store::{CsvDataStore, DataStore};

use crate::config::DataConfig;

/// Handler state. The store is immutable, so clones share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
}

impl AppState {
    pub fn new<S: DataStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Load the configured CSV into memory. Any failure is fatal for startup.
pub fn load_dataset(cfg: &DataConfig) -> anyhow::Result<CsvDataStore> {
    let store = CsvDataStore::load(&cfg.csv_path, &cfg.load)
        .with_context(|| format!("failed to load dataset {}", cfg.csv_path.display()))?;

    metrics::gauge!("dataset_records_loaded").set(store.record_count() as f64);
    metrics::gauge!("dataset_rows_skipped").set(store.skipped_rows() as f64);
    tracing::info!(
        path = %cfg.csv_path.display(),
        records = store.record_count(),
        skipped = store.skipped_rows(),
        "dataset loaded"
    );

    Ok(store)
}
