use std::{collections::BTreeSet, env, path::PathBuf};

use anyhow::{bail, Context, Result};
use hydro_api::{config::AppConfig, observability};
use hydro_store::{
    db::{CsvDataStore, RowPolicy},
    domain::format_timestamp,
};

/// Validate a dataset offline with the configured column mapping, reporting
/// every bad row instead of stopping at the first one.
fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| cfg.data.csv_path.clone());

    let mut options = cfg.data.load.clone();
    options.on_invalid_row = RowPolicy::Skip;

    let store = CsvDataStore::load(&path, &options)
        .with_context(|| format!("usage: check_dataset [csv_path]; failed to load {}", path.display()))?;

    let records = store.records();
    let sites: BTreeSet<&str> = records.iter().map(|r| r.site_id.as_str()).collect();
    let first = records.iter().map(|r| r.timestamp).min().map(format_timestamp);
    let last = records.iter().map(|r| r.timestamp).max().map(format_timestamp);

    tracing::info!(
        path = %path.display(),
        records = records.len(),
        sites = sites.len(),
        first = %first.unwrap_or_default(),
        last = %last.unwrap_or_default(),
        skipped = store.skipped_rows(),
        "dataset checked"
    );

    if store.skipped_rows() > 0 {
        bail!("{} invalid rows in {}", store.skipped_rows(), path.display());
    }

    Ok(())
}
