use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use csv::StringRecord;
use serde::Deserialize;

use super::{production_queries, DataStore};
use crate::{
    domain::{
        parse_timestamp, AggregationResult, GroupBy, ListOptions, Loss, Metric,
        ProductionRecord, RecordFilter, Status,
    },
    error::StoreError,
};

/// What to do with a row that fails validation while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Fail the whole load.
    #[default]
    Abort,
    /// Log a warning, count the row and continue.
    Skip,
}

/// Header names of one loss term: its value and, optionally, its validity flag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LossColumns {
    pub value: String,
    pub validity: Option<String>,
}

/// Header names of each record field in the source file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub site_id: String,
    pub site_name: String,
    pub timestamp: String,
    pub output_value: String,
    pub unit: String,
    pub status: String,
    /// Loss terms to carry with each record. Every listed column is required.
    pub losses: Vec<LossColumns>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            site_id: "site_id".to_string(),
            site_name: "site_name".to_string(),
            timestamp: "timestamp".to_string(),
            output_value: "output_value".to_string(),
            unit: "unit".to_string(),
            status: "status".to_string(),
            losses: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub columns: ColumnMapping,
    pub on_invalid_row: RowPolicy,
    /// Unit used when the unit column is absent or a cell is blank.
    pub default_unit: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            on_invalid_row: RowPolicy::Abort,
            default_unit: "kWh".to_string(),
        }
    }
}

/// Column positions resolved once from the header row.
///
/// Required: site id, timestamp, output value. The rest are optional.
struct ColumnIndex {
    site_id: usize,
    site_name: Option<usize>,
    timestamp: usize,
    output_value: usize,
    unit: Option<usize>,
    status: Option<usize>,
    losses: Vec<(usize, Option<usize>)>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, columns: &ColumnMapping) -> Result<Self, Vec<String>> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let mut missing = Vec::new();
        let mut required = |name: &str| {
            let idx = position(name);
            if idx.is_none() {
                missing.push(name.to_string());
            }
            idx
        };

        let site_id = required(&columns.site_id);
        let timestamp = required(&columns.timestamp);
        let output_value = required(&columns.output_value);
        let losses: Vec<(Option<usize>, Option<Option<usize>>)> = columns
            .losses
            .iter()
            .map(|loss| {
                let value = required(&loss.value);
                let validity = match &loss.validity {
                    Some(name) => required(name).map(Some),
                    None => Some(None),
                };
                (value, validity)
            })
            .collect();

        let losses: Option<Vec<(usize, Option<usize>)>> = losses
            .into_iter()
            .map(|(value, validity)| Some((value?, validity?)))
            .collect();

        match (site_id, timestamp, output_value, losses) {
            (Some(site_id), Some(timestamp), Some(output_value), Some(losses)) => Ok(Self {
                site_id,
                site_name: position(&columns.site_name),
                timestamp,
                output_value,
                unit: position(&columns.unit),
                status: position(&columns.status),
                losses,
            }),
            _ => Err(missing),
        }
    }
}

fn optional_cell(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| record.get(i)).filter(|s| !s.is_empty())
}

fn record_to_production(
    record: &StringRecord,
    idx: &ColumnIndex,
    default_unit: &str,
) -> Result<ProductionRecord, String> {
    let cell = move |i: usize| record.get(i).unwrap_or("");

    let site_id = cell(idx.site_id);
    if site_id.is_empty() {
        return Err("site_id is empty".to_string());
    }

    let timestamp = parse_timestamp(cell(idx.timestamp)).map_err(|e| e.to_string())?;

    let raw_output = cell(idx.output_value);
    let output_value: f64 = raw_output
        .parse()
        .map_err(|_| format!("output_value '{raw_output}' is not a number"))?;
    if !output_value.is_finite() {
        return Err(format!("output_value '{raw_output}' is not finite"));
    }
    if output_value < 0.0 {
        return Err(format!("output_value must be non-negative, got {output_value}"));
    }

    let losses = idx
        .losses
        .iter()
        .map(|&(value_idx, validity_idx)| parse_loss(cell(value_idx), validity_idx.map(cell)))
        .collect::<Result<Vec<_>, _>>()?;

    let status = match idx.status {
        Some(i) => {
            let raw = cell(i);
            raw.parse::<Status>()
                .map_err(|_| format!("unknown status '{raw}'"))?
        }
        None => Status::Active,
    };

    Ok(ProductionRecord {
        site_id: site_id.to_string(),
        site_name: optional_cell(record, idx.site_name).map(str::to_string),
        timestamp,
        output_value,
        unit: optional_cell(record, idx.unit)
            .unwrap_or(default_unit)
            .to_string(),
        status,
        losses,
    })
}

fn parse_loss(raw_value: &str, raw_validity: Option<&str>) -> Result<Loss, String> {
    let value: f64 = raw_value
        .parse()
        .map_err(|_| format!("loss value '{raw_value}' is not a number"))?;
    if !value.is_finite() {
        return Err(format!("loss value '{raw_value}' is not finite"));
    }

    let validity = raw_validity
        .map(|raw| {
            raw.parse::<u8>()
                .map_err(|_| format!("loss validity '{raw}' is not a small non-negative integer"))
        })
        .transpose()?;

    Ok(Loss { value, validity })
}

/// Production records parsed from a CSV file, held in memory and never modified.
///
/// Expected header columns (names configurable through [`ColumnMapping`]):
/// - site_id
/// - site_name (optional)
/// - timestamp (RFC 3339, naive datetime or date; normalised to UTC)
/// - output_value (non-negative number)
/// - unit (optional, falls back to [`LoadOptions::default_unit`])
/// - status (optional column; when present every cell must be active, maintenance or offline)
/// - loss value / validity columns listed in [`ColumnMapping::losses`]
#[derive(Debug, Clone, Default)]
pub struct CsvDataStore {
    records: Vec<ProductionRecord>,
    skipped_rows: usize,
}

impl CsvDataStore {
    pub fn load<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read(file, path, options)
    }

    pub fn from_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<Self, StoreError> {
        Self::read(reader, Path::new("<memory>"), options)
    }

    pub fn records(&self) -> &[ProductionRecord] {
        &self.records
    }

    /// Rows dropped under [`RowPolicy::Skip`].
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    fn read<R: Read>(reader: R, origin: &Path, options: &LoadOptions) -> Result<Self, StoreError> {
        let to_path = || PathBuf::from(origin);

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| StoreError::Io {
                path: to_path(),
                source: e.into(),
            })?
            .clone();

        let idx = ColumnIndex::resolve(&headers, &options.columns).map_err(|columns| {
            StoreError::MissingColumns {
                path: to_path(),
                columns,
            }
        })?;

        let mut records = Vec::new();
        let mut skipped_rows = 0;

        for result in rdr.records() {
            let (line, parsed) = match result {
                Ok(record) => (
                    record.position().map_or(0, |p| p.line()),
                    record_to_production(&record, &idx, &options.default_unit),
                ),
                Err(e) if e.is_io_error() => {
                    return Err(StoreError::Io {
                        path: to_path(),
                        source: e.into(),
                    })
                }
                Err(e) => (e.position().map_or(0, |p| p.line()), Err(e.to_string())),
            };

            match parsed {
                Ok(record) => records.push(record),
                Err(reason) => match options.on_invalid_row {
                    RowPolicy::Abort => {
                        return Err(StoreError::DataLoad {
                            path: to_path(),
                            line,
                            reason,
                        })
                    }
                    RowPolicy::Skip => {
                        tracing::warn!(
                            path = %origin.display(),
                            line,
                            reason = %reason,
                            "skipping invalid dataset row"
                        );
                        skipped_rows += 1;
                    }
                },
            }
        }

        Ok(Self {
            records,
            skipped_rows,
        })
    }
}

#[async_trait::async_trait]
impl DataStore for CsvDataStore {
    async fn list(
        &self,
        filter: &RecordFilter,
        options: &ListOptions,
    ) -> Result<Vec<ProductionRecord>, StoreError> {
        Ok(production_queries::select(&self.records, filter, options))
    }

    async fn aggregate(
        &self,
        group_by: GroupBy,
        metric: Metric,
        filter: &RecordFilter,
    ) -> Result<Vec<AggregationResult>, StoreError> {
        Ok(production_queries::aggregate(
            &self.records,
            group_by,
            metric,
            filter,
        ))
    }

    fn record_count(&self) -> usize {
        self.records.len()
    }
}
