use std::str::FromStr;

use hydro_store::{
    domain::{
        parse_timestamp, GroupBy, ListOptions, Metric, RecordFilter, SortOrder, Status, Step,
    },
    StoreError,
};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::error::ValidationError;

/// Filter parameters shared by the record endpoints. Every field is raw text;
/// conversion to typed values happens in [`validate_filter`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub site_id: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub status: Option<String>,
}

/// `GET /records` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordsParams {
    #[serde(flatten)]
    pub filter: FilterParams,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// `GET /records/aggregate` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregateParams {
    #[serde(flatten)]
    pub filter: FilterParams,
    pub group_by: Option<String>,
    pub metric: Option<String>,
}

/// `GET /sites/:site_id/production` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub step: Option<String>,
}

// Blank values count as "not supplied".
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bound(field: &str, value: &Option<String>) -> Result<Option<OffsetDateTime>, ValidationError> {
    present(value)
        .map(|raw| parse_timestamp(raw).map_err(|e| ValidationError::new(field, e.to_string())))
        .transpose()
}

fn parse_typed<T>(field: &str, value: &Option<String>) -> Result<Option<T>, ValidationError>
where
    T: FromStr<Err = StoreError>,
{
    present(value)
        .map(|raw| raw.parse::<T>().map_err(|e| ValidationError::from_store(field, e)))
        .transpose()
}

fn required<T>(field: &str, value: &Option<String>) -> Result<T, ValidationError>
where
    T: FromStr<Err = StoreError>,
{
    parse_typed(field, value)?.ok_or_else(|| ValidationError::new(field, "field required"))
}

fn parse_count(field: &str, value: &Option<String>) -> Result<Option<usize>, ValidationError> {
    present(value)
        .map(|raw| {
            raw.parse::<usize>()
                .map_err(|_| ValidationError::new(field, format!("'{raw}' is not a non-negative integer")))
        })
        .transpose()
}

/// Convert raw filter parameters into a [`RecordFilter`].
///
/// Rules:
/// - `from` / `to` must parse as a date or datetime; they are inclusive and
///   `from > to` is allowed (it matches nothing).
/// - `status` must be one of the known statuses.
pub fn validate_filter(params: &FilterParams) -> Result<RecordFilter, ValidationError> {
    Ok(RecordFilter {
        site_id: present(&params.site_id).map(str::to_string),
        from: parse_bound("from", &params.from)?,
        to: parse_bound("to", &params.to)?,
        status: parse_typed::<Status>("status", &params.status)?,
    })
}

pub fn validate_records_params(
    params: &RecordsParams,
) -> Result<(RecordFilter, ListOptions), ValidationError> {
    let filter = validate_filter(&params.filter)?;
    let options = ListOptions {
        sort: parse_typed::<SortOrder>("sort", &params.sort)?.unwrap_or_default(),
        offset: parse_count("offset", &params.offset)?.unwrap_or(0),
        limit: parse_count("limit", &params.limit)?,
    };
    Ok((filter, options))
}

pub fn validate_aggregate_params(
    params: &AggregateParams,
) -> Result<(GroupBy, Metric, RecordFilter), ValidationError> {
    let group_by = required::<GroupBy>("group_by", &params.group_by)?;
    let metric = required::<Metric>("metric", &params.metric)?;
    let filter = validate_filter(&params.filter)?;
    Ok((group_by, metric, filter))
}

pub fn validate_series_params(
    site_id: &str,
    params: &SeriesParams,
) -> Result<(RecordFilter, Step), ValidationError> {
    let site_id = site_id.trim();
    if site_id.is_empty() {
        return Err(ValidationError::new("site_id", "must not be empty"));
    }

    let filter = RecordFilter {
        site_id: Some(site_id.to_string()),
        from: parse_bound("from", &params.from)?,
        to: parse_bound("to", &params.to)?,
        status: None,
    };
    let step = parse_typed::<Step>("step", &params.step)?.unwrap_or_default();
    Ok((filter, step))
}
