use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use hydro_store::domain::AggregationResult;

use crate::{
    error::{ApiResult, ValidationError},
    models::RecordResponse,
    state::AppState,
    validation::{self, AggregateParams, RecordsParams},
};

pub(crate) async fn list_records(
    State(state): State<AppState>,
    query: Result<Query<RecordsParams>, QueryRejection>,
) -> ApiResult<Json<Vec<RecordResponse>>> {
    metrics::counter!("http_requests_total", "route" => "records").increment(1);

    let Query(params) = query.map_err(ValidationError::from)?;
    let (filter, options) = validation::validate_records_params(&params)?;

    let records = state.store.list(&filter, &options).await?;
    tracing::debug!(matched = records.len(), "records listed");

    Ok(Json(records.iter().map(RecordResponse::from).collect()))
}

pub(crate) async fn aggregate_records(
    State(state): State<AppState>,
    query: Result<Query<AggregateParams>, QueryRejection>,
) -> ApiResult<Json<Vec<AggregationResult>>> {
    metrics::counter!("http_requests_total", "route" => "records_aggregate").increment(1);

    let Query(params) = query.map_err(ValidationError::from)?;
    let (group_by, metric, filter) = validation::validate_aggregate_params(&params)?;

    let results = state.store.aggregate(group_by, metric, &filter).await?;
    tracing::debug!(%group_by, %metric, groups = results.len(), "records aggregated");

    Ok(Json(results))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/records", get(list_records))
        .route("/records/aggregate", get(aggregate_records))
}
