use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use hydro_store::{
    db::production_queries,
    domain::{ListOptions, SortOrder},
};

use crate::{
    error::{ApiResult, ValidationError},
    models::{SeriesPointResponse, SeriesResponse},
    state::AppState,
    validation::{self, SeriesParams},
};

/// Production series of one site, resampled to `step`.
pub(crate) async fn site_production(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    query: Result<Query<SeriesParams>, QueryRejection>,
) -> ApiResult<Json<SeriesResponse>> {
    metrics::counter!("http_requests_total", "route" => "site_production").increment(1);

    let Query(params) = query.map_err(ValidationError::from)?;
    let (filter, step) = validation::validate_series_params(&site_id, &params)?;

    let options = ListOptions {
        sort: SortOrder::Timestamp,
        ..ListOptions::default()
    };
    let records = state.store.list(&filter, &options).await?;
    let unit = records.first().map(|r| r.unit.clone());

    let data = production_queries::resample(&records, step)
        .into_iter()
        .map(SeriesPointResponse::from)
        .collect();

    Ok(Json(SeriesResponse {
        site_id: filter.site_id.unwrap_or(site_id),
        step,
        unit,
        data,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/sites/:site_id/production", get(site_production))
}
