use axum::{extract::State, routing::get, Json, Router};

use crate::{models::HealthResponse, state::AppState};

pub(crate) async fn healthz_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        records: state.store.record_count(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(healthz_handler))
        .route("/healthz", get(healthz_handler))
}
