pub mod health;
pub mod records;
pub mod sites;

use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(records::router())
        .merge(sites::router())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use hydro_store::{
        db::{ColumnMapping, LoadOptions, LossColumns},
        domain::{AggregationResult, GroupBy, ListOptions, Metric, ProductionRecord, RecordFilter},
        CsvDataStore, DataStore, StoreError,
    };
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tower::ServiceExt;

    const DATASET: &str = "\
site_id,site_name,timestamp,output_value,unit,status
A,Alpha,2025-02-01T00:00:00Z,10.5,MWh,active
B,Beta,2025-02-01T00:00:00Z,4,MWh,active
A,Alpha,2025-02-01T01:00:00Z,1.25,MWh,maintenance
B,Beta,2025-02-02T00:00:00Z,6,MWh,offline
A,Alpha,2025-02-02T00:00:00Z,3,MWh,active
";

    fn app() -> Router {
        let store = CsvDataStore::from_reader(DATASET.as_bytes(), &LoadOptions::default()).unwrap();
        router(AppState::new(store))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let (status, body) = get(app(), uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_reports_record_count() {
        for uri in ["/", "/healthz"] {
            let (status, body) = get_json(uri).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({"status": "ok", "records": 5}));
        }
    }

    #[tokio::test]
    async fn records_for_site_in_file_order() {
        let (status, body) = get_json("/records?site_id=A").await;
        assert_eq!(status, StatusCode::OK);
        let values: Vec<f64> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["output_value"].as_f64().unwrap())
            .collect();
        assert_eq!(values, vec![10.5, 1.25, 3.0]);
    }

    #[tokio::test]
    async fn record_json_round_trips_csv_row() {
        let (_, body) = get_json("/records?site_id=A&status=maintenance").await;
        assert_eq!(
            body,
            json!([{
                "site_id": "A",
                "site_name": "Alpha",
                "timestamp": "2025-02-01T01:00:00Z",
                "output_value": 1.25,
                "unit": "MWh",
                "status": "maintenance"
            }])
        );
    }

    #[tokio::test]
    async fn records_filters_are_conjunctive() {
        let (_, body) =
            get_json("/records?site_id=B&from=2025-02-01T12:00:00Z&to=2025-02-03&status=offline").await;
        let rows = body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["timestamp"], "2025-02-02T00:00:00Z");
    }

    #[tokio::test]
    async fn inverted_date_range_is_empty_not_error() {
        let (status, body) = get_json("/records?from=2025-02-02&to=2025-02-01").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn records_sort_and_slice() {
        let (_, body) = get_json("/records?sort=timestamp&offset=2&limit=2").await;
        let stamps: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["timestamp"].as_str().unwrap())
            .collect();
        assert_eq!(stamps, vec!["2025-02-01T01:00:00Z", "2025-02-02T00:00:00Z"]);
    }

    #[tokio::test]
    async fn unknown_query_parameters_are_ignored() {
        let (status, body) = get_json("/records?site_id=A&colour=blue").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn repeated_requests_are_byte_identical() {
        let uri = "/records/aggregate?group_by=day&metric=average";
        let (_, first) = get(app(), uri).await;
        let (_, second) = get(app(), uri).await;
        assert_eq!(first, second);

        let (_, first) = get(app(), "/records").await;
        let (_, second) = get(app(), "/records").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn aggregate_sum_by_site() {
        let (status, body) = get_json("/records/aggregate?group_by=site_id&metric=sum").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"key": "A", "value": 10.5 + 1.25 + 3.0, "records": 3},
                {"key": "B", "value": 4.0 + 6.0, "records": 2}
            ])
        );
    }

    #[tokio::test]
    async fn aggregate_count_partitions_filtered_records() {
        let (_, listed) = get_json("/records?from=2025-02-01T00:30:00Z").await;
        let expected = listed.as_array().unwrap().len() as f64;

        let (_, groups) = get_json("/records/aggregate?group_by=hour&metric=count&from=2025-02-01T00:30:00Z").await;
        let total: f64 = groups
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["value"].as_f64().unwrap())
            .sum();
        assert_eq!(total, expected);
    }

    #[tokio::test]
    async fn aggregate_rejects_bogus_metric() {
        let (status, body) = get_json("/records/aggregate?group_by=site_id&metric=bogus").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "invalid_parameter");
        assert_eq!(body["field"], "metric");
        assert!(body["message"].as_str().unwrap().contains("bogus"));
    }

    #[tokio::test]
    async fn aggregate_requires_group_by() {
        let (status, body) = get_json("/records/aggregate?metric=sum").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["field"], "group_by");
    }

    #[tokio::test]
    async fn invalid_filter_values_are_client_errors() {
        for (uri, field) in [
            ("/records?status=flooded", "status"),
            ("/records?from=tomorrow", "from"),
            ("/records?limit=many", "limit"),
            ("/records?sort=site", "sort"),
        ] {
            let (status, body) = get_json(uri).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
            assert_eq!(body["field"], field, "{uri}");
        }
    }

    #[tokio::test]
    async fn site_production_daily_series() {
        let (status, body) = get_json("/sites/A/production?step=daily").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "site_id": "A",
                "step": "daily",
                "unit": "MWh",
                "data": [
                    {"timestamp": "2025-02-01T00:00:00Z", "output_value": 11.8, "status": "maintenance"},
                    {"timestamp": "2025-02-02T00:00:00Z", "output_value": 3.0, "status": "active"}
                ]
            })
        );
    }

    #[tokio::test]
    async fn site_production_unknown_site_is_empty() {
        let (status, body) = get_json("/sites/Z/production").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], "hourly");
        assert_eq!(body["unit"], Value::Null);
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn site_series_carries_summed_losses() {
        let csv = "\
site_id,timestamp,output_value,loss_value_1,loss_valid_id_1
A,2025-02-01T00:00:00Z,10,0.25,1
A,2025-02-01T01:00:00Z,5,0.5,3
";
        let options = LoadOptions {
            columns: ColumnMapping {
                losses: vec![LossColumns {
                    value: "loss_value_1".to_string(),
                    validity: Some("loss_valid_id_1".to_string()),
                }],
                ..ColumnMapping::default()
            },
            ..LoadOptions::default()
        };
        let store = CsvDataStore::from_reader(csv.as_bytes(), &options).unwrap();
        let (status, body) = get(router(AppState::new(store)), "/sites/A/production?step=daily").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body["data"],
            json!([{
                "timestamp": "2025-02-01T00:00:00Z",
                "output_value": 15.0,
                "status": "active",
                "losses": [{"value": 0.8, "validity": 3}]
            }])
        );
    }

    struct BrokenStore;

    #[async_trait::async_trait]
    impl DataStore for BrokenStore {
        async fn list(
            &self,
            _filter: &RecordFilter,
            _options: &ListOptions,
        ) -> Result<Vec<ProductionRecord>, StoreError> {
            Err(StoreError::DataLoad {
                path: PathBuf::from("broken.csv"),
                line: 1,
                reason: "backend unavailable".to_string(),
            })
        }

        async fn aggregate(
            &self,
            _group_by: GroupBy,
            _metric: Metric,
            _filter: &RecordFilter,
        ) -> Result<Vec<AggregationResult>, StoreError> {
            Ok(Vec::new())
        }

        fn record_count(&self) -> usize {
            0
        }
    }

    #[tokio::test]
    async fn store_failures_are_server_errors() {
        let app = router(AppState::new(BrokenStore));
        let (status, body) = get(app, "/records").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], "internal_error");
        assert!(body.get("field").is_none());
    }
}
