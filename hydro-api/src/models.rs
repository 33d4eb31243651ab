//! JSON response bodies.

use hydro_store::domain::{format_timestamp, Loss, ProductionRecord, SeriesPoint, Status, Step};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordResponse {
    pub site_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    /// `YYYY-MM-DDTHH:MM:SSZ`
    pub timestamp: String,
    pub output_value: f64,
    pub unit: String,
    pub status: Status,
    /// Configured loss terms, in mapping order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub losses: Vec<Loss>,
}

impl From<&ProductionRecord> for RecordResponse {
    fn from(r: &ProductionRecord) -> Self {
        RecordResponse {
            site_id: r.site_id.clone(),
            site_name: r.site_name.clone(),
            timestamp: format_timestamp(r.timestamp),
            output_value: r.output_value,
            unit: r.unit.clone(),
            status: r.status,
            losses: r.losses.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPointResponse {
    pub timestamp: String,
    pub output_value: f64,
    pub status: Status,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub losses: Vec<Loss>,
}

impl From<SeriesPoint> for SeriesPointResponse {
    fn from(p: SeriesPoint) -> Self {
        SeriesPointResponse {
            timestamp: format_timestamp(p.timestamp),
            output_value: p.output_value,
            status: p.status,
            losses: p.losses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesResponse {
    pub site_id: String,
    pub step: Step,
    /// Unit of the site's records; `null` when nothing matched.
    pub unit: Option<String>,
    pub data: Vec<SeriesPointResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub records: usize,
}
