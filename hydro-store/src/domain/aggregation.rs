use std::{fmt, str::FromStr};

use serde::Serialize;
use time::OffsetDateTime;

use super::{
    production_record::{Loss, Status},
    timestamp::TimeBucket,
};
use crate::error::StoreError;

/// Dimension records are grouped by in an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    SiteId,
    Hour,
    Day,
    Month,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::SiteId => "site_id",
            GroupBy::Hour => "hour",
            GroupBy::Day => "day",
            GroupBy::Month => "month",
        }
    }

    /// `None` when grouping is not time based.
    pub fn time_bucket(&self) -> Option<TimeBucket> {
        match self {
            GroupBy::SiteId => None,
            GroupBy::Hour => Some(TimeBucket::Hour),
            GroupBy::Day => Some(TimeBucket::Day),
            GroupBy::Month => Some(TimeBucket::Month),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "site_id" | "site" => Ok(GroupBy::SiteId),
            "hour" => Ok(GroupBy::Hour),
            "day" => Ok(GroupBy::Day),
            "month" => Ok(GroupBy::Month),
            other => Err(StoreError::invalid_parameter(
                "group_by",
                format!("unknown grouping '{other}'; expected one of site_id, hour, day, month"),
            )),
        }
    }
}

/// Statistic computed over `output_value` within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Sum,
    Average,
    Count,
    Min,
    Max,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Sum => "sum",
            Metric::Average => "average",
            Metric::Count => "count",
            Metric::Min => "min",
            Metric::Max => "max",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Metric::Sum),
            "average" | "avg" | "mean" => Ok(Metric::Average),
            "count" => Ok(Metric::Count),
            "min" => Ok(Metric::Min),
            "max" => Ok(Metric::Max),
            other => Err(StoreError::invalid_parameter(
                "metric",
                format!("unknown metric '{other}'; expected one of sum, average, count, min, max"),
            )),
        }
    }
}

/// Resolution of a per-site production series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Rows as recorded, ordered by timestamp.
    #[default]
    Hourly,
    Daily,
    Monthly,
}

impl Step {
    /// `None` for `Hourly`, which does not group rows.
    pub fn bucket(&self) -> Option<TimeBucket> {
        match self {
            Step::Hourly => None,
            Step::Daily => Some(TimeBucket::Day),
            Step::Monthly => Some(TimeBucket::Month),
        }
    }
}

impl FromStr for Step {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Ok(Step::Hourly),
            "daily" => Ok(Step::Daily),
            "monthly" => Ok(Step::Monthly),
            other => Err(StoreError::invalid_parameter(
                "step",
                format!("unknown step '{other}'; expected one of hourly, daily, monthly"),
            )),
        }
    }
}

/// A statistic for one group key. Computed per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    /// Site id, or the canonical bucket-start timestamp for time groupings.
    pub key: String,
    pub value: f64,
    /// Number of records that fell into the group.
    pub records: usize,
}

/// One point of a resampled site series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub timestamp: OffsetDateTime,
    pub output_value: f64,
    /// Most severe status seen in the bucket.
    pub status: Status,
    pub losses: Vec<Loss>,
}
