use std::collections::BTreeMap;

use time::OffsetDateTime;

use crate::domain::{
    format_timestamp, AggregationResult, GroupBy, ListOptions, Metric, ProductionRecord,
    RecordFilter, SeriesPoint, SortOrder, Step,
};

/// Filter, order and slice a record table.
pub fn select(
    records: &[ProductionRecord],
    filter: &RecordFilter,
    options: &ListOptions,
) -> Vec<ProductionRecord> {
    let mut matched: Vec<&ProductionRecord> = records.iter().filter(|r| filter.matches(r)).collect();

    if options.sort == SortOrder::Timestamp {
        // sort_by_key is stable: equal timestamps stay in file order.
        matched.sort_by_key(|r| r.timestamp);
    }

    matched
        .into_iter()
        .skip(options.offset)
        .take(options.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey {
    Site(String),
    Bucket(OffsetDateTime),
}

impl GroupKey {
    fn for_record(group_by: GroupBy, record: &ProductionRecord) -> Self {
        match group_by.time_bucket() {
            Some(bucket) => GroupKey::Bucket(bucket.start_of(record.timestamp)),
            None => GroupKey::Site(record.site_id.clone()),
        }
    }

    fn into_label(self) -> String {
        match self {
            GroupKey::Site(site_id) => site_id,
            GroupKey::Bucket(start) => format_timestamp(start),
        }
    }
}

#[derive(Debug, Clone)]
struct Accumulator {
    sum: f64,
    count: usize,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            sum: 0.0,
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    // Groups only exist once a value was pushed, so count > 0 here.
    fn finish(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Sum => self.sum,
            Metric::Average => self.sum / self.count as f64,
            Metric::Count => self.count as f64,
            Metric::Min => self.min,
            Metric::Max => self.max,
        }
    }
}

/// Group the filtered records and compute `metric` over `output_value` per group.
pub fn aggregate(
    records: &[ProductionRecord],
    group_by: GroupBy,
    metric: Metric,
    filter: &RecordFilter,
) -> Vec<AggregationResult> {
    let mut groups: BTreeMap<GroupKey, Accumulator> = BTreeMap::new();

    for record in records.iter().filter(|r| filter.matches(r)) {
        groups
            .entry(GroupKey::for_record(group_by, record))
            .or_insert_with(Accumulator::new)
            .push(record.output_value);
    }

    groups
        .into_iter()
        .map(|(key, acc)| AggregationResult {
            value: acc.finish(metric),
            records: acc.count,
            key: key.into_label(),
        })
        .collect()
}

/// Resample a site's records to `step`.
///
/// `Hourly` passes rows through ordered by timestamp. Coarser steps sum
/// output and losses per calendar bucket, keeping the most severe status and
/// the worst loss validity. Output and loss values are rounded to one decimal.
pub fn resample(records: &[ProductionRecord], step: Step) -> Vec<SeriesPoint> {
    let Some(bucket) = step.bucket() else {
        let mut points: Vec<SeriesPoint> = records.iter().map(point_from_record).collect();
        points.sort_by_key(|p| p.timestamp);
        return points.into_iter().map(rounded).collect();
    };

    let mut buckets: BTreeMap<OffsetDateTime, SeriesPoint> = BTreeMap::new();

    for record in records {
        let start = bucket.start_of(record.timestamp);
        match buckets.get_mut(&start) {
            Some(point) => {
                point.output_value += record.output_value;
                point.status = point.status.max(record.status);
                for (i, loss) in record.losses.iter().enumerate() {
                    match point.losses.get_mut(i) {
                        Some(total) => total.accumulate(loss),
                        None => point.losses.push(*loss),
                    }
                }
            }
            None => {
                let mut point = point_from_record(record);
                point.timestamp = start;
                buckets.insert(start, point);
            }
        }
    }

    buckets.into_values().map(rounded).collect()
}

fn point_from_record(record: &ProductionRecord) -> SeriesPoint {
    SeriesPoint {
        timestamp: record.timestamp,
        output_value: record.output_value,
        status: record.status,
        losses: record.losses.clone(),
    }
}

fn rounded(mut point: SeriesPoint) -> SeriesPoint {
    point.output_value = round_to_tenth(point.output_value);
    for loss in &mut point.losses {
        loss.value = round_to_tenth(loss.value);
    }
    point
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
